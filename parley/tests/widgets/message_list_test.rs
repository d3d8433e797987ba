use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use parley::testing::{buffer_to_string, configure_insta, row_text};
use parley::widgets::{AttachmentState, MessageList, MessageListState};
use parley_client::model::{
    Attributes, Media, Message, MessageIndex, MessageSid, Participant, Reactions,
    reactions_attribute,
};
use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
use std::collections::HashMap;

fn text(index: i64, author: &str, body: &str) -> Message {
    Message {
        sid: MessageSid(format!("IM{index:04}")),
        index: MessageIndex(index),
        author: author.to_string(),
        body: Some(body.to_string()),
        media: None,
        date_created: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
            + chrono::Duration::minutes(index.max(0)),
        attributes: Attributes::new(),
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .unwrap()
        .fixed_offset()
}

fn render(
    width: u16,
    height: u16,
    state: &mut MessageListState,
    list: impl FnOnce() -> MessageList<'static>,
) -> Buffer {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| f.render_stateful_widget(list(), f.area(), state))
        .unwrap();
    terminal.backend().buffer().clone()
}

fn leak(messages: Vec<Message>) -> &'static [Message] {
    Box::leak(messages.into_boxed_slice())
}

#[test]
fn test_newest_message_at_bottom() {
    let messages = leak(vec![
        text(0, "alice", "message 0"),
        text(1, "bob", "message 1"),
        text(2, "alice", "message 2"),
    ]);
    let mut state = MessageListState::new();
    let buffer = render(40, 12, &mut state, || {
        MessageList::new(messages).now(now()).show_scrollbar(false)
    });

    assert_eq!(row_text(&buffer, 11), "  message 2");
    assert_eq!(row_text(&buffer, 10), "[9:02] alice");
    assert_eq!(row_text(&buffer, 8), "  message 1");
    assert_eq!(row_text(&buffer, 7), "[9:01] bob");
    assert_eq!(row_text(&buffer, 5), "  message 0");
    assert_eq!(row_text(&buffer, 4), "[9:00] alice");
    assert_eq!(row_text(&buffer, 3), "");
    assert_eq!(state.last_rendered_count, 3);
    assert_eq!(state.scroll, 0);
}

#[test]
fn test_grouped_message_hides_author() {
    let messages = leak(vec![text(0, "alice", "first"), text(1, "alice", "second")]);
    let mut state = MessageListState::new();
    let buffer = render(40, 12, &mut state, || {
        MessageList::new(messages).now(now()).show_scrollbar(false)
    });

    assert_eq!(row_text(&buffer, 11), "");
    assert_eq!(row_text(&buffer, 10), "  second");
    assert_eq!(row_text(&buffer, 9), "[9:01]");
    assert_eq!(row_text(&buffer, 8), "  first");
    assert_eq!(row_text(&buffer, 7), "[9:00] alice");
}

#[test]
fn test_older_dates_are_shown_in_full() {
    let mut old = text(0, "alice", "old news");
    old.date_created = Utc.with_ymd_and_hms(2024, 2, 27, 8, 30, 0).unwrap();
    let messages = leak(vec![old]);
    let mut state = MessageListState::new();
    let buffer = render(40, 6, &mut state, || {
        MessageList::new(messages).now(now()).show_scrollbar(false)
    });

    assert_eq!(row_text(&buffer, 4), "[27/2/24 8:30] alice");
}

#[test]
fn test_loader_row_requests_fetch() {
    let messages = leak((0..3).map(|i| text(i, "alice", "hello")).collect());
    let mut state = MessageListState::new();
    let buffer = render(40, 12, &mut state, || {
        MessageList::new(messages)
            .now(now())
            .has_more(true)
            .show_scrollbar(false)
    });

    let rendered = buffer_to_string(&buffer);
    let settings = configure_insta();
    settings.bind(|| {
        insta::assert_snapshot!("message_list_loader_row", rendered);
    });
    assert!(state.take_fetch_request());
    assert!(!state.take_fetch_request());
}

#[test]
fn test_fetch_requested_only_when_loader_visible() {
    let messages = leak((0..10).map(|i| text(i, "alice", "hello")).collect());
    let mut state = MessageListState::new();
    render(40, 6, &mut state, || {
        MessageList::new(messages)
            .now(now())
            .has_more(true)
            .show_scrollbar(false)
    });
    assert!(!state.take_fetch_request());

    state.scroll = 100;
    render(40, 6, &mut state, || {
        MessageList::new(messages)
            .now(now())
            .has_more(true)
            .show_scrollbar(false)
    });
    // 10 rows of 3 plus the loader, minus the viewport
    assert_eq!(state.scroll, 25);
    assert!(state.take_fetch_request());
}

#[test]
fn test_no_loader_without_more_history() {
    let messages = leak((0..3).map(|i| text(i, "alice", "hello")).collect());
    let mut state = MessageListState::new();
    let buffer = render(40, 12, &mut state, || {
        MessageList::new(messages).now(now()).show_scrollbar(false)
    });

    assert!(!buffer_to_string(&buffer).contains("Loading"));
    assert!(!state.take_fetch_request());
}

#[test]
fn test_horizon_divider() {
    let messages = leak((0..4).map(|i| text(i, "bob", "news")).collect());
    let mut state = MessageListState::new();
    let buffer = render(40, 20, &mut state, || {
        MessageList::new(messages)
            .now(now())
            .own_username(Some("me"))
            .last_read_index(MessageIndex(1))
            .show_scrollbar(false)
    });

    // Message 3 takes three rows, the divider tops message 2.
    assert!(row_text(&buffer, 13).contains("2 new messages"));
    assert_eq!(state.horizon.horizon().map(|h| h.amount), Some(2));
    assert!(!state.horizon.needs_scroll());

    let rendered = buffer_to_string(&buffer);
    let settings = configure_insta();
    settings.bind(|| {
        insta::assert_snapshot!("message_list_horizon_divider", rendered);
    });
}

#[test]
fn test_no_horizon_when_own_message_is_newest() {
    let messages = leak(vec![text(0, "bob", "question?"), text(1, "me", "answer")]);
    let mut state = MessageListState::new();
    let buffer = render(40, 12, &mut state, || {
        MessageList::new(messages)
            .now(now())
            .own_username(Some("me"))
            .last_read_index(MessageIndex(0))
            .show_scrollbar(false)
    });

    assert!(!buffer_to_string(&buffer).contains("new message"));
    assert_eq!(state.horizon.horizon(), None);
}

#[test]
fn test_horizon_scrolled_into_view_once() {
    let messages = leak((0..20).map(|i| text(i, "bob", "news")).collect());
    let mut state = MessageListState::new();
    let list = || {
        MessageList::new(messages)
            .now(now())
            .own_username(Some("me"))
            .last_read_index(MessageIndex(4))
            .show_scrollbar(false)
    };
    let buffer = render(40, 6, &mut state, list);

    assert_eq!(state.scroll, 40);
    assert!(row_text(&buffer, 0).contains("15 new messages"));

    state.scroll_to_bottom();
    render(40, 6, &mut state, list);
    assert_eq!(state.scroll, 0);
}

#[test]
fn test_sending_status() {
    let messages = leak(vec![text(-1, "me", "on its way")]);
    let mut state = MessageListState::new();
    let buffer = render(40, 12, &mut state, || {
        MessageList::new(messages)
            .now(now())
            .own_username(Some("me"))
            .show_scrollbar(false)
    });

    assert_eq!(buffer[(39, 10)].symbol(), "○");
}

#[test]
fn test_read_status() {
    let messages = leak(vec![text(0, "alice", "ping"), text(1, "me", "pong")]);
    let participants: &'static [Participant] = Box::leak(Box::new([Participant {
        identity: "alice".to_string(),
        last_read_message_index: Some(MessageIndex(1)),
    }]));
    let mut state = MessageListState::new();
    let buffer = render(40, 12, &mut state, || {
        MessageList::new(messages)
            .now(now())
            .own_username(Some("me"))
            .participants(participants)
            .show_scrollbar(false)
    });

    assert_eq!(buffer[(39, 10)].symbol(), "✓");
    // Other authors' messages carry no status
    assert_eq!(buffer[(39, 7)].symbol(), " ");
}

fn file_message() -> Message {
    let mut message = text(0, "alice", "");
    message.body = None;
    message.media = Some(Media {
        sid: "ME0".to_string(),
        content_type: "text/plain".to_string(),
        filename: "release-notes.txt".to_string(),
        size: 43,
    });
    message
}

#[test]
fn test_attachment_row() {
    let messages = leak(vec![file_message()]);
    let mut state = MessageListState::new();
    let buffer = render(40, 12, &mut state, || {
        MessageList::new(messages).now(now()).show_scrollbar(false)
    });

    assert_eq!(row_text(&buffer, 8), "[9:00] alice");
    assert!(row_text(&buffer, 9).contains("release-notes.txt"));
    assert!(row_text(&buffer, 10).contains("43 B · text/plain · Not downloaded"));
    assert!(row_text(&buffer, 11).starts_with("  ╰"));
}

#[test]
fn test_attachment_state_and_hints() {
    let messages = leak(vec![file_message()]);
    let attachments: &'static HashMap<MessageSid, AttachmentState> = Box::leak(Box::new(
        HashMap::from([(MessageSid("IM0000".to_string()), AttachmentState::Downloaded)]),
    ));
    let mut state = MessageListState::new();
    state.select(Some(MessageSid("IM0000".to_string())));
    let buffer = render(40, 12, &mut state, || {
        MessageList::new(messages)
            .now(now())
            .attachments(attachments)
            .focused(true)
            .show_scrollbar(false)
    });

    let output = buffer_to_string(&buffer);
    assert!(output.contains("text/plain · Downloaded"));
    assert!(output.contains("[ (Enter) Save ]"));
}

#[test]
fn test_reactions_line() {
    let mut reactions = Reactions::new();
    reactions.insert(
        "👍".to_string(),
        vec!["me".to_string(), "bob".to_string()],
    );
    let mut mine = text(0, "me", "ship it");
    mine.attributes = reactions_attribute(&reactions);
    let messages = leak(vec![mine]);
    let mut state = MessageListState::new();
    let buffer = render(40, 12, &mut state, || {
        MessageList::new(messages)
            .now(now())
            .own_username(Some("me"))
            .show_scrollbar(false)
    });

    assert_eq!(row_text(&buffer, 10), "  ship it");
    assert!(buffer_to_string(&buffer).contains("[👍 2]"));
}

#[test]
fn test_selection_scrolled_into_view() {
    let messages = leak((0..20).map(|i| text(i, "bob", "news")).collect());
    let mut state = MessageListState::new();
    state.select(Some(MessageSid("IM0000".to_string())));
    let buffer = render(40, 6, &mut state, || {
        MessageList::new(messages).now(now()).show_scrollbar(false)
    });

    assert_eq!(state.scroll, 54);
    assert_eq!(row_text(&buffer, 1), "[9:00] bob");
    assert_eq!(row_text(&buffer, 2), "  news");
}

#[test]
fn test_long_text_wraps() {
    let body = "one two three four five six seven eight nine ten eleven twelve";
    let messages = leak(vec![text(0, "alice", body)]);
    let mut state = MessageListState::new();
    let buffer = render(30, 10, &mut state, || {
        MessageList::new(messages).now(now()).show_scrollbar(false)
    });

    let output = buffer_to_string(&buffer);
    assert!(output.contains("↳"));
    assert!(output.contains("twelve"));
    let row = state.layout.row_of_message(0).unwrap();
    assert!(row.height > 3);
}

#[test]
fn test_scrollbar_shown_when_overflowing() {
    let messages = leak((0..10).map(|i| text(i, "alice", "hello")).collect());
    let mut state = MessageListState::new();
    let buffer = render(20, 5, &mut state, || {
        MessageList::new(messages).now(now()).show_scrollbar(true)
    });

    for y in 0..5 {
        let symbol = buffer[(19, y)].symbol();
        assert!(
            ["↑", "↓", "│", "█", " "].contains(&symbol),
            "Expected scrollbar symbol at (19, {}), found '{}'",
            y,
            symbol
        );
    }
    assert_eq!(buffer[(19, 0)].symbol(), "↑");
    assert_eq!(buffer[(19, 4)].symbol(), "↓");
}

use chrono::Utc;
use parley::widgets::MessageListState;
use parley_client::model::{Attributes, Message, MessageIndex, MessageSid};

fn msg(index: i64) -> Message {
    Message {
        sid: MessageSid(format!("IM{index:04}")),
        index: MessageIndex(index),
        author: "alice".to_string(),
        body: Some(format!("message {index}")),
        media: None,
        date_created: Utc::now(),
        attributes: Attributes::new(),
    }
}

fn sid(index: i64) -> Option<MessageSid> {
    Some(MessageSid(format!("IM{index:04}")))
}

#[test]
fn test_select_previous_starts_at_newest() {
    let messages: Vec<_> = (0..3).map(msg).collect();
    let mut state = MessageListState::new();

    state.select_previous(&messages);
    assert_eq!(state.selected, sid(2));
    state.select_previous(&messages);
    state.select_previous(&messages);
    assert_eq!(state.selected, sid(0));
    // Stays on the oldest message
    state.select_previous(&messages);
    assert_eq!(state.selected, sid(0));
}

#[test]
fn test_select_next_past_newest_clears() {
    let messages: Vec<_> = (0..3).map(msg).collect();
    let mut state = MessageListState::new();
    state.select(sid(1));

    state.select_next(&messages);
    assert_eq!(state.selected, sid(2));
    state.select_next(&messages);
    assert_eq!(state.selected, None);
}

#[test]
fn test_selection_survives_prepend() {
    let mut messages: Vec<_> = (5..10).map(msg).collect();
    let mut state = MessageListState::new();
    state.select(sid(6));
    assert_eq!(state.selected_position(&messages), Some(1));

    let mut older: Vec<_> = (0..5).map(msg).collect();
    older.append(&mut messages);
    let messages = older;

    assert_eq!(state.selected_position(&messages), Some(6));
    assert_eq!(
        state.selected_message(&messages).map(|m| m.index),
        Some(MessageIndex(6))
    );
}

#[test]
fn test_selection_of_removed_message() {
    let messages: Vec<_> = (0..3).map(msg).collect();
    let mut state = MessageListState::new();
    state.select(sid(7));
    assert_eq!(state.selected_message(&messages), None);
    // Falls back to the newest message
    state.select_previous(&messages);
    assert_eq!(state.selected, sid(2));
}

#[test]
fn test_scrolling() {
    let mut state = MessageListState::new();
    state.viewport_height = 10;

    state.scroll_up();
    assert_eq!(state.scroll, 1);
    state.page_up();
    assert_eq!(state.scroll, 10);
    state.page_down();
    assert_eq!(state.scroll, 1);
    state.page_down();
    assert_eq!(state.scroll, 0);
    state.scroll_down();
    assert_eq!(state.scroll, 0);

    state.scroll = 42;
    state.scroll_to_bottom();
    assert_eq!(state.scroll, 0);
}

#[test]
fn test_reset() {
    let mut state = MessageListState::new();
    state.scroll = 12;
    state.select(sid(1));
    state.reset();
    assert_eq!(state, MessageListState::default());
    assert!(!state.take_fetch_request());
}

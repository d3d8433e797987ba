use crate::horizon::{HorizonTracker, effective_last_read_index};
use crate::layout::{
    LayoutParams, ListLayout, Row, RowKind, RowMetrics, is_same_author_as_previous, top_padding,
};
use crate::time::message_time;
use crate::widgets::attachment_card::{AttachmentCard, AttachmentState};
use crate::widgets::card::truncate;
use chrono::{DateTime, FixedOffset, Utc};
use parley_client::model::{
    DeliveryStatus, Message, MessageIndex, MessageSid, Participant, delivery_status,
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};
use std::collections::HashMap;
use unicode_width::UnicodeWidthStr;

const LOADING_LABEL: &str = "Loading older messages…";

#[derive(Debug, Clone, Default)]
pub struct MessageListState {
    /// Scroll offset in rows from the bottom
    pub scroll: u32,
    /// Currently selected message
    pub selected: Option<MessageSid>,
    pub layout: ListLayout,
    pub horizon: HorizonTracker,
    /// Height of the list area in the last frame
    pub viewport_height: u32,
    /// Number of rows that were rendered in the last frame
    pub last_rendered_count: usize,
    fetch_requested: bool,
    /// If true, the next render will adjust scroll to make the selection visible
    pub(crate) ensure_selected_visible: bool,
}

impl PartialEq for MessageListState {
    fn eq(&self, other: &Self) -> bool {
        self.scroll == other.scroll
            && self.selected == other.selected
            && self.last_rendered_count == other.last_rendered_count
            && self.layout.total_height == other.layout.total_height
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets everything tied to the current conversation.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn select(&mut self, sid: Option<MessageSid>) {
        self.selected = sid;
        self.ensure_selected_visible = true;
    }

    /// Moves the selection one message towards the newest end. Stepping past
    /// the newest message clears the selection.
    pub fn select_next(&mut self, messages: &[Message]) {
        let next = self
            .selected_position(messages)
            .and_then(|i| messages.get(i + 1))
            .map(|m| m.sid.clone());
        self.select(next);
    }

    /// Moves the selection one message towards the oldest end, starting from
    /// the newest message when nothing is selected.
    pub fn select_previous(&mut self, messages: &[Message]) {
        let previous = match self.selected_position(messages) {
            Some(i) => messages.get(i.saturating_sub(1)),
            None => messages.last(),
        };
        self.select(previous.map(|m| m.sid.clone()));
    }

    pub fn selected_position(&self, messages: &[Message]) -> Option<usize> {
        let selected = self.selected.as_ref()?;
        messages.iter().position(|m| &m.sid == selected)
    }

    pub fn selected_message<'m>(&self, messages: &'m [Message]) -> Option<&'m Message> {
        self.selected_position(messages).map(|i| &messages[i])
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn page_up(&mut self) {
        self.scroll = self
            .scroll
            .saturating_add(self.viewport_height.saturating_sub(1).max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll = self
            .scroll
            .saturating_sub(self.viewport_height.saturating_sub(1).max(1));
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = 0;
    }

    /// Whether the last frame reached the loader row. Cleared on read.
    pub fn take_fetch_request(&mut self) -> bool {
        std::mem::take(&mut self.fetch_requested)
    }
}

/// One terminal line of a row, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowLine {
    Horizon,
    Blank,
    Header,
    Text(usize),
    Card(usize),
    Reactions,
    Loader,
}

pub struct MessageList<'a> {
    block: Option<Block<'a>>,
    messages: &'a [Message],
    own_username: Option<&'a str>,
    participants: &'a [Participant],
    has_more: bool,
    last_read_index: MessageIndex,
    metrics: RowMetrics,
    now: DateTime<FixedOffset>,
    attachments: Option<&'a HashMap<MessageSid, AttachmentState>>,
    show_scrollbar: bool,
    focused: bool,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [Message]) -> Self {
        Self {
            block: None,
            messages,
            own_username: None,
            participants: &[],
            has_more: false,
            last_read_index: MessageIndex::PENDING,
            metrics: RowMetrics::default(),
            now: Utc::now().fixed_offset(),
            attachments: None,
            show_scrollbar: true,
            focused: false,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn own_username(mut self, username: Option<&'a str>) -> Self {
        self.own_username = username;
        self
    }

    pub fn participants(mut self, participants: &'a [Participant]) -> Self {
        self.participants = participants;
        self
    }

    /// Whether older messages can still be fetched; adds the loader row.
    pub fn has_more(mut self, has_more: bool) -> Self {
        self.has_more = has_more;
        self
    }

    pub fn last_read_index(mut self, index: MessageIndex) -> Self {
        self.last_read_index = index;
        self
    }

    pub fn metrics(mut self, metrics: RowMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn now(mut self, now: DateTime<FixedOffset>) -> Self {
        self.now = now;
        self
    }

    pub fn attachments(mut self, attachments: &'a HashMap<MessageSid, AttachmentState>) -> Self {
        self.attachments = Some(attachments);
        self
    }

    pub fn show_scrollbar(mut self, show: bool) -> Self {
        self.show_scrollbar = show;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn attachment_state(&self, sid: &MessageSid) -> AttachmentState {
        self.attachments
            .and_then(|a| a.get(sid).copied())
            .unwrap_or_default()
    }

    fn row_lines(&self, row: &Row, state: &MessageListState) -> Vec<RowLine> {
        let height = row.height as usize;
        let idx = match row.kind {
            RowKind::Loader => return vec![RowLine::Loader; height],
            RowKind::Message(idx) => idx,
        };
        let msg = &self.messages[idx];

        let mut lines = Vec::with_capacity(height);
        if row.has_horizon {
            lines.extend(std::iter::repeat_n(
                RowLine::Horizon,
                self.metrics.horizon_height as usize,
            ));
        }
        let padding = self.metrics.vertical_padding;
        let top = top_padding(self.messages, idx, &self.metrics).min(padding);
        lines.extend(std::iter::repeat_n(RowLine::Blank, top as usize));
        lines.push(RowLine::Header);

        if let Some(media) = &msg.media {
            let card_height = if media.is_image() {
                self.metrics.image_height
            } else {
                self.metrics.file_height
            };
            lines.extend((0..card_height as usize).map(RowLine::Card));
        } else {
            let count = state
                .layout
                .wrapped_lines(&msg.sid)
                .map_or(1, |l| l.len());
            lines.extend((0..count).map(RowLine::Text));
        }
        if !msg.reactions().is_empty() {
            lines.push(RowLine::Reactions);
        }
        lines.extend(std::iter::repeat_n(
            RowLine::Blank,
            (padding - top) as usize,
        ));
        // Metrics with taller units than the parts drawn here pad with blanks.
        lines.resize(height.max(lines.len()), RowLine::Blank);
        lines.truncate(height);
        lines
    }

    fn render_row_line(
        &self,
        line: RowLine,
        row: &Row,
        card_height: usize,
        area: Rect,
        buf: &mut Buffer,
        state: &MessageListState,
    ) {
        let idx = match row.kind {
            RowKind::Message(idx) => idx,
            RowKind::Loader => {
                let label = truncate(LOADING_LABEL, area.width as usize);
                let x = area.x + area.width.saturating_sub(label.width() as u16) / 2;
                buf.set_string(
                    x,
                    area.y,
                    &label,
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                );
                return;
            }
        };
        let msg = &self.messages[idx];
        let selected = state.selected.as_ref() == Some(&msg.sid);
        let mut text_style = if msg.is_sending() {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC)
        } else {
            Style::default()
        };
        if self.focused && selected {
            text_style = text_style.bg(Color::Indexed(236));
        }

        match line {
            RowLine::Blank => {}
            RowLine::Loader => {}
            RowLine::Horizon => {
                let Some(horizon) = state.horizon.horizon() else {
                    return;
                };
                let label = format!(" {} ", horizon.label());
                let rule_style = Style::default().fg(Color::Red);
                buf.set_string(
                    area.x,
                    area.y,
                    "─".repeat(area.width as usize),
                    rule_style,
                );
                let label = truncate(&label, area.width as usize);
                let x = area.x + area.width.saturating_sub(label.width() as u16) / 2;
                buf.set_string(x, area.y, &label, rule_style.add_modifier(Modifier::BOLD));
            }
            RowLine::Header => {
                if self.focused && selected {
                    for x in area.left()..area.right() {
                        buf[(x, area.y)].set_style(text_style);
                    }
                }
                let is_me = self.own_username == Some(msg.author.as_str());
                let time = message_time(msg.date_created, self.now);
                let mut x = area.x;
                let time_str = format!("[{time}] ");
                buf.set_string(x, area.y, &time_str, Style::default().fg(Color::DarkGray));
                x += time_str.width() as u16;

                if !is_same_author_as_previous(self.messages, idx) {
                    let sender_style = if is_me {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::Cyan)
                    }
                    .add_modifier(Modifier::BOLD);
                    let max = area.right().saturating_sub(x).saturating_sub(2) as usize;
                    let name = truncate(&msg.author, max);
                    buf.set_string(x, area.y, &name, sender_style);
                }

                if let Some(status) = delivery_status(msg, self.participants, self.own_username)
                {
                    let symbol = match status {
                        DeliveryStatus::Sending => "○",
                        DeliveryStatus::Delivered => "●",
                        DeliveryStatus::Read => "✓",
                    };
                    if area.width > 1 {
                        buf.set_string(
                            area.right() - 1,
                            area.y,
                            symbol,
                            Style::default().fg(Color::DarkGray),
                        );
                    }
                }
            }
            RowLine::Text(line_idx) => {
                let Some(wrapped) = state
                    .layout
                    .wrapped_lines(&msg.sid)
                    .and_then(|l| l.get(line_idx))
                else {
                    return;
                };
                if self.focused && selected {
                    for x in area.left()..area.right() {
                        buf[(x, area.y)].set_style(text_style);
                    }
                }
                buf.set_stringn(
                    area.x + 2,
                    area.y,
                    &wrapped.text,
                    area.width.saturating_sub(3) as usize,
                    text_style,
                );
                if wrapped.is_soft_wrap && area.width > 0 {
                    buf.set_string(
                        area.right() - 1,
                        area.y,
                        "↳",
                        Style::default().fg(Color::DarkGray),
                    );
                }
            }
            RowLine::Card(line_idx) => {
                let Some(media) = &msg.media else {
                    return;
                };
                let card = AttachmentCard::new(media)
                    .state(self.attachment_state(&msg.sid))
                    .sending(msg.is_sending())
                    .focused(self.focused && selected);
                card.render_line(
                    line_idx,
                    card_height,
                    Rect::new(area.x + 2, area.y, area.width.saturating_sub(2), 1),
                    buf,
                );
            }
            RowLine::Reactions => {
                let summary = msg
                    .reactions()
                    .iter()
                    .filter(|(_, users)| !users.is_empty())
                    .map(|(emoji, users)| {
                        let mine = self
                            .own_username
                            .is_some_and(|me| users.iter().any(|u| u == me));
                        if mine {
                            format!("[{emoji} {}]", users.len())
                        } else {
                            format!("{emoji} {}", users.len())
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("  ");
                buf.set_stringn(
                    area.x + 2,
                    area.y,
                    &summary,
                    area.width.saturating_sub(2) as usize,
                    Style::default().fg(Color::Magenta),
                );
            }
        }
    }
}

impl<'a> StatefulWidget for MessageList<'a> {
    type State = MessageListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner_area = if let Some(block) = self.block.clone() {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner_area.width == 0 || inner_area.height == 0 {
            return;
        }
        let viewport = inner_area.height as u32;
        state.viewport_height = viewport;

        let last_read =
            effective_last_read_index(self.messages, self.last_read_index, self.own_username);
        state.horizon.observe(self.messages, last_read);

        // The scrollbar column depends on the total height, which depends on
        // the wrap width. Lay out once without it and redo if it shows up.
        let mut scrollbar_adjustment = 0u16;
        for _ in 0..2 {
            let chars_per_line = self
                .metrics
                .chars_per_line
                .min(inner_area.width.saturating_sub(3 + scrollbar_adjustment) as usize)
                .max(1);
            let params = LayoutParams {
                own_username: self.own_username,
                horizon: state.horizon.horizon(),
                has_more: self.has_more,
                metrics: &self.metrics,
                chars_per_line,
            };
            state.layout.update(self.messages, &params);
            let wants_scrollbar = self.show_scrollbar && state.layout.total_height > viewport;
            if wants_scrollbar == (scrollbar_adjustment == 1) {
                break;
            }
            scrollbar_adjustment = u16::from(wants_scrollbar);
        }

        if state.horizon.needs_scroll() {
            let target = state.horizon.horizon().and_then(|h| {
                let idx = self.messages.iter().position(|m| m.index == h.first_index)?;
                state.layout.row_of_message(idx).copied()
            });
            if let Some(row) = target {
                // Divider at the top of the viewport, or as high as it goes.
                state.scroll = row.end().saturating_sub(viewport);
            }
            state.horizon.mark_scrolled();
        }

        if state.ensure_selected_visible {
            if let Some(idx) = state.selected_position(self.messages)
                && let Some(row) = state.layout.row_of_message(idx).copied()
            {
                state.scroll = state.layout.scroll_to_reveal(&row, state.scroll, viewport);
            }
            state.ensure_selected_visible = false;
        }
        state.scroll = state.scroll.min(state.layout.max_scroll(viewport));

        let content_width = inner_area.width.saturating_sub(scrollbar_adjustment);
        let bottom = inner_area.y as u32 + viewport;
        let visible: Vec<Row> = state
            .layout
            .visible_rows(state.scroll, viewport)
            .copied()
            .collect();

        for row in &visible {
            let lines = self.row_lines(row, state);
            let card_height = lines
                .iter()
                .filter(|l| matches!(l, RowLine::Card(_)))
                .count()
                .max(2);
            let height = lines.len() as u32;
            for (line_idx, line) in lines.into_iter().enumerate() {
                // Distance of this line from the bottom of the list
                let pos = row.offset + (height - 1 - line_idx as u32);
                if pos < state.scroll || pos >= state.scroll + viewport {
                    continue;
                }
                let y = (bottom - 1 - (pos - state.scroll)) as u16;
                let line_area = Rect::new(inner_area.x, y, content_width, 1);
                self.render_row_line(line, row, card_height, line_area, buf, state);
            }
        }

        state.last_rendered_count = visible.len();
        state.fetch_requested =
            self.has_more && state.layout.reaches_unloaded(state.scroll, viewport);

        if scrollbar_adjustment == 1 {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            let max_scroll = state.layout.max_scroll(viewport) as usize;
            let scrollbar_pos = max_scroll.saturating_sub(state.scroll as usize);
            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(scrollbar_pos);

            scrollbar.render(inner_area, buf, &mut scrollbar_state);
        }
    }
}

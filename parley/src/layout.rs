//! Row geometry for the message list.
//!
//! Row heights are estimated from message content instead of measured: a
//! fixed base, a fixed increment for image and file attachments, and one line
//! increment per wrapped line of text. Rows are indexed from the newest
//! message (row 0, drawn at the bottom) towards older ones; when more history
//! is available one extra row at the oldest end stands in for the page being
//! loaded.

use crate::horizon::Horizon;
use parley_client::model::{Message, MessageSid};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Height increments, in whatever unit the list is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowMetrics {
    /// Empty message block (header) for other authors
    pub base_height: u32,
    /// Empty message block for the current user, which also carries a status
    pub own_base_height: u32,
    /// Padding reserved around every row
    pub vertical_padding: u32,
    pub image_height: u32,
    pub file_height: u32,
    pub line_height: u32,
    pub chars_per_line: usize,
    /// Top padding of a row that starts a new author block
    pub full_top_padding: u32,
    /// Top padding of a row continuing the previous author's block
    pub reduced_top_padding: u32,
    pub horizon_height: u32,
    pub loader_height: u32,
    pub reactions_height: u32,
}

/// Terminal cells.
impl Default for RowMetrics {
    fn default() -> Self {
        Self {
            base_height: 1,
            own_base_height: 1,
            vertical_padding: 1,
            image_height: 5,
            file_height: 3,
            line_height: 1,
            chars_per_line: 75,
            full_top_padding: 1,
            reduced_top_padding: 0,
            horizon_height: 1,
            loader_height: 1,
            reactions_height: 1,
        }
    }
}

impl RowMetrics {
    /// Pixel values of the browser rendering of the same list.
    pub fn web() -> Self {
        Self {
            base_height: 93,
            own_base_height: 98,
            vertical_padding: 24,
            image_height: 200,
            file_height: 71,
            line_height: 17,
            chars_per_line: 75,
            full_top_padding: 16,
            reduced_top_padding: 4,
            horizon_height: 0,
            loader_height: 0,
            reactions_height: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    pub text: String,
    pub is_soft_wrap: bool,
}

/// Word wraps `text` at `width` columns. Words wider than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<WrappedLine> {
    if width == 0 {
        return vec![WrappedLine {
            text: text.to_string(),
            is_soft_wrap: false,
        }];
    }
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            lines.push(WrappedLine {
                text: String::new(),
                is_soft_wrap: false,
            });
            continue;
        }

        let mut current_line = String::new();
        let mut current_width = 0;

        let graphemes: Vec<&str> = paragraph.graphemes(true).collect();
        let mut i = 0;
        while i < graphemes.len() {
            let g = graphemes[i];

            if g.chars().all(char::is_whitespace) {
                current_line.push_str(g);
                current_width += g.width();
                i += 1;
                continue;
            }

            let word_end = graphemes[i..]
                .iter()
                .position(|next| next.chars().all(char::is_whitespace))
                .map_or(graphemes.len(), |p| i + p);
            let word = graphemes[i..word_end].concat();
            let word_width = word.width();

            if current_width + word_width > width {
                if !current_line.trim_end().is_empty() {
                    lines.push(WrappedLine {
                        text: current_line.trim_end().to_string(),
                        is_soft_wrap: true,
                    });
                }
                current_line = String::new();
                current_width = 0;

                if word_width > width {
                    for g in word.graphemes(true) {
                        let gw = g.width();
                        if current_width + gw > width {
                            lines.push(WrappedLine {
                                text: std::mem::take(&mut current_line),
                                is_soft_wrap: true,
                            });
                            current_width = 0;
                        }
                        current_line.push_str(g);
                        current_width += gw;
                    }
                } else {
                    current_line = word;
                    current_width = word_width;
                }
            } else {
                current_line.push_str(&word);
                current_width += word_width;
            }
            i = word_end;
        }

        lines.push(WrappedLine {
            text: current_line.trim_end().to_string(),
            is_soft_wrap: false,
        });
    }
    lines
}

/// Number of lines `body` is expected to take at `chars_per_line` columns.
/// Always at least one.
pub fn estimate_text_lines(body: &str, chars_per_line: usize) -> usize {
    wrap_text(body, chars_per_line).len()
}

fn height_for(
    message: &Message,
    own_username: Option<&str>,
    metrics: &RowMetrics,
    text_lines: usize,
) -> u32 {
    let mut height = if own_username == Some(message.author.as_str()) {
        metrics.own_base_height
    } else {
        metrics.base_height
    };
    height += metrics.vertical_padding;
    if !message.reactions().is_empty() {
        height += metrics.reactions_height;
    }

    if let Some(media) = &message.media {
        return height
            + if media.is_image() {
                metrics.image_height
            } else {
                metrics.file_height
            };
    }

    height + metrics.line_height * text_lines as u32
}

/// Estimated height of the row showing `message`.
pub fn estimate_row_height(
    message: &Message,
    own_username: Option<&str>,
    metrics: &RowMetrics,
) -> u32 {
    let lines = estimate_text_lines(message.body_text(), metrics.chars_per_line);
    height_for(message, own_username, metrics, lines)
}

/// Whether the message at `index` continues the previous message's author block.
pub fn is_same_author_as_previous(messages: &[Message], index: usize) -> bool {
    index > 0
        && messages
            .get(index)
            .zip(messages.get(index - 1))
            .is_some_and(|(current, previous)| current.author == previous.author)
}

pub fn top_padding(messages: &[Message], index: usize, metrics: &RowMetrics) -> u32 {
    if is_same_author_as_previous(messages, index) {
        metrics.reduced_top_padding
    } else {
        metrics.full_top_padding
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Position in the ascending message slice
    Message(usize),
    /// Placeholder for the older page being fetched
    Loader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
    pub kind: RowKind,
    pub height: u32,
    /// Distance of the row's bottom edge from the bottom of the list
    pub offset: u32,
    /// Whether the horizon divider is drawn at the top of this row
    pub has_horizon: bool,
}

impl Row {
    pub fn end(&self) -> u32 {
        self.offset + self.height
    }
}

/// Inputs that shape the layout besides the messages themselves.
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams<'a> {
    pub own_username: Option<&'a str>,
    pub horizon: Option<Horizon>,
    pub has_more: bool,
    pub metrics: &'a RowMetrics,
    /// Wrap width; the metrics value unless the viewport is narrower
    pub chars_per_line: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListLayout {
    pub rows: Vec<Row>,
    pub total_height: u32,
    chars_per_line: usize,
    /// Wrapped bodies at `chars_per_line`
    wrapped: HashMap<MessageSid, Vec<WrappedLine>>,
}

impl ListLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.rows.clear();
        self.total_height = 0;
        self.wrapped.clear();
    }

    /// Recomputes every row. Wrapped bodies are reused while the wrap width is unchanged.
    pub fn update(&mut self, messages: &[Message], params: &LayoutParams<'_>) {
        if params.chars_per_line != self.chars_per_line {
            self.wrapped.clear();
            self.chars_per_line = params.chars_per_line;
        }
        if self.wrapped.len() > messages.len() {
            self.wrapped
                .retain(|sid, _| messages.iter().any(|m| &m.sid == sid));
        }

        self.rows.clear();
        let mut offset = 0;
        for (rev_idx, message) in messages.iter().rev().enumerate() {
            let idx = messages.len() - 1 - rev_idx;
            let text_lines = if message.media.is_some() {
                0
            } else {
                self.wrapped
                    .entry(message.sid.clone())
                    .or_insert_with(|| wrap_text(message.body_text(), params.chars_per_line))
                    .len()
            };
            let has_horizon = params
                .horizon
                .is_some_and(|h| h.first_index == message.index);
            let mut height = height_for(message, params.own_username, params.metrics, text_lines);
            if has_horizon {
                height += params.metrics.horizon_height;
            }
            self.rows.push(Row {
                kind: RowKind::Message(idx),
                height,
                offset,
                has_horizon,
            });
            offset += height;
        }
        if params.has_more {
            self.rows.push(Row {
                kind: RowKind::Loader,
                height: params.metrics.loader_height,
                offset,
                has_horizon: false,
            });
            offset += params.metrics.loader_height;
        }
        self.total_height = offset;
    }

    pub fn wrapped_lines(&self, sid: &MessageSid) -> Option<&[WrappedLine]> {
        self.wrapped.get(sid).map(Vec::as_slice)
    }

    pub fn item_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_item_loaded(&self, row: usize) -> bool {
        !matches!(
            self.rows.get(row).map(|r| r.kind),
            Some(RowKind::Loader)
        )
    }

    pub fn max_scroll(&self, viewport: u32) -> u32 {
        self.total_height.saturating_sub(viewport)
    }

    /// Rows intersecting the viewport, newest first.
    pub fn visible_rows(&self, scroll: u32, viewport: u32) -> impl Iterator<Item = &Row> + '_ {
        let top = scroll.saturating_add(viewport);
        self.rows
            .iter()
            .skip_while(move |r| r.end() <= scroll)
            .take_while(move |r| r.offset < top)
    }

    /// Whether the viewport reaches a row that has not been loaded yet.
    pub fn reaches_unloaded(&self, scroll: u32, viewport: u32) -> bool {
        self.visible_rows(scroll, viewport)
            .any(|r| r.kind == RowKind::Loader)
    }

    pub fn row_of_message(&self, index: usize) -> Option<&Row> {
        self.rows
            .iter()
            .find(|r| r.kind == RowKind::Message(index))
    }

    /// Smallest scroll change that brings `row` fully into view (or its top,
    /// when it is taller than the viewport).
    pub fn scroll_to_reveal(&self, row: &Row, scroll: u32, viewport: u32) -> u32 {
        let target = if row.end() > scroll + viewport {
            row.end().saturating_sub(viewport)
        } else if row.offset < scroll {
            row.offset
        } else {
            scroll
        };
        target.min(self.max_scroll(viewport))
    }
}

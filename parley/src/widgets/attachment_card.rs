use crate::widgets::card::{Card, truncate};
use parley_client::model::Media;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// Download progress of an attachment, as far as the list knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentState {
    #[default]
    Remote,
    Downloading,
    Downloaded,
}

pub struct AttachmentCard<'a> {
    pub media: &'a Media,
    pub state: AttachmentState,
    pub sending: bool,
    pub focused: bool,
    pub style: Style,
    pub border_style: Style,
}

impl<'a> AttachmentCard<'a> {
    pub fn new(media: &'a Media) -> Self {
        Self {
            media,
            state: AttachmentState::Remote,
            sending: false,
            focused: false,
            style: Style::default().fg(Color::White),
            border_style: Style::default().fg(Color::DarkGray),
        }
    }

    pub fn state(mut self, state: AttachmentState) -> Self {
        self.state = state;
        self
    }

    pub fn sending(mut self, sending: bool) -> Self {
        self.sending = sending;
        if sending {
            self.style = Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC);
        }
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        if focused {
            self.border_style = Style::default().fg(Color::Cyan);
        }
        self
    }

    fn status_text(&self) -> &'static str {
        if self.sending {
            return "Sending…";
        }
        match (self.state, self.media.is_image()) {
            (AttachmentState::Downloading, _) => "Downloading…",
            (AttachmentState::Downloaded, true) => "Ready to preview",
            (AttachmentState::Downloaded, false) => "Downloaded",
            (AttachmentState::Remote, _) => "Not downloaded",
        }
    }

    fn hints(&self) -> Option<&'static str> {
        if !self.focused || self.sending {
            return None;
        }
        Some(if self.media.is_image() {
            "[ (Enter) Preview ]"
        } else {
            "[ (Enter) Save ]"
        })
    }

    pub fn render_line(&self, line_idx: usize, height: usize, area: Rect, buf: &mut Buffer) {
        let icon = if self.media.is_image() { "🖼" } else { "📎" };
        let card = Card::new(self.media.filename.clone(), icon)
            .style(self.style)
            .border_style(self.border_style)
            .focused(self.focused);

        card.render_line(
            line_idx,
            height,
            area,
            buf,
            |content_line, inner_area, buf| {
                let text = match content_line {
                    0 => format!(
                        "{} · {} · {}",
                        format_size(self.media.size),
                        self.media.content_type,
                        self.status_text()
                    ),
                    1 if self.media.is_image() && self.state == AttachmentState::Downloaded => {
                        "Press Enter to open the preview".to_string()
                    }
                    _ => String::new(),
                };
                let text = truncate(&text, inner_area.width as usize);
                buf.set_string(inner_area.x, inner_area.y, &text, self.style);
            },
            self.hints(),
        );
    }
}

impl Widget for AttachmentCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = area.height as usize;
        for i in 0..area.height {
            self.render_line(
                i as usize,
                height,
                Rect::new(area.x, area.y + i, area.width, 1),
                buf,
            );
        }
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = 1_048_576.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

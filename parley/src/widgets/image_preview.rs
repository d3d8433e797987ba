use crate::widgets::attachment_card::format_size;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

/// Modal shown when an image attachment is opened.
pub struct ImagePreviewModal {
    filename: String,
    author: String,
    date: String,
    content_type: String,
    size: u64,
    title: String,
}

impl ImagePreviewModal {
    pub fn new(filename: String, author: String, date: String) -> Self {
        Self {
            filename,
            author,
            date,
            content_type: String::new(),
            size: 0,
            title: " Image preview ".to_string(),
        }
    }

    pub fn content_type(mut self, content_type: String) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    fn lines(&self) -> Vec<Line<'_>> {
        vec![
            Line::styled(
                self.filename.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::from(format!("{} · {}", self.content_type, format_size(self.size))),
            Line::from(""),
            Line::from(format!("Sent by {}", self.author)),
            Line::from(self.date.as_str()),
            Line::from(""),
            Line::styled(
                "(s) Save   (Esc) Close",
                Style::default().fg(Color::DarkGray),
            ),
        ]
    }

    /// Returns the size (width, height) needed to show every line
    pub fn required_size(&self) -> (u16, u16) {
        let lines = self.lines();
        let width = lines
            .iter()
            .map(|l| l.to_string().width())
            .chain(std::iter::once(self.title.width()))
            .max()
            .unwrap_or(0) as u16;
        // +2 for borders, +2 for horizontal padding
        (width + 4, lines.len() as u16 + 2)
    }
}

impl Widget for ImagePreviewModal {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(self.title.clone());
        Paragraph::new(self.lines())
            .block(block)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

pub fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((r.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(popup_layout[1])[1]
}

use parley_client::state::{Notification, NotificationKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// One-line strip showing the latest notification.
pub struct NotificationBar<'a> {
    notification: Option<&'a Notification>,
}

impl<'a> NotificationBar<'a> {
    pub fn new(notification: Option<&'a Notification>) -> Self {
        Self { notification }
    }
}

impl Widget for NotificationBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let Some(notification) = self.notification else {
            return;
        };
        let (symbol, style) = match notification.kind {
            NotificationKind::Success => ("✓", Style::default().fg(Color::Green)),
            NotificationKind::Error => (
                "!",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        };
        buf.set_stringn(
            area.x,
            area.y,
            format!("{symbol} {}", notification.message),
            area.width as usize,
            style,
        );
    }
}

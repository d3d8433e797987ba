use parley::testing::row_text;
use parley::widgets::NotificationBar;
use parley_client::state::{Notification, NotificationKind};
use ratatui::{Terminal, backend::TestBackend, buffer::Buffer, style::Color};

fn render(notification: Option<&Notification>) -> Buffer {
    let backend = TestBackend::new(40, 1);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| f.render_widget(NotificationBar::new(notification), f.area()))
        .unwrap();
    terminal.backend().buffer().clone()
}

#[test]
fn test_success_notification() {
    let notification = Notification {
        id: 1,
        kind: NotificationKind::Success,
        message: "Message deleted.".to_string(),
    };
    let buffer = render(Some(&notification));
    assert_eq!(row_text(&buffer, 0), "✓ Message deleted.");
    assert_eq!(buffer[(0, 0)].fg, Color::Green);
}

#[test]
fn test_error_notification() {
    let notification = Notification {
        id: 2,
        kind: NotificationKind::Error,
        message: "Failed to download cat.png.".to_string(),
    };
    let buffer = render(Some(&notification));
    assert_eq!(row_text(&buffer, 0), "! Failed to download cat.png.");
    assert_eq!(buffer[(2, 0)].fg, Color::Red);
}

#[test]
fn test_empty_bar() {
    let buffer = render(None);
    assert_eq!(row_text(&buffer, 0), "");
}

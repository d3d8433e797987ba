use parley::testing::{buffer_to_string, configure_insta};
use parley::widgets::ImagePreviewModal;
use parley::widgets::image_preview::centered_rect;
use ratatui::{Terminal, backend::TestBackend, layout::Rect, widgets::Clear};

fn modal() -> ImagePreviewModal {
    ImagePreviewModal::new(
        "screenshot.png".to_string(),
        "alice".to_string(),
        "Fri Mar 01 2024, 9:05".to_string(),
    )
    .content_type("image/png".to_string())
    .size(68)
}

#[test]
fn test_required_size_fits_content() {
    let (width, height) = modal().required_size();
    // Seven lines plus borders
    assert_eq!(height, 9);
    assert!(width as usize >= "Fri Mar 01 2024, 9:05".len() + 4);
}

#[test]
fn test_render_preview() {
    let backend = TestBackend::new(60, 20);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| {
            let modal = modal();
            let (width, height) = modal.required_size();
            let area = centered_rect(width, height, f.area());
            f.render_widget(Clear, area);
            f.render_widget(modal, area);
        })
        .unwrap();

    let output = buffer_to_string(terminal.backend().buffer());
    assert!(output.contains("Image preview"));
    assert!(output.contains("screenshot.png"));
    assert!(output.contains("image/png · 68 B"));
    assert!(output.contains("Sent by alice"));
    assert!(output.contains("Fri Mar 01 2024, 9:05"));
    assert!(output.contains("(s) Save   (Esc) Close"));
}

#[test]
fn test_render_preview_frame() {
    let backend = TestBackend::new(40, 11);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| {
            let modal = ImagePreviewModal::new(
                "screenshot.png".to_string(),
                "dave".to_string(),
                "Fri Mar 01 2024, 19:05".to_string(),
            )
            .content_type("image/png".to_string())
            .size(68);
            let (width, height) = modal.required_size();
            assert_eq!((width, height), (26, 9));
            let area = centered_rect(width, height, f.area());
            f.render_widget(Clear, area);
            f.render_widget(modal, area);
        })
        .unwrap();

    let rendered = buffer_to_string(terminal.backend().buffer());
    let settings = configure_insta();
    settings.bind(|| {
        insta::assert_snapshot!("image_preview_modal", rendered);
    });
}

#[test]
fn test_centered_rect() {
    let area = centered_rect(20, 10, Rect::new(0, 0, 60, 30));
    assert_eq!(area, Rect::new(20, 10, 20, 10));

    let clamped = centered_rect(100, 50, Rect::new(0, 0, 60, 30));
    assert!(clamped.width <= 60 && clamped.height <= 30);
}

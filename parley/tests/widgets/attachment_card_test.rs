use parley::testing::{buffer_to_string, configure_insta};
use parley::widgets::attachment_card::format_size;
use parley::widgets::{AttachmentCard, AttachmentState};
use parley_client::model::Media;
use ratatui::{Terminal, backend::TestBackend};

fn media(content_type: &str, filename: &str) -> Media {
    Media {
        sid: "ME1".to_string(),
        content_type: content_type.to_string(),
        filename: filename.to_string(),
        size: 2048,
    }
}

fn render(card: AttachmentCard<'_>, height: u16) -> String {
    let backend = TestBackend::new(50, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|f| f.render_widget(card, f.area()))
        .unwrap();
    buffer_to_string(terminal.backend().buffer())
}

#[test]
fn test_file_card_shows_metadata() {
    let media = media("application/pdf", "report.pdf");
    let output = render(AttachmentCard::new(&media), 3);

    assert!(output.contains("report.pdf"));
    assert!(output.contains("2.0 KB · application/pdf · Not downloaded"));
    assert!(output.contains('╭'));
    assert!(output.contains('╯'));
}

#[test]
fn test_render_focused_file_card() {
    let media = media("application/pdf", "report.pdf");
    let rendered = render(AttachmentCard::new(&media).focused(true), 3);

    let settings = configure_insta();
    settings.bind(|| {
        insta::assert_snapshot!("attachment_card_focused_file", rendered);
    });
}

#[test]
fn test_focused_image_card_offers_preview() {
    let media = media("image/png", "cat.png");
    let card = AttachmentCard::new(&media)
        .state(AttachmentState::Downloaded)
        .focused(true);
    let output = render(card, 4);

    assert!(output.contains("Ready to preview"));
    assert!(output.contains("Press Enter to open the preview"));
    assert!(output.contains("[ (Enter) Preview ]"));
}

#[test]
fn test_focused_file_card_offers_save() {
    let media = media("text/plain", "notes.txt");
    let output = render(AttachmentCard::new(&media).focused(true), 3);
    assert!(output.contains("[ (Enter) Save ]"));
}

#[test]
fn test_sending_card_has_no_hints() {
    let media = media("image/png", "cat.png");
    let card = AttachmentCard::new(&media).sending(true).focused(true);
    let output = render(card, 3);

    assert!(output.contains("Sending…"));
    assert!(!output.contains("(Enter)"));
}

#[test]
fn test_downloading_state() {
    let media = media("text/plain", "notes.txt");
    let card = AttachmentCard::new(&media).state(AttachmentState::Downloading);
    assert!(render(card, 3).contains("Downloading…"));
}

#[test]
fn test_format_size() {
    assert_eq!(format_size(43), "43 B");
    assert_eq!(format_size(2048), "2.0 KB");
    assert_eq!(format_size(3 * 1_048_576), "3.0 MB");
}

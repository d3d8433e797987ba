use ratatui::buffer::Buffer;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

/// Renders a buffer as text, one line per row, framed by rules.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut s = String::new();
    s.push_str(&"─".repeat(area.width as usize));
    s.push('\n');

    for y in area.y..area.y + area.height {
        let mut x = area.x;
        while x < area.x + area.width {
            let symbol = buffer[(x, y)].symbol();
            s.push_str(symbol);
            x += symbol.width().max(1) as u16;
        }
        s.push('\n');
    }

    s.push_str(&"─".repeat(area.width as usize));
    s.push('\n');
    s
}

/// Text of a single buffer row, trailing blanks removed.
pub fn row_text(buffer: &Buffer, y: u16) -> String {
    let area = buffer.area;
    let mut s = String::new();
    let mut x = area.x;
    while x < area.x + area.width {
        let symbol = buffer[(x, y)].symbol();
        s.push_str(symbol);
        x += symbol.width().max(1) as u16;
    }
    s.trim_end().to_string()
}

/// Snapshot settings that keep `.snap` files under this crate's `tests/snapshots`.
pub fn configure_insta() -> insta::Settings {
    let mut settings = insta::Settings::clone_current();
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "snapshots"]
        .iter()
        .collect();
    settings.set_snapshot_path(path);
    settings.set_prepend_module_to_snapshot(false);
    settings
}

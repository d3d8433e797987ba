use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

const FALLBACK_NAME: &str = "attachment";

/// Strips any directory components a sender may have put in the filename.
pub fn safe_file_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::trim)
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .unwrap_or(FALLBACK_NAME)
        .to_string()
}

/// First path under `dir` for `name` that does not exist yet: `name`,
/// then `stem (1).ext`, `stem (2).ext`, ...
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(FALLBACK_NAME);
    let ext = path.extension().and_then(|e| e.to_str());
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Writes an attachment into `dir` under the name it was sent with.
pub async fn save_attachment(dir: &Path, filename: &str, data: &[u8]) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = unique_path(dir, &safe_file_name(filename));
    tokio::fs::write(&path, data).await?;
    info!("Saved attachment to {}", path.display());
    Ok(path)
}

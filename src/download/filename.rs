//! Title sanitization and output path derivation.
//!
//! Output files are named `<title>.mp3` inside the configured output
//! directory. Titles come from the playlist API and may contain characters
//! that are invalid in filenames; those are replaced while keeping the title
//! readable (spaces are preserved). Two items with the same title map to the
//! same path and the last writer wins.

use std::path::{Path, PathBuf};

/// File extension for downloaded audio artifacts.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Fallback stem used when sanitization leaves nothing usable.
const FALLBACK_STEM: &str = "untitled";

/// Sanitizes a playlist item title for use as a filename stem.
///
/// Path separators, reserved punctuation, and control characters are replaced
/// with `_`; spaces and other readable characters are kept as-is. An empty or
/// fully-stripped title falls back to `untitled`.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.').trim();
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Derives the output path `<output_dir>/<sanitized title>.mp3` for an item.
#[must_use]
pub fn audio_file_path(output_dir: &Path, title: &str) -> PathBuf {
    output_dir.join(format!("{}.{AUDIO_EXTENSION}", sanitize_title(title)))
}

// SPDX-License-Identifier: MPL-2.0
//! Text shown on the overlay.

use std::path::Path;
use std::time::Duration;

/// Formats a duration as `H:MM:SS`.
#[must_use]
pub fn format_clock(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// Formats the position label, `H:MM:SS/H:MM:SS`.
#[must_use]
pub fn format_position(position: Duration, duration: Duration) -> String {
    format!("{}/{}", format_clock(position), format_clock(duration))
}

/// Keeps at most `max_chars` characters of `label`.
#[must_use]
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    label.chars().take(max_chars).collect()
}

/// File name of the media path, falling back to the full path when it has none.
#[must_use]
pub fn media_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

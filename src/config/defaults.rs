// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! This module serves as the single source of truth for default values
//! used across the player. Constants are organized by category.
//!
//! # Categories
//!
//! - **Volume**: Audio playback volume settings
//! - **Seeking**: Keyboard seek steps
//! - **Overlay**: Control overlay auto-hide and fade timings
//! - **Playback**: Position polling

// ==========================================================================
// Volume Defaults
// ==========================================================================

/// Default playback volume (0.0 to 1.0).
pub const DEFAULT_VOLUME: f64 = 1.0;

/// Minimum volume level.
pub const MIN_VOLUME: f64 = 0.0;

/// Maximum volume level.
pub const MAX_VOLUME: f64 = 1.0;

/// Volume adjustment step per key press (10%).
pub const VOLUME_STEP: f64 = 0.1;

// ==========================================================================
// Seeking Defaults
// ==========================================================================

/// Seek distance for the left/right arrow keys (in seconds).
pub const DEFAULT_SEEK_STEP_SECS: u64 = 10;

/// Seek distance for the up/down arrow keys (in seconds).
pub const DEFAULT_LONG_SEEK_STEP_SECS: u64 = 60;

/// Minimum keyboard seek step (in seconds).
pub const MIN_SEEK_STEP_SECS: u64 = 1;

/// Maximum keyboard seek step (in seconds).
pub const MAX_SEEK_STEP_SECS: u64 = 600;

// ==========================================================================
// Overlay Defaults
// ==========================================================================

/// Default auto-hide timeout for the overlay controls (in seconds).
pub const DEFAULT_OVERLAY_TIMEOUT_SECS: u32 = 3;

/// Minimum overlay timeout (in seconds).
pub const MIN_OVERLAY_TIMEOUT_SECS: u32 = 1;

/// Maximum overlay timeout (in seconds).
pub const MAX_OVERLAY_TIMEOUT_SECS: u32 = 30;

/// Duration of the show/hide fade (in milliseconds).
pub const DEFAULT_OVERLAY_FADE_MS: u64 = 250;

/// Maximum show/hide fade duration (in milliseconds).
pub const MAX_OVERLAY_FADE_MS: u64 = 2_000;

/// Duration of the fade-out that runs when the controls first appear (in milliseconds).
pub const INTRO_FADE_MS: u64 = 1_000;

/// Opacity of the overlay while it is showing (0-255).
pub const SHOWN_OPACITY: u8 = 224;

/// Opacity the overlay starts its intro fade from (0-255).
pub const INTRO_OPACITY: u8 = 0xee;

/// Maximum number of characters of the file name shown on the overlay.
pub const LABEL_MAX_CHARS: usize = 30;

// ==========================================================================
// Playback Defaults
// ==========================================================================

/// Interval between seek-bar progress refreshes (in seconds).
pub const PROGRESS_POLL_SECS: u64 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_defaults_are_valid() {
        assert!(MIN_VOLUME < MAX_VOLUME);
        assert!(DEFAULT_VOLUME >= MIN_VOLUME && DEFAULT_VOLUME <= MAX_VOLUME);
        assert!(VOLUME_STEP > 0.0 && VOLUME_STEP < MAX_VOLUME);
    }

    #[test]
    fn seek_defaults_are_within_bounds() {
        assert!(DEFAULT_SEEK_STEP_SECS >= MIN_SEEK_STEP_SECS);
        assert!(DEFAULT_LONG_SEEK_STEP_SECS <= MAX_SEEK_STEP_SECS);
        assert!(DEFAULT_SEEK_STEP_SECS < DEFAULT_LONG_SEEK_STEP_SECS);
    }

    #[test]
    fn overlay_defaults_are_valid() {
        assert!(MIN_OVERLAY_TIMEOUT_SECS <= DEFAULT_OVERLAY_TIMEOUT_SECS);
        assert!(DEFAULT_OVERLAY_TIMEOUT_SECS <= MAX_OVERLAY_TIMEOUT_SECS);
        assert!(DEFAULT_OVERLAY_FADE_MS <= MAX_OVERLAY_FADE_MS);
        assert!(SHOWN_OPACITY > 0);
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Persistent player settings stored in `settings.toml`.
//!
//! The file has three tables: `[video]` for volume, mute and keyboard seek
//! steps, `[overlay]` for the auto-hide delay and fade length, and
//! `[window]` for the startup mode. Every field is optional and out of
//! range values are clamped by the accessors on [`Config`].
//!
//! The directory is taken from `--config-dir`, then `DOGME_CONFIG_DIR`,
//! then the platform config directory.
//!
//! ```no_run
//! use dogme::config;
//!
//! let (mut config, _warning) = config::load_with_override(None);
//! config.video.muted = Some(true);
//! config::save_with_override(&config, None).expect("settings should be writable");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";

const APP_NAME: &str = "Dogme";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "DOGME_CONFIG_DIR";

/// `[video]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoConfig {
    /// Playback volume (0.0 to 1.0).
    #[serde(default = "default_volume", skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    /// Whether audio is muted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,

    /// Seek step in seconds for the left/right arrow keys.
    #[serde(
        default = "default_seek_step_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub seek_step_secs: Option<u64>,

    /// Seek step in seconds for the up/down arrow keys.
    #[serde(
        default = "default_long_seek_step_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub long_seek_step_secs: Option<u64>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            muted: Some(false),
            seek_step_secs: default_seek_step_secs(),
            long_seek_step_secs: default_long_seek_step_secs(),
        }
    }
}

/// `[overlay]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayConfig {
    /// Auto-hide timeout for the controls (seconds).
    #[serde(
        default = "default_overlay_timeout_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout_secs: Option<u32>,

    /// Fade in/out duration (milliseconds).
    #[serde(
        default = "default_overlay_fade_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub fade_ms: Option<u64>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_overlay_timeout_secs(),
            fade_ms: default_overlay_fade_ms(),
        }
    }
}

/// `[window]` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WindowConfig {
    /// Whether to enter fullscreen as soon as the video is ready.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_fullscreen: Option<bool>,
}

/// Everything read from `settings.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub video: VideoConfig,

    #[serde(default)]
    pub overlay: OverlayConfig,

    #[serde(default)]
    pub window: WindowConfig,
}

impl Config {
    /// Configured volume, clamped to the valid range.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.video
            .volume
            .unwrap_or(DEFAULT_VOLUME)
            .clamp(MIN_VOLUME, MAX_VOLUME)
    }

    #[must_use]
    pub fn muted(&self) -> bool {
        self.video.muted.unwrap_or(false)
    }

    /// Short keyboard seek step.
    #[must_use]
    pub fn seek_step(&self) -> Duration {
        Duration::from_secs(clamp_seek_step(
            self.video.seek_step_secs.unwrap_or(DEFAULT_SEEK_STEP_SECS),
        ))
    }

    /// Long keyboard seek step.
    #[must_use]
    pub fn long_seek_step(&self) -> Duration {
        Duration::from_secs(clamp_seek_step(
            self.video
                .long_seek_step_secs
                .unwrap_or(DEFAULT_LONG_SEEK_STEP_SECS),
        ))
    }

    /// Overlay auto-hide delay.
    #[must_use]
    pub fn overlay_timeout(&self) -> Duration {
        let secs = self
            .overlay
            .timeout_secs
            .unwrap_or(DEFAULT_OVERLAY_TIMEOUT_SECS)
            .clamp(MIN_OVERLAY_TIMEOUT_SECS, MAX_OVERLAY_TIMEOUT_SECS);
        Duration::from_secs(u64::from(secs))
    }

    /// Overlay show/hide fade duration.
    #[must_use]
    pub fn overlay_fade(&self) -> Duration {
        Duration::from_millis(
            self.overlay
                .fade_ms
                .unwrap_or(DEFAULT_OVERLAY_FADE_MS)
                .min(MAX_OVERLAY_FADE_MS),
        )
    }

    #[must_use]
    pub fn start_fullscreen(&self) -> bool {
        self.window.start_fullscreen.unwrap_or(false)
    }
}

fn clamp_seek_step(secs: u64) -> u64 {
    secs.clamp(MIN_SEEK_STEP_SECS, MAX_SEEK_STEP_SECS)
}

fn default_volume() -> Option<f64> {
    Some(DEFAULT_VOLUME)
}

fn default_seek_step_secs() -> Option<u64> {
    Some(DEFAULT_SEEK_STEP_SECS)
}

fn default_long_seek_step_secs() -> Option<u64> {
    Some(DEFAULT_LONG_SEEK_STEP_SECS)
}

fn default_overlay_timeout_secs() -> Option<u32> {
    Some(DEFAULT_OVERLAY_TIMEOUT_SECS)
}

fn default_overlay_fade_ms() -> Option<u64> {
    Some(DEFAULT_OVERLAY_FADE_MS)
}

/// Resolves the settings directory: the explicit override first, then a
/// non-empty `DOGME_CONFIG_DIR`, then `<platform config dir>/Dogme`.
pub fn config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_DIR) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

fn config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads settings from `base_dir` or the resolved default directory.
///
/// A missing file yields the defaults silently. An unreadable one yields the
/// defaults plus a warning describing the problem.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    return (
                        Config::default(),
                        Some(format!(
                            "ignoring unreadable settings file {}: {err}",
                            path.display()
                        )),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Writes settings into `base_dir` or the resolved default directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Creates parent directories as needed.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_utils::assert_abs_diff_eq;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_settings() {
        let config = Config {
            video: VideoConfig {
                volume: Some(0.4),
                muted: Some(true),
                seek_step_secs: Some(5),
                long_seek_step_secs: Some(120),
            },
            overlay: OverlayConfig {
                timeout_secs: Some(7),
                fade_ms: Some(400),
            },
            window: WindowConfig {
                start_fullscreen: Some(true),
            },
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn load_from_path_invalid_toml_errors() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        match load_from_path(&config_path) {
            Err(Error::Config(message)) => assert!(!message.is_empty()),
            other => panic!("expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn load_with_override_falls_back_to_defaults_with_warning() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        fs::write(temp_dir.path().join(CONFIG_FILE), "[video\nvolume = ")
            .expect("failed to write invalid toml");

        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));

        assert_eq!(config, Config::default());
        assert!(warning.is_some());
    }

    #[test]
    fn load_with_override_missing_file_is_silent() {
        let temp_dir = tempdir().expect("failed to create temp dir");

        let (config, warning) = load_with_override(Some(temp_dir.path().join("absent")));

        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }

    #[test]
    fn partial_file_fills_missing_sections_with_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[overlay]\ntimeout_secs = 5\n").expect("failed to write");

        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded.overlay.timeout_secs, Some(5));
        assert_eq!(loaded.overlay.fade_ms, Some(DEFAULT_OVERLAY_FADE_MS));
        assert_eq!(loaded.video, VideoConfig::default());
        assert!(!loaded.start_fullscreen());
    }

    #[test]
    fn save_with_override_writes_settings_file() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config = Config::default();

        save_with_override(&config, Some(temp_dir.path().to_path_buf()))
            .expect("save should succeed");

        assert!(temp_dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn accessors_clamp_out_of_range_values() {
        let config = Config {
            video: VideoConfig {
                volume: Some(3.0),
                muted: None,
                seek_step_secs: Some(0),
                long_seek_step_secs: Some(100_000),
            },
            overlay: OverlayConfig {
                timeout_secs: Some(0),
                fade_ms: Some(60_000),
            },
            window: WindowConfig::default(),
        };

        assert_abs_diff_eq!(config.volume(), MAX_VOLUME);
        assert!(!config.muted());
        assert_eq!(config.seek_step(), Duration::from_secs(MIN_SEEK_STEP_SECS));
        assert_eq!(
            config.long_seek_step(),
            Duration::from_secs(MAX_SEEK_STEP_SECS)
        );
        assert_eq!(
            config.overlay_timeout(),
            Duration::from_secs(u64::from(MIN_OVERLAY_TIMEOUT_SECS))
        );
        assert_eq!(
            config.overlay_fade(),
            Duration::from_millis(MAX_OVERLAY_FADE_MS)
        );
    }

    #[test]
    fn default_accessors_match_defaults() {
        let config = Config::default();
        assert_eq!(config.seek_step(), Duration::from_secs(10));
        assert_eq!(config.long_seek_step(), Duration::from_secs(60));
        assert_eq!(config.overlay_timeout(), Duration::from_secs(3));
        assert_eq!(config.overlay_fade(), Duration::from_millis(250));
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Messages routed through `App::update` and the flags the player starts with.

use std::path::PathBuf;
use std::time::Instant;

/// Messages consumed by `App::update`.
#[derive(Debug, Clone)]
pub enum Message {
    /// Periodic tick driving timers, the bus and frame pickup.
    Tick(Instant),
    /// Keyboard, pointer or window event for the player.
    RawEvent {
        window: iced::window::Id,
        event: iced::Event,
    },
    /// The window manager asked to close the window.
    WindowCloseRequested(iced::window::Id),
}

/// Runtime flags parsed from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// Media file to play.
    pub media_path: PathBuf,
    /// Enter fullscreen as soon as the video is ready.
    pub fullscreen: bool,
    /// Where `settings.toml` lives, overriding `DOGME_CONFIG_DIR`.
    pub config_dir: Option<PathBuf>,
}

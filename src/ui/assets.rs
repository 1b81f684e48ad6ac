// SPDX-License-Identifier: MPL-2.0
//! Embedded SVG artwork for the overlay.
//!
//! Files are embedded at compile time via `include_bytes!` and handles are
//! cached with `OnceLock`, so each asset is parsed once per process.

use iced::widget::svg::Handle;
use std::sync::OnceLock;

use super::scene::Asset;

macro_rules! define_asset {
    ($name:ident, $filename:literal) => {
        fn $name() -> Handle {
            static HANDLE: OnceLock<Handle> = OnceLock::new();
            static DATA: &[u8] = include_bytes!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/assets/icons/",
                $filename
            ));
            HANDLE.get_or_init(|| Handle::from_memory(DATA)).clone()
        }
    };
}

define_asset!(panel, "panel.svg");
define_asset!(play, "play.svg");
define_asset!(pause, "pause.svg");

/// SVG handle for a scene asset.
#[must_use]
pub fn handle(asset: Asset) -> Handle {
    match asset {
        Asset::Panel => panel(),
        Asset::Play => play(),
        Asset::Pause => pause(),
    }
}

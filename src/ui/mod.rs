// SPDX-License-Identifier: MPL-2.0
//! User interface: the retained scene, the overlay controls built on it, and
//! the iced rendering of both.
//!
//! # Modules
//!
//! - [`scene`] - Toolkit-neutral node tree with animated opacity
//! - [`overlay`] - Playback controls and their visibility state machine
//! - [`layout`] - Letterboxing and control placement math
//! - [`format`] - Clock and label formatting
//! - [`assets`] - Embedded SVG artwork
//! - [`view`] - Scene to iced widget rendering

pub mod assets;
pub mod format;
pub mod layout;
pub mod overlay;
pub mod scene;
pub mod view;

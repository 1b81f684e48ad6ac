// SPDX-License-Identifier: MPL-2.0
//! `dogme` is a minimal video player built with the Iced GUI framework.
//!
//! It decodes with FFmpeg, plays sound through cpal, and shows a fading
//! overlay with play/pause, a seek bar and the file name over the video.

#![doc(html_root_url = "https://docs.rs/dogme/0.3.0")]

pub mod app;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod inhibit;
pub mod input;
pub mod pipeline;
pub mod scheduler;
pub mod stage;
pub mod ui;

#[cfg(test)]
mod test_utils;

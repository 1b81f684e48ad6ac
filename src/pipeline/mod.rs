// SPDX-License-Identifier: MPL-2.0
//! Media pipeline seam and its FFmpeg implementation.
//!
//! The coordinator drives playback only through [`MediaPipeline`] and learns
//! about asynchronous changes through [`BusMessage`]s. [`FfmpegPipeline`]
//! decodes on a dedicated thread, renders frames into a [`FrameSink`] and
//! plays audio through cpal.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ commands ┌──────────────┐ frames ┌───────────┐
//! │ Coordinator  │─────────▶│ decode thread│───────▶│ FrameSink │
//! │ (UI thread)  │◀─────────│  (ffmpeg)    │        └───────────┘
//! └──────────────┘   bus    └──────┬───────┘
//!                                  │ samples
//!                                  ▼
//!                           ┌──────────────┐
//!                           │ AudioOutput  │ (cpal callback)
//!                           └──────────────┘
//! ```

mod audio_output;
mod clock;
mod decoder;
mod ffmpeg;
mod frame;
mod volume;

pub use clock::PlaybackClock;
pub use ffmpeg::{init_ffmpeg, FfmpegPipeline};
pub use frame::{FrameSink, VideoFrame};
pub use volume::Volume;

use crate::error::Result;
use std::fmt;
use std::time::Duration;

/// Pipeline state, ordered from stopped to running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Null,
    Ready,
    Paused,
    Playing,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Null => "null",
            PipelineState::Ready => "ready",
            PipelineState::Paused => "paused",
            PipelineState::Playing => "playing",
        };
        f.write_str(name)
    }
}

/// Asynchronous notification from the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum BusMessage {
    StateChanged {
        old: PipelineState,
        new: PipelineState,
    },
    EndOfStream,
    Error {
        message: String,
    },
}

/// Playback engine the coordinator drives.
pub trait MediaPipeline {
    /// Requests a state change. Completion is reported on the bus.
    fn set_state(&mut self, state: PipelineState) -> Result<()>;

    /// Last requested state.
    fn state(&self) -> PipelineState;

    /// Seeks to `position`, discarding buffered data.
    fn seek_flush(&mut self, position: Duration) -> Result<()>;

    fn query_position(&self) -> Option<Duration>;

    fn query_duration(&self) -> Option<Duration>;

    fn volume(&self) -> Volume;

    fn set_volume(&mut self, volume: Volume);

    fn is_muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    /// Video dimensions once the first frame has been prerolled.
    fn negotiated_size(&self) -> Option<(u32, u32)>;
}

// SPDX-License-Identifier: MPL-2.0
//! FFmpeg-backed [`MediaPipeline`].
//!
//! Opening probes the file on the calling thread so unplayable media fails
//! before any window appears; decoding then runs on its own thread.

use log::{debug, info};
use std::path::Path;
use std::sync::{Arc, Once, OnceLock};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;

use super::audio_output::AudioLevels;
use super::clock::PlaybackClock;
use super::decoder::{self, DecoderCommand, DecoderLink};
use super::frame::FrameSink;
use super::{BusMessage, MediaPipeline, PipelineState, Volume};
use crate::error::{Error, Result, MediaError};

static FFMPEG_INIT: Once = Once::new();

/// Initializes FFmpeg once per process and silences its console logging
/// below errors.
///
/// # Errors
///
/// Returns an error if the FFmpeg libraries fail to initialize.
pub fn init_ffmpeg() -> Result<()> {
    let mut init_result: Result<()> = Ok(());

    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg_next::init() {
            init_result = Err(Error::Io(format!("FFmpeg initialization failed: {e}")));
            return;
        }

        // SAFETY: av_log_set_level is thread-safe and only affects logging
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
    });

    init_result
}

/// Handle to a decode thread playing one media file.
pub struct FfmpegPipeline {
    commands: mpsc::UnboundedSender<DecoderCommand>,
    bus: mpsc::UnboundedReceiver<BusMessage>,
    clock: Arc<PlaybackClock>,
    negotiated: Arc<OnceLock<(u32, u32)>>,
    levels: Arc<AudioLevels>,
    duration: Option<Duration>,
    state: PipelineState,
    worker: Option<JoinHandle<()>>,
}

impl FfmpegPipeline {
    /// Probes `path` and starts a decode thread for it in the `Ready` state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, has no video stream,
    /// or the decode thread cannot be spawned.
    pub fn open(path: &Path, sink: FrameSink, volume: Volume, muted: bool) -> Result<Self> {
        init_ffmpeg()?;

        let duration = {
            let ictx = ffmpeg_next::format::input(&path)?;
            if ictx.streams().best(ffmpeg_next::media::Type::Video).is_none() {
                return Err(Error::Media(MediaError::NoVideoStream));
            }
            // Container duration is in AV_TIME_BASE units (microseconds)
            u64::try_from(ictx.duration())
                .ok()
                .filter(|&us| us > 0)
                .map(Duration::from_micros)
        };

        let (command_tx, commands) = mpsc::unbounded_channel();
        let (bus_tx, bus) = mpsc::unbounded_channel();
        let clock = Arc::new(PlaybackClock::new());
        let negotiated = Arc::new(OnceLock::new());
        let levels = Arc::new(AudioLevels::new(volume, muted));

        let link = DecoderLink {
            path: path.to_path_buf(),
            commands,
            bus: bus_tx,
            sink,
            clock: Arc::clone(&clock),
            negotiated: Arc::clone(&negotiated),
            levels: Arc::clone(&levels),
        };

        let worker = std::thread::Builder::new()
            .name("dogme-decoder".to_string())
            .spawn(move || decoder::run(link))?;

        info!(
            "opened {} (duration: {})",
            path.display(),
            duration.map_or_else(|| "unknown".to_string(), |d| format!("{:.1}s", d.as_secs_f64()))
        );

        Ok(Self {
            commands: command_tx,
            bus,
            clock,
            negotiated,
            levels,
            duration,
            state: PipelineState::Ready,
            worker: Some(worker),
        })
    }

    /// Next pending bus message, if any.
    pub fn try_recv_bus(&mut self) -> Option<BusMessage> {
        self.bus.try_recv().ok()
    }

    fn send(&self, command: DecoderCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::Io("decode thread has stopped".to_string()))
    }
}

impl MediaPipeline for FfmpegPipeline {
    fn set_state(&mut self, state: PipelineState) -> Result<()> {
        debug!("pipeline {} -> {}", self.state, state);
        self.send(DecoderCommand::SetState(state))?;
        self.state = state;
        Ok(())
    }

    fn state(&self) -> PipelineState {
        self.state
    }

    fn seek_flush(&mut self, position: Duration) -> Result<()> {
        self.send(DecoderCommand::Seek(position))?;
        // Report the target right away; the decode thread re-anchors on the next frame
        self.clock.set_position(position);
        Ok(())
    }

    fn query_position(&self) -> Option<Duration> {
        if self.state < PipelineState::Paused {
            return None;
        }
        Some(self.clock.position())
    }

    fn query_duration(&self) -> Option<Duration> {
        self.duration
    }

    fn volume(&self) -> Volume {
        self.levels.volume()
    }

    fn set_volume(&mut self, volume: Volume) {
        self.levels.set_volume(volume);
    }

    fn is_muted(&self) -> bool {
        self.levels.is_muted()
    }

    fn set_muted(&mut self, muted: bool) {
        self.levels.set_muted(muted);
    }

    fn negotiated_size(&self) -> Option<(u32, u32)> {
        self.negotiated.get().copied()
    }
}

impl Drop for FfmpegPipeline {
    fn drop(&mut self) {
        let _ = self.commands.send(DecoderCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

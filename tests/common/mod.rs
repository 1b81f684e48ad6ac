// SPDX-License-Identifier: MPL-2.0
//! Shared helpers for the coordinator integration tests.
#![allow(dead_code)]

use dogme::coordinator::{Coordinator, CoordinatorSettings};
use dogme::error::{Error, Result, MediaError};
use dogme::pipeline::{BusMessage, MediaPipeline, PipelineState, Volume};
use dogme::stage::Stage;
use std::path::Path;
use std::time::{Duration, Instant};

pub const STAGE_WIDTH: f32 = 1280.0;
pub const STAGE_HEIGHT: f32 = 720.0;
pub const MEDIA_PATH: &str = "/videos/holiday.mkv";

/// In-memory pipeline that records every command it receives.
#[derive(Debug)]
pub struct FakePipeline {
    pub state: PipelineState,
    pub position: Option<Duration>,
    pub duration: Option<Duration>,
    pub volume: Volume,
    pub muted: bool,
    pub negotiated: Option<(u32, u32)>,
    /// Every state requested, in order.
    pub states: Vec<PipelineState>,
    /// Every seek target, in order.
    pub seeks: Vec<Duration>,
    pub refuse_state_changes: bool,
}

impl FakePipeline {
    pub fn new(duration_secs: u64, size: (u32, u32)) -> Self {
        Self {
            state: PipelineState::Ready,
            position: Some(Duration::ZERO),
            duration: Some(Duration::from_secs(duration_secs)),
            volume: Volume::default(),
            muted: false,
            negotiated: Some(size),
            states: Vec::new(),
            seeks: Vec::new(),
            refuse_state_changes: false,
        }
    }
}

impl MediaPipeline for FakePipeline {
    fn set_state(&mut self, state: PipelineState) -> Result<()> {
        if self.refuse_state_changes {
            return Err(Error::Media(MediaError::Other("state change refused".into())));
        }
        self.states.push(state);
        self.state = state;
        Ok(())
    }

    fn state(&self) -> PipelineState {
        self.state
    }

    fn seek_flush(&mut self, position: Duration) -> Result<()> {
        self.seeks.push(position);
        self.position = Some(position);
        Ok(())
    }

    fn query_position(&self) -> Option<Duration> {
        self.position
    }

    fn query_duration(&self) -> Option<Duration> {
        self.duration
    }

    fn volume(&self) -> Volume {
        self.volume
    }

    fn set_volume(&mut self, volume: Volume) {
        self.volume = volume;
    }

    fn is_muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn negotiated_size(&self) -> Option<(u32, u32)> {
        self.negotiated
    }
}

pub fn after_ms(base: Instant, millis: u64) -> Instant {
    base + Duration::from_millis(millis)
}

/// A coordinator driving a [`FakePipeline`], with the instant it started at.
pub struct Harness {
    pub coordinator: Coordinator<FakePipeline>,
    pub start: Instant,
}

impl Harness {
    pub fn with_settings(pipeline: FakePipeline, settings: CoordinatorSettings) -> Self {
        let start = Instant::now();
        let coordinator = Coordinator::initialize(
            pipeline,
            Stage::new(STAGE_WIDTH, STAGE_HEIGHT),
            Path::new(MEDIA_PATH),
            settings,
            start,
        )
        .expect("initialize should succeed");
        Self { coordinator, start }
    }

    /// A 100-second 1280x720 file, still loading.
    pub fn loading() -> Self {
        Self::with_settings(FakePipeline::new(100, (1280, 720)), CoordinatorSettings::default())
    }

    /// A 100-second 1280x720 file with the controls built and playback running.
    pub fn playing() -> Self {
        let mut harness = Self::loading();
        harness.preroll();
        harness
    }

    /// Delivers the first Paused state change.
    pub fn preroll(&mut self) {
        self.coordinator.on_bus_message(BusMessage::StateChanged {
            old: PipelineState::Ready,
            new: PipelineState::Paused,
        });
    }

    pub fn pipeline(&self) -> &FakePipeline {
        self.coordinator.pipeline()
    }

    pub fn pipeline_mut(&mut self) -> &mut FakePipeline {
        self.coordinator.pipeline_mut()
    }

    pub fn set_position_secs(&mut self, secs: u64) {
        self.pipeline_mut().position = Some(Duration::from_secs(secs));
    }

    pub fn advance(&mut self, millis: u64) {
        let now = after_ms(self.start, millis);
        self.coordinator.on_tick(now);
    }

    pub fn last_seek(&self) -> Option<Duration> {
        self.pipeline().seeks.last().copied()
    }

    /// Stage point inside the seek-bar track at `fraction` of its width.
    pub fn seekbar_point(&self, fraction: f32) -> (f32, f32) {
        let overlay = self.coordinator.overlay().expect("controls should exist");
        let track = self.coordinator.scene().bounds(overlay.nodes().seek_track);
        (track.x + track.width * fraction, track.y + track.height / 2.0)
    }

    pub fn progress_width(&self) -> f32 {
        let overlay = self.coordinator.overlay().expect("controls should exist");
        overlay.progress_width(self.coordinator.scene())
    }
}

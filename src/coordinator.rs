// SPDX-License-Identifier: MPL-2.0
//! Playback coordinator.
//!
//! Maps keyboard and pointer input, timer firings and pipeline bus messages
//! onto pipeline commands and overlay transitions. All state lives on the UI
//! thread; the pipeline only reaches it through [`BusMessage`]s the shell
//! forwards to [`Coordinator::on_bus_message`].
//!
//! ```text
//!  initialize ─▶ Loading ──StateChanged(Paused)──▶ build_ui ─▶ Ready
//!                   │                                           │
//!                   └──────────── Error ──▶ Failed ◀── Error ───┘
//!                              (q / Esc) ──▶ Quit
//! ```

use log::{debug, error, info, warn};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::{Config, DEFAULT_LONG_SEEK_STEP_SECS, DEFAULT_SEEK_STEP_SECS, PROGRESS_POLL_SECS};
use crate::error::Result;
use crate::inhibit::{RecordingInhibitor, SleepInhibitor};
use crate::input::{InputEvent, Key};
use crate::pipeline::{BusMessage, MediaPipeline, PipelineState};
use crate::scheduler::{Scheduler, TaskToken, TimerKind};
use crate::stage::{Stage, StageRequest};
use crate::ui::format::media_label;
use crate::ui::overlay::{OverlaySettings, OverlayUi, UiContext};
use crate::ui::scene::{NodeId, NodeKind, Scene};

/// Whether media is advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Paused,
    Playing,
}

/// Lifecycle of the player as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Waiting for the first frame to learn the video size.
    Loading,
    Ready,
    /// The pipeline reported an error; playback is frozen.
    Failed(String),
    Quit,
}

/// Knobs the coordinator reads at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Left/right arrow seek distance.
    pub seek_step: Duration,
    /// Up/down arrow seek distance.
    pub long_seek_step: Duration,
    pub start_fullscreen: bool,
    pub overlay: OverlaySettings,
    /// Seek-bar refresh period.
    pub poll_interval: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            seek_step: Duration::from_secs(DEFAULT_SEEK_STEP_SECS),
            long_seek_step: Duration::from_secs(DEFAULT_LONG_SEEK_STEP_SECS),
            start_fullscreen: false,
            overlay: OverlaySettings::default(),
            poll_interval: Duration::from_secs(PROGRESS_POLL_SECS),
        }
    }
}

impl CoordinatorSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            seek_step: config.seek_step(),
            long_seek_step: config.long_seek_step(),
            start_fullscreen: config.start_fullscreen(),
            overlay: OverlaySettings::from_config(config),
            ..Self::default()
        }
    }
}

pub struct Coordinator<P: MediaPipeline> {
    pipeline: P,
    scene: Scene,
    stage: Stage,
    scheduler: Scheduler,
    video: NodeId,
    overlay: Option<OverlayUi>,
    playback: PlaybackState,
    fullscreen: bool,
    geometry: Option<(u32, u32)>,
    duration: Option<Duration>,
    status: PlayerStatus,
    settings: CoordinatorSettings,
    media_label: String,
    /// Set at end of stream: the next play starts over from zero.
    restart_on_play: bool,
    poll_token: TaskToken,
    /// Held while playing so the screen does not blank.
    inhibitor: Box<dyn SleepInhibitor>,
}

impl<P: MediaPipeline> Coordinator<P> {
    /// Takes ownership of an opened pipeline, prerolls it and starts the
    /// position poll.
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline refuses the transition to Paused.
    pub fn initialize(
        mut pipeline: P,
        stage: Stage,
        media_path: &Path,
        settings: CoordinatorSettings,
        now: Instant,
    ) -> Result<Self> {
        let mut scene = Scene::new();
        let video = scene.add(scene.root(), NodeKind::VideoSurface);

        let mut scheduler = Scheduler::new(now);
        let poll_token = scheduler.schedule_repeating(TimerKind::ProgressPoll, settings.poll_interval);

        pipeline.set_state(PipelineState::Paused)?;
        info!("loading {}", media_path.display());

        Ok(Self {
            pipeline,
            scene,
            stage,
            scheduler,
            video,
            overlay: None,
            playback: PlaybackState::Paused,
            fullscreen: false,
            geometry: None,
            duration: None,
            status: PlayerStatus::Loading,
            settings,
            media_label: media_label(media_path),
            restart_on_play: false,
            poll_token,
            inhibitor: Box::new(RecordingInhibitor::default()),
        })
    }

    /// Replaces the screensaver inhibitor, which only records requests by
    /// default.
    #[must_use]
    pub fn with_inhibitor(mut self, inhibitor: Box<dyn SleepInhibitor>) -> Self {
        self.inhibitor = inhibitor;
        self.sync_inhibitor();
        self
    }

    /// Splits out the overlay and the collaborators it works on.
    fn split(&mut self) -> (Option<&mut OverlayUi>, UiContext<'_>) {
        (
            self.overlay.as_mut(),
            UiContext {
                scene: &mut self.scene,
                stage: &mut self.stage,
                scheduler: &mut self.scheduler,
            },
        )
    }

    pub fn on_bus_message(&mut self, message: BusMessage) {
        match message {
            BusMessage::StateChanged { old, new } => {
                debug!("pipeline state {old} -> {new}");
                if new == PipelineState::Paused && self.geometry.is_none() {
                    if let Some(size) = self.pipeline.negotiated_size() {
                        info!("video size {}x{}", size.0, size.1);
                        self.geometry = Some(size);
                        self.build_ui();
                    }
                }
            }
            BusMessage::EndOfStream => self.on_end_of_stream(),
            BusMessage::Error { message } => self.fail(message),
        }
    }

    /// Constructs the overlay once the video size is known and starts
    /// playback. Later calls do nothing.
    pub fn build_ui(&mut self) {
        if self.overlay.is_some() || self.status != PlayerStatus::Loading {
            return;
        }
        let Some((width, height)) = self.geometry else {
            return;
        };

        if !self.settings.start_fullscreen {
            #[allow(clippy::cast_precision_loss)]
            self.stage.request_size(width as f32, height as f32);
        }

        let overlay = OverlayUi::construct(
            &mut UiContext {
                scene: &mut self.scene,
                stage: &mut self.stage,
                scheduler: &mut self.scheduler,
            },
            self.video,
            &self.media_label,
            width,
            height,
            self.settings.overlay,
        );
        self.overlay = Some(overlay);
        self.status = PlayerStatus::Ready;

        if let Err(err) = self.pipeline.set_state(PipelineState::Playing) {
            self.fail(err.to_string());
            return;
        }
        self.set_playback(PlaybackState::Playing);

        if self.settings.start_fullscreen {
            self.set_fullscreen(true);
        }
        self.on_progress_tick();
    }

    /// Brings the clock up to `now`, then dispatches `event`, so fades and
    /// timers armed by the event start from the moment it happened.
    pub fn on_input_event_at(&mut self, event: InputEvent, now: Instant) -> bool {
        self.on_tick(now);
        self.on_input_event(event)
    }

    /// Dispatches one input event. Returns whether it was consumed.
    pub fn on_input_event(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::KeyPress(key) => self.on_key(key),
            InputEvent::ButtonPress { x, y } => self.on_click(x, y),
            InputEvent::PointerDrag { x, y } => {
                self.reveal_controls();
                self.on_drag(x, y)
            }
            InputEvent::Motion { .. } => self.reveal_controls(),
        }
    }

    fn on_key(&mut self, key: Key) -> bool {
        if matches!(key, Key::Escape | Key::Character('q')) {
            self.quit();
            return true;
        }
        if self.overlay.is_none() {
            return false;
        }

        match key {
            Key::Right => self.seek_relative(self.settings.seek_step, true),
            Key::Left => self.seek_relative(self.settings.seek_step, false),
            Key::Up => self.seek_relative(self.settings.long_seek_step, true),
            Key::Down => self.seek_relative(self.settings.long_seek_step, false),
            Key::Space => self.toggle_playback(),
            Key::Character('f') => self.toggle_fullscreen(),
            Key::Character('9') => {
                let volume = self.pipeline.volume().increase();
                self.pipeline.set_volume(volume);
                info!("volume {:.1}", volume.value());
            }
            Key::Character('0') => {
                let volume = self.pipeline.volume().decrease();
                self.pipeline.set_volume(volume);
                info!("volume {:.1}", volume.value());
            }
            Key::Character('8') => {
                let muted = !self.pipeline.is_muted();
                self.pipeline.set_muted(muted);
                info!("muted: {muted}");
            }
            Key::Character('c') => {
                let (overlay, mut ctx) = self.split();
                if let Some(overlay) = overlay {
                    overlay.toggle_pinned(&mut ctx);
                }
            }
            _ => return false,
        }
        true
    }

    fn on_click(&mut self, x: f32, y: f32) -> bool {
        let Some(overlay) = self.overlay.as_ref() else {
            return false;
        };
        if overlay.play_toggle_hit(&self.scene, x, y) {
            self.toggle_playback();
            return true;
        }
        if self.on_drag(x, y) {
            return true;
        }

        let (overlay, mut ctx) = self.split();
        let Some(overlay) = overlay else {
            return false;
        };
        if !overlay.is_showing() {
            return false;
        }
        if overlay.panel_hit(ctx.scene, x, y) {
            overlay.toggle_pinned_by_click(&mut ctx);
        } else {
            overlay.dismiss(&mut ctx);
        }
        true
    }

    fn on_drag(&mut self, x: f32, y: f32) -> bool {
        let Some(overlay) = self.overlay.as_ref() else {
            return false;
        };
        match overlay.seekbar_hit(&self.scene, x, y) {
            Some(fraction) => {
                self.seek_to_fraction(fraction);
                true
            }
            None => false,
        }
    }

    fn reveal_controls(&mut self) -> bool {
        let (overlay, mut ctx) = self.split();
        match overlay {
            Some(overlay) => {
                overlay.on_motion(&mut ctx);
                true
            }
            None => false,
        }
    }

    /// Flips between playing and paused and swaps the play/pause icon.
    pub fn toggle_playback(&mut self) {
        if self.overlay.is_none() || self.status != PlayerStatus::Ready {
            return;
        }

        let target = match self.playback {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => {
                if self.restart_on_play {
                    self.seek_to(Duration::ZERO);
                }
                PlaybackState::Playing
            }
        };
        let state = match target {
            PlaybackState::Playing => PipelineState::Playing,
            PlaybackState::Paused => PipelineState::Paused,
        };

        if let Err(err) = self.pipeline.set_state(state) {
            self.fail(err.to_string());
            return;
        }
        self.set_playback(target);
        debug!("playback {:?}", target);
    }

    fn set_playback(&mut self, playback: PlaybackState) {
        self.playback = playback;
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.set_playing(&mut self.scene, playback == PlaybackState::Playing);
        }
        self.sync_inhibitor();
    }

    /// Inhibits the screensaver exactly while media is playing.
    fn sync_inhibitor(&mut self) {
        let playing =
            self.playback == PlaybackState::Playing && self.status == PlayerStatus::Ready;
        self.inhibitor.set_inhibited(playing);
    }

    pub fn toggle_fullscreen(&mut self) {
        self.set_fullscreen(!self.fullscreen);
    }

    fn set_fullscreen(&mut self, enable: bool) {
        self.fullscreen = enable;
        let (overlay, mut ctx) = self.split();
        match overlay {
            Some(overlay) => overlay.toggle_fullscreen(&mut ctx, enable),
            None => ctx.stage.set_fullscreen(enable),
        }
        debug!("fullscreen: {enable}");
    }

    /// Refreshes the seek-bar fill and position label from the pipeline.
    pub fn on_progress_tick(&mut self) {
        if self.overlay.is_none() {
            return;
        }
        let Some(duration) = self.duration() else {
            return;
        };
        let Some(position) = self.pipeline.query_position() else {
            return;
        };
        self.show_position(position, duration);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn show_position(&mut self, position: Duration, duration: Duration) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };
        let fraction = position.as_secs_f64() / duration.as_secs_f64();
        overlay.set_progress(&mut self.scene, fraction as f32);
        overlay.set_position_text(&mut self.scene, position.min(duration), duration);
    }

    /// Media duration, cached once the pipeline reports a non-zero one.
    fn duration(&mut self) -> Option<Duration> {
        if self.duration.is_none() {
            self.duration = self
                .pipeline
                .query_duration()
                .filter(|duration| !duration.is_zero());
        }
        self.duration
    }

    fn seek_relative(&mut self, step: Duration, forward: bool) {
        let position = self.pipeline.query_position().unwrap_or_default();
        let target = if forward {
            let target = position + step;
            match self.duration() {
                Some(duration) => target.min(duration),
                None => target,
            }
        } else {
            position.saturating_sub(step)
        };
        self.seek_to(target);
    }

    fn seek_to_fraction(&mut self, fraction: f32) {
        let Some(duration) = self.duration() else {
            return;
        };
        self.seek_to(duration.mul_f64(f64::from(fraction)));
    }

    fn seek_to(&mut self, target: Duration) {
        if let Err(err) = self.pipeline.seek_flush(target) {
            warn!("seek to {:.1}s failed: {err}", target.as_secs_f64());
            return;
        }
        debug!("seek to {:.1}s", target.as_secs_f64());
        self.restart_on_play = false;
        if let Some(duration) = self.duration() {
            self.show_position(target, duration);
        }
    }

    fn on_end_of_stream(&mut self) {
        if self.overlay.is_none() || self.status != PlayerStatus::Ready {
            return;
        }
        info!("end of stream");
        if let Err(err) = self.pipeline.set_state(PipelineState::Paused) {
            self.fail(err.to_string());
            return;
        }
        self.set_playback(PlaybackState::Paused);
        self.restart_on_play = true;
        self.reveal_controls();
        self.on_progress_tick();
    }

    /// Stops the pipeline and shows `message`. Quitting keeps working.
    fn fail(&mut self, message: String) {
        if self.status == PlayerStatus::Quit {
            return;
        }
        error!("playback failed: {message}");
        if let Err(err) = self.pipeline.set_state(PipelineState::Null) {
            warn!("failed to stop pipeline: {err}");
        }
        self.playback = PlaybackState::Paused;

        let (overlay, mut ctx) = self.split();
        if let Some(overlay) = overlay {
            overlay.set_playing(ctx.scene, false);
            overlay.show_error(&mut ctx, &message);
        }
        self.status = PlayerStatus::Failed(message);
        self.sync_inhibitor();
    }

    /// Advances timers to `now` and runs whatever fired.
    pub fn on_tick(&mut self, now: Instant) {
        for (token, kind) in self.scheduler.advance(now) {
            match kind {
                TimerKind::ProgressPoll => self.on_progress_tick(),
                TimerKind::AutoHide => {
                    let (overlay, mut ctx) = self.split();
                    if let Some(overlay) = overlay {
                        overlay.on_auto_hide_timeout(&mut ctx, token);
                    }
                }
            }
        }
    }

    /// Records the new window size and re-lays out the video and controls.
    pub fn on_stage_resized(&mut self, width: f32, height: f32) {
        self.stage.set_size(width, height);
        let (overlay, mut ctx) = self.split();
        if let Some(overlay) = overlay {
            overlay.on_resize(&mut ctx, width, height);
        }
    }

    /// Stops the pipeline and asks the window to close.
    pub fn quit(&mut self) {
        if self.status == PlayerStatus::Quit {
            return;
        }
        info!("quit");
        if let Err(err) = self.pipeline.set_state(PipelineState::Null) {
            warn!("failed to stop pipeline: {err}");
        }
        self.scheduler.cancel(self.poll_token);
        self.stage.quit();
        self.status = PlayerStatus::Quit;
        self.sync_inhibitor();
    }

    #[must_use]
    pub fn is_screensaver_inhibited(&self) -> bool {
        self.inhibitor.is_inhibited()
    }

    pub fn take_stage_requests(&mut self) -> Vec<StageRequest> {
        self.stage.take_requests()
    }

    #[must_use]
    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut P {
        &mut self.pipeline
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn overlay(&self) -> Option<&OverlayUi> {
        self.overlay.as_ref()
    }

    #[must_use]
    pub fn video_node(&self) -> NodeId {
        self.video
    }

    #[must_use]
    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[must_use]
    pub fn geometry(&self) -> Option<(u32, u32)> {
        self.geometry
    }

    #[must_use]
    pub fn status(&self) -> &PlayerStatus {
        &self.status
    }

    #[must_use]
    pub fn media_label(&self) -> &str {
        &self.media_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OverlayConfig, VideoConfig};

    #[test]
    fn default_settings_match_documented_steps() {
        let settings = CoordinatorSettings::default();
        assert_eq!(settings.seek_step, Duration::from_secs(10));
        assert_eq!(settings.long_seek_step, Duration::from_secs(60));
        assert_eq!(settings.poll_interval, Duration::from_secs(2));
        assert_eq!(settings.overlay.auto_hide, Duration::from_secs(3));
        assert!(!settings.start_fullscreen);
    }

    #[test]
    fn settings_follow_config() {
        let config = Config {
            video: VideoConfig {
                seek_step_secs: Some(5),
                long_seek_step_secs: Some(30),
                ..VideoConfig::default()
            },
            overlay: OverlayConfig {
                timeout_secs: Some(7),
                ..OverlayConfig::default()
            },
            ..Config::default()
        };

        let settings = CoordinatorSettings::from_config(&config);
        assert_eq!(settings.seek_step, Duration::from_secs(5));
        assert_eq!(settings.long_seek_step, Duration::from_secs(30));
        assert_eq!(settings.overlay.auto_hide, Duration::from_secs(7));
    }
}

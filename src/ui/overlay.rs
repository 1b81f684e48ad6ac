// SPDX-License-Identifier: MPL-2.0
//! Overlay playback controls.
//!
//! The overlay owns a group of scene nodes (background panel, play/pause
//! icons, seek bar, file name and position labels) laid over the video, and
//! the visibility state machine that fades the group in on pointer motion and
//! out again once the auto-hide timer fires.
//!
//! ```text
//!            show_controls(true)
//!   Hidden ───────────────────────▶ ShowingWithPendingHide(token)
//!     ▲                                  │   ▲          │
//!     │ show_controls(false)             │   │ motion   │ pinned timeout
//!     │ or auto-hide timeout             │   └──────────┘
//!     └──────────────────────────────────┘              ▼
//!                                                    Showing
//! ```

use std::time::{Duration, Instant};

use log::debug;

use super::format::{format_position, truncate_label};
use super::layout::{controls_origin, controls_scale, fit_video};
use super::scene::{Asset, Color, Easing, NodeId, NodeKind, Scene};
use crate::config::{
    Config, DEFAULT_OVERLAY_FADE_MS, DEFAULT_OVERLAY_TIMEOUT_SECS, INTRO_FADE_MS, INTRO_OPACITY,
    LABEL_MAX_CHARS, SHOWN_OPACITY,
};
use crate::scheduler::{Scheduler, TaskToken, TimerKind};
use crate::stage::Stage;

// ==========================================================================
// Layout Constants (relative to the control group, at full scale)
// ==========================================================================

/// Width of the seek-bar track when the controls are drawn at full size.
pub const SEEKBAR_WIDTH: f32 = 640.0;

pub const SEEKBAR_HEIGHT: f32 = 20.0;

const PANEL_SIZE: (f32, f32) = (880.0, 160.0);
const ICON_ORIGIN: (f32, f32) = (30.0, 30.0);
const ICON_SIZE: f32 = 100.0;
const LABEL_ORIGIN: (f32, f32) = (200.0, 40.0);
const LABEL_BOX: (f32, f32) = (440.0, 32.0);
const LABEL_FONT_SIZE: f32 = 24.0;
const POSITION_ORIGIN: (f32, f32) = (650.0, 46.0);
const POSITION_BOX: (f32, f32) = (200.0, 24.0);
const POSITION_FONT_SIZE: f32 = 18.0;
const SEEK_FRAME_ORIGIN: (f32, f32) = (200.0, 100.0);
const SEEK_FRAME_SIZE: (f32, f32) = (650.0, 30.0);
const SEEK_TRACK_ORIGIN: (f32, f32) = (205.0, 105.0);
const ERROR_ORIGIN: (f32, f32) = (200.0, 134.0);
const ERROR_BOX: (f32, f32) = (650.0, 22.0);
const ERROR_FONT_SIZE: f32 = 16.0;

/// How long pointer motion is ignored after a click hides the controls.
pub const CLICK_HIDE_GRACE: Duration = Duration::from_millis(500);

const SEEK_FRAME_COLOR: Color = Color::from_rgba8(73, 74, 77, 0xee);
const SEEK_TRACK_COLOR: Color = Color::from_rgba8(0xcc, 0xcc, 0xcc, 0xff);
const SEEK_FILL_OPACITY: u8 = 0x99;
const TEXT_COLOR: Color = Color::from_rgba8(0xff, 0xff, 0xff, 0xff);
const ERROR_COLOR: Color = Color::from_rgba8(0xff, 0x8a, 0x80, 0xff);

/// Timings and opacity of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySettings {
    /// Delay after the last reveal before the controls hide again.
    pub auto_hide: Duration,
    /// Duration of the show/hide fades.
    pub fade: Duration,
    /// Duration of the fade-out that runs when the controls are created.
    pub intro_fade: Duration,
    /// Opacity of the control group while showing (0-255).
    pub shown_opacity: u8,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            auto_hide: Duration::from_secs(u64::from(DEFAULT_OVERLAY_TIMEOUT_SECS)),
            fade: Duration::from_millis(DEFAULT_OVERLAY_FADE_MS),
            intro_fade: Duration::from_millis(INTRO_FADE_MS),
            shown_opacity: SHOWN_OPACITY,
        }
    }
}

impl OverlaySettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            auto_hide: config.overlay_timeout(),
            fade: config.overlay_fade(),
            ..Self::default()
        }
    }
}

/// Whether the controls are on screen, and the pending auto-hide if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Hidden,
    Showing,
    ShowingWithPendingHide(TaskToken),
}

/// Mutable collaborators the overlay works on.
pub struct UiContext<'a> {
    pub scene: &'a mut Scene,
    pub stage: &'a mut Stage,
    pub scheduler: &'a mut Scheduler,
}

impl UiContext<'_> {
    fn now(&self) -> Instant {
        self.scheduler.now()
    }
}

/// Scene handles of every overlay node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayNodes {
    pub video: NodeId,
    pub controls: NodeId,
    pub background: NodeId,
    pub play_icon: NodeId,
    pub pause_icon: NodeId,
    pub seek_frame: NodeId,
    pub seek_track: NodeId,
    pub seek_fill: NodeId,
    pub label: NodeId,
    pub position: NodeId,
    pub error: NodeId,
}

#[derive(Debug)]
pub struct OverlayUi {
    settings: OverlaySettings,
    nodes: OverlayNodes,
    media_width: u32,
    media_height: u32,
    visibility: VisibilityState,
    pinned: bool,
    /// Factor the control group is drawn at for the current stage size.
    scale: f32,
    progress: f32,
    motion_ignored_until: Option<Instant>,
}

impl OverlayUi {
    /// Builds the control group over `video`, lays it out for the current
    /// stage size, hides the cursor and starts the intro fade.
    pub fn construct(
        ctx: &mut UiContext<'_>,
        video: NodeId,
        media_label: &str,
        media_width: u32,
        media_height: u32,
        settings: OverlaySettings,
    ) -> Self {
        ctx.stage.set_title(format!("dogme~ {media_label}"));

        let scene = &mut *ctx.scene;
        let controls = scene.add(scene.root(), NodeKind::Group);
        let background = scene.add(controls, NodeKind::Image(Asset::Panel));
        let play_icon = scene.add(controls, NodeKind::Image(Asset::Play));
        let pause_icon = scene.add(controls, NodeKind::Image(Asset::Pause));
        scene.hide(pause_icon);

        let seek_frame = add_rect(scene, controls, SEEK_FRAME_COLOR);
        let seek_track = add_rect(scene, controls, SEEK_TRACK_COLOR);
        let seek_fill = add_rect(scene, controls, SEEK_FRAME_COLOR);
        scene.set_opacity(seek_fill, SEEK_FILL_OPACITY);

        let label = add_text(
            scene,
            controls,
            truncate_label(media_label, LABEL_MAX_CHARS),
            TEXT_COLOR,
        );
        let position = add_text(scene, controls, String::new(), TEXT_COLOR);
        let error = add_text(scene, controls, String::new(), ERROR_COLOR);
        scene.hide(error);

        let mut overlay = Self {
            settings,
            nodes: OverlayNodes {
                video,
                controls,
                background,
                play_icon,
                pause_icon,
                seek_frame,
                seek_track,
                seek_fill,
                label,
                position,
                error,
            },
            media_width,
            media_height,
            visibility: VisibilityState::Hidden,
            pinned: false,
            scale: 1.0,
            progress: 0.0,
            motion_ignored_until: None,
        };

        let (width, height) = ctx.stage.size();
        overlay.on_resize(ctx, width, height);
        ctx.stage.hide_cursor();

        let now = ctx.now();
        ctx.scene.set_opacity(controls, INTRO_OPACITY);
        ctx.scene
            .animate_opacity(controls, 0, settings.intro_fade, Easing::EaseOutQuint, now);

        overlay
    }

    #[must_use]
    pub fn nodes(&self) -> &OverlayNodes {
        &self.nodes
    }

    #[must_use]
    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    #[must_use]
    pub fn visibility(&self) -> VisibilityState {
        self.visibility
    }

    #[must_use]
    pub fn is_showing(&self) -> bool {
        !matches!(self.visibility, VisibilityState::Hidden)
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Reveals or hides the controls.
    ///
    /// Revealing (re)arms the auto-hide timer, so there is always exactly one
    /// pending auto-hide while the controls are up and unpinned.
    pub fn show_controls(&mut self, ctx: &mut UiContext<'_>, visible: bool) {
        let now = ctx.now();
        match (visible, self.visibility) {
            (true, VisibilityState::Hidden) => {
                ctx.stage.show_cursor();
                ctx.scene.animate_opacity(
                    self.nodes.controls,
                    self.settings.shown_opacity,
                    self.settings.fade,
                    Easing::EaseOutQuint,
                    now,
                );
                self.visibility = if self.pinned {
                    VisibilityState::Showing
                } else {
                    self.arm_auto_hide(ctx)
                };
                debug!("overlay shown");
            }
            (true, VisibilityState::Showing) => {
                if !self.pinned {
                    self.visibility = self.arm_auto_hide(ctx);
                }
            }
            (true, VisibilityState::ShowingWithPendingHide(token)) => {
                ctx.scheduler.cancel(token);
                self.visibility = self.arm_auto_hide(ctx);
            }
            (false, VisibilityState::Showing | VisibilityState::ShowingWithPendingHide(_)) => {
                if let VisibilityState::ShowingWithPendingHide(token) = self.visibility {
                    ctx.scheduler.cancel(token);
                }
                ctx.stage.hide_cursor();
                ctx.scene.animate_opacity(
                    self.nodes.controls,
                    0,
                    self.settings.fade,
                    Easing::EaseOutQuint,
                    now,
                );
                self.visibility = VisibilityState::Hidden;
                debug!("overlay hidden");
            }
            (false, VisibilityState::Hidden) => {}
        }
    }

    fn arm_auto_hide(&self, ctx: &mut UiContext<'_>) -> VisibilityState {
        let token = ctx
            .scheduler
            .schedule_once(TimerKind::AutoHide, self.settings.auto_hide);
        VisibilityState::ShowingWithPendingHide(token)
    }

    /// Handles a fired auto-hide task. Stale tokens are ignored.
    pub fn on_auto_hide_timeout(&mut self, ctx: &mut UiContext<'_>, token: TaskToken) {
        if self.visibility != VisibilityState::ShowingWithPendingHide(token) {
            return;
        }
        if self.pinned {
            self.visibility = VisibilityState::Showing;
        } else {
            self.show_controls(ctx, false);
        }
    }

    /// Reveals the controls for pointer motion, unless a click hid them
    /// less than [`CLICK_HIDE_GRACE`] ago.
    pub fn on_motion(&mut self, ctx: &mut UiContext<'_>) {
        let now = ctx.now();
        if self.motion_ignored_until.is_some_and(|until| now < until) {
            return;
        }
        self.motion_ignored_until = None;
        self.show_controls(ctx, true);
    }

    /// Hides the controls after a click outside the panel.
    pub fn dismiss(&mut self, ctx: &mut UiContext<'_>) {
        if !self.is_showing() {
            return;
        }
        self.show_controls(ctx, false);
        self.motion_ignored_until = Some(ctx.now() + CLICK_HIDE_GRACE);
    }

    /// Click on the panel: pins the controls, or unpins and hides them.
    pub fn toggle_pinned_by_click(&mut self, ctx: &mut UiContext<'_>) {
        if self.pinned {
            self.pinned = false;
            self.dismiss(ctx);
        } else {
            self.pinned = true;
            self.disarm_auto_hide(ctx);
        }
        debug!("overlay pinned: {}", self.pinned);
    }

    /// Pins the controls on screen, or releases them to the auto-hide timer.
    pub fn toggle_pinned(&mut self, ctx: &mut UiContext<'_>) {
        self.pinned = !self.pinned;
        if self.pinned {
            self.show_controls(ctx, true);
            self.disarm_auto_hide(ctx);
        } else {
            self.show_controls(ctx, true);
        }
    }

    fn disarm_auto_hide(&mut self, ctx: &mut UiContext<'_>) {
        if let VisibilityState::ShowingWithPendingHide(token) = self.visibility {
            ctx.scheduler.cancel(token);
            self.visibility = VisibilityState::Showing;
        }
    }

    /// Fits the video surface into the stage, scales the controls down to
    /// the stage when it is smaller than the panel, and re-centers them.
    pub fn on_resize(&mut self, ctx: &mut UiContext<'_>, width: f32, height: f32) {
        let fit = fit_video(self.media_width, self.media_height, width, height);
        ctx.scene.set_position(self.nodes.video, fit.x, fit.y);
        ctx.scene.set_size(self.nodes.video, fit.width, fit.height);

        self.scale = controls_scale(width, height, PANEL_SIZE.0, PANEL_SIZE.1);
        self.layout_controls(ctx.scene);

        let (group_width, _) = ctx.scene.size(self.nodes.controls);
        let (x, y) = controls_origin(width, height, group_width);
        ctx.scene.set_position(self.nodes.controls, x, y);
    }

    /// Current factor the control group is drawn at.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Width of the seek-bar track at the current scale.
    #[must_use]
    pub fn seekbar_width(&self) -> f32 {
        SEEKBAR_WIDTH * self.scale
    }

    fn layout_controls(&self, scene: &mut Scene) {
        let k = self.scale;
        let place = |scene: &mut Scene, id: NodeId, origin: (f32, f32), size: (f32, f32)| {
            scene.set_position(id, origin.0 * k, origin.1 * k);
            scene.set_size(id, size.0 * k, size.1 * k);
        };
        let nodes = &self.nodes;

        scene.set_size(nodes.controls, PANEL_SIZE.0 * k, PANEL_SIZE.1 * k);
        place(scene, nodes.background, (0.0, 0.0), PANEL_SIZE);
        for icon in [nodes.play_icon, nodes.pause_icon] {
            place(scene, icon, ICON_ORIGIN, (ICON_SIZE, ICON_SIZE));
        }
        place(scene, nodes.seek_frame, SEEK_FRAME_ORIGIN, SEEK_FRAME_SIZE);
        place(scene, nodes.seek_track, SEEK_TRACK_ORIGIN, (SEEKBAR_WIDTH, SEEKBAR_HEIGHT));
        place(
            scene,
            nodes.seek_fill,
            SEEK_TRACK_ORIGIN,
            (self.progress * SEEKBAR_WIDTH, SEEKBAR_HEIGHT),
        );

        for (id, origin, bounds, font_size) in [
            (nodes.label, LABEL_ORIGIN, LABEL_BOX, LABEL_FONT_SIZE),
            (nodes.position, POSITION_ORIGIN, POSITION_BOX, POSITION_FONT_SIZE),
            (nodes.error, ERROR_ORIGIN, ERROR_BOX, ERROR_FONT_SIZE),
        ] {
            place(scene, id, origin, bounds);
            scene.set_text_size(id, font_size * k);
        }
    }

    pub fn toggle_fullscreen(&mut self, ctx: &mut UiContext<'_>, enable: bool) {
        ctx.stage.set_fullscreen(enable);
    }

    /// Shows the pause icon while playing and the play icon while paused.
    pub fn set_playing(&mut self, scene: &mut Scene, playing: bool) {
        if playing {
            scene.hide(self.nodes.play_icon);
            scene.show(self.nodes.pause_icon);
        } else {
            scene.show(self.nodes.play_icon);
            scene.hide(self.nodes.pause_icon);
        }
    }

    /// Sets the seek-bar fill to `fraction` of the track width.
    pub fn set_progress(&mut self, scene: &mut Scene, fraction: f32) {
        self.progress = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        scene.set_size(
            self.nodes.seek_fill,
            self.progress * self.seekbar_width(),
            SEEKBAR_HEIGHT * self.scale,
        );
    }

    /// Current width of the seek-bar fill.
    #[must_use]
    pub fn progress_width(&self, scene: &Scene) -> f32 {
        scene.size(self.nodes.seek_fill).0
    }

    pub fn set_position_text(&mut self, scene: &mut Scene, position: Duration, duration: Duration) {
        scene.set_text(self.nodes.position, format_position(position, duration));
    }

    /// Shows `message` under the seek bar and keeps the controls on screen.
    pub fn show_error(&mut self, ctx: &mut UiContext<'_>, message: &str) {
        ctx.scene.set_text(self.nodes.error, message);
        ctx.scene.show(self.nodes.error);
        self.pinned = true;
        self.show_controls(ctx, true);
        self.disarm_auto_hide(ctx);
    }

    /// Seek-bar fraction under the given stage position, if it hits the bar.
    #[must_use]
    pub fn seekbar_hit(&self, scene: &Scene, x: f32, y: f32) -> Option<f32> {
        let picked = scene.pick(x, y)?;
        let on_bar = [
            self.nodes.seek_frame,
            self.nodes.seek_track,
            self.nodes.seek_fill,
        ]
        .contains(&picked);
        if !on_bar {
            return None;
        }
        let (origin_x, _) = scene.absolute_position(self.nodes.seek_track);
        Some(((x - origin_x) / self.seekbar_width()).clamp(0.0, 1.0))
    }

    /// Whether the given stage position hits the panel background or one of
    /// its labels.
    #[must_use]
    pub fn panel_hit(&self, scene: &Scene, x: f32, y: f32) -> bool {
        let panel = [
            self.nodes.background,
            self.nodes.label,
            self.nodes.position,
            self.nodes.error,
        ];
        matches!(scene.pick(x, y), Some(id) if panel.contains(&id))
    }

    /// Whether the given stage position hits the visible play/pause icon.
    #[must_use]
    pub fn play_toggle_hit(&self, scene: &Scene, x: f32, y: f32) -> bool {
        matches!(
            scene.pick(x, y),
            Some(id) if id == self.nodes.play_icon || id == self.nodes.pause_icon
        )
    }
}

fn add_rect(scene: &mut Scene, parent: NodeId, color: Color) -> NodeId {
    scene.add(parent, NodeKind::Rect { color })
}

fn add_text(scene: &mut Scene, parent: NodeId, content: String, color: Color) -> NodeId {
    scene.add(
        parent,
        NodeKind::Text {
            content,
            size: 0.0,
            color,
        },
    )
}

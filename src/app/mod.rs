// SPDX-License-Identifier: MPL-2.0
//! Application root: wires the playback coordinator into the iced runtime.
//!
//! The media file is opened before any window exists, so unplayable input is
//! reported on the terminal. After that, everything runs on the iced event
//! loop: a periodic tick drives timers and the pipeline bus, raw events become
//! coordinator input, and the stage requests the coordinator queues become
//! window tasks.

mod message;
mod subscription;
mod update;

pub use message::{Flags, Message};

use crate::config::{self, Config};
use crate::coordinator::{Coordinator, CoordinatorSettings, PlaybackState, PlayerStatus};
use crate::error::Result;
use crate::inhibit::KeepAwakeInhibitor;
use crate::pipeline::{FfmpegPipeline, FrameSink, Volume};
use crate::stage::{Stage, StageRequest};
use crate::ui::view::{self, ViewContext};
use iced::widget::image;
use iced::{window, Element, Subscription, Task};
use log::warn;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

pub const WINDOW_DEFAULT_WIDTH: u32 = 1280;
pub const WINDOW_DEFAULT_HEIGHT: u32 = 720;
pub const MIN_WINDOW_WIDTH: u32 = 320;
pub const MIN_WINDOW_HEIGHT: u32 = 240;

/// Root iced application state.
pub struct App {
    coordinator: Coordinator<FfmpegPipeline>,
    sink: FrameSink,
    /// Newest decoded frame, ready for the video surface.
    frame: Option<image::Handle>,
    window_id: Option<window::Id>,
    pointer: update::PointerState,
    pending: Vec<StageRequest>,
    config: Config,
    config_dir: Option<PathBuf>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("media", &self.coordinator.media_label())
            .field("status", self.coordinator.status())
            .field("has_frame", &self.frame.is_some())
            .finish()
    }
}

/// Builds the window settings.
#[allow(clippy::cast_precision_loss)]
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: iced::Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(iced::Size::new(
            MIN_WINDOW_WIDTH as f32,
            MIN_WINDOW_HEIGHT as f32,
        )),
        // Quit goes through the coordinator so settings are saved
        exit_on_close_request: false,
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs`: opens the media and runs the iced loop
/// until the player quits.
///
/// # Errors
///
/// Returns an error if the media cannot be opened or the window system fails.
pub fn run(flags: Flags) -> Result<()> {
    use std::cell::RefCell;

    let app = App::new(flags)?;

    // Wrap the app in RefCell<Option<_>> to satisfy the Fn boot requirement
    // while only handing it over once
    let boot_state = RefCell::new(Some(app));
    let boot = move || {
        let app = boot_state
            .borrow_mut()
            .take()
            .expect("Boot function called more than once");
        (app, Task::none())
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .window(window_settings())
        .subscription(App::subscription)
        .run()?;
    Ok(())
}

impl App {
    fn new(flags: Flags) -> Result<Self> {
        let (config, config_warning) = config::load_with_override(flags.config_dir.clone());
        if let Some(warning) = config_warning {
            warn!("{warning}");
        }

        let sink = FrameSink::new();
        let pipeline = FfmpegPipeline::open(
            &flags.media_path,
            sink.clone(),
            Volume::new(config.volume()),
            config.muted(),
        )?;

        let mut settings = CoordinatorSettings::from_config(&config);
        settings.start_fullscreen |= flags.fullscreen;

        #[allow(clippy::cast_precision_loss)]
        let stage = Stage::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32);
        let coordinator = Coordinator::initialize(
            pipeline,
            stage,
            &flags.media_path,
            settings,
            Instant::now(),
        )?
        .with_inhibitor(Box::new(KeepAwakeInhibitor::new()));

        Ok(Self {
            coordinator,
            sink,
            frame: None,
            window_id: None,
            pointer: update::PointerState::default(),
            pending: Vec::new(),
            config,
            config_dir: flags.config_dir,
        })
    }

    fn title(&self) -> String {
        self.coordinator.stage().title().to_string()
    }

    fn subscription(&self) -> Subscription<Message> {
        let busy = self.coordinator.playback() == PlaybackState::Playing
            || *self.coordinator.status() == PlayerStatus::Loading
            || self.coordinator.scene().is_animating(Instant::now());

        Subscription::batch([
            subscription::create_event_subscription(),
            subscription::create_tick_subscription(busy),
        ])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let mut ctx = update::UpdateContext {
            coordinator: &mut self.coordinator,
            sink: &self.sink,
            frame: &mut self.frame,
            window_id: &mut self.window_id,
            pointer: &mut self.pointer,
            pending: &mut self.pending,
            config: &mut self.config,
            config_dir: self.config_dir.as_ref(),
        };

        match message {
            Message::Tick(now) => update::handle_tick(&mut ctx, now),
            Message::RawEvent { window, event } => {
                update::handle_raw_event(&mut ctx, window, &event);
            }
            Message::WindowCloseRequested(window) => {
                update::handle_close_requested(&mut ctx, window);
            }
        }

        update::flush_stage_requests(&mut ctx)
    }

    fn view(&self) -> Element<'_, Message> {
        let placeholder = match self.coordinator.status() {
            PlayerStatus::Failed(message) if self.coordinator.overlay().is_none() => {
                Some(message.as_str())
            }
            _ => None,
        };

        view::view(ViewContext {
            scene: self.coordinator.scene(),
            stage: self.coordinator.stage(),
            frame: self.frame.as_ref(),
            placeholder,
            now: Instant::now(),
        })
    }
}

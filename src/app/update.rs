// SPDX-License-Identifier: MPL-2.0
//! Update handlers for the application.
//!
//! Converts ticks and raw iced events into coordinator calls, and the
//! coordinator's queued stage requests back into iced window tasks.

use super::Message;
use crate::config::{self, Config};
use crate::coordinator::Coordinator;
use crate::input::InputEvent;
use crate::pipeline::{FfmpegPipeline, FrameSink, MediaPipeline, VideoFrame};
use crate::stage::StageRequest;
use iced::widget::image;
use iced::{keyboard, mouse, window, Point, Size, Task};
use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use super::subscription::map_key;

/// Last known pointer position and primary button state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub position: Option<Point>,
    pub button_held: bool,
}

/// Mutable application state the handlers work on.
pub struct UpdateContext<'a> {
    pub coordinator: &'a mut Coordinator<FfmpegPipeline>,
    pub sink: &'a FrameSink,
    pub frame: &'a mut Option<image::Handle>,
    pub window_id: &'a mut Option<window::Id>,
    pub pointer: &'a mut PointerState,
    /// Stage requests waiting for the window id.
    pub pending: &'a mut Vec<StageRequest>,
    pub config: &'a mut Config,
    pub config_dir: Option<&'a PathBuf>,
}

/// Drains the bus, picks up the newest frame and fires due timers.
pub fn handle_tick(ctx: &mut UpdateContext<'_>, now: Instant) {
    while let Some(message) = ctx.coordinator.pipeline_mut().try_recv_bus() {
        ctx.coordinator.on_bus_message(message);
    }

    if let Some(frame) = ctx.sink.take_latest() {
        *ctx.frame = Some(frame_handle(frame));
    }

    ctx.coordinator.on_tick(now);
}

/// Builds an image handle from RGBA data, without copying when possible.
fn frame_handle(frame: VideoFrame) -> image::Handle {
    let data = Arc::try_unwrap(frame.rgba).unwrap_or_else(|arc| (*arc).clone());
    image::Handle::from_rgba(frame.width, frame.height, data)
}

pub fn handle_raw_event(ctx: &mut UpdateContext<'_>, window: window::Id, event: &iced::Event) {
    ctx.window_id.get_or_insert(window);

    match event {
        iced::Event::Window(window::Event::Opened { size, .. } | window::Event::Resized(size)) => {
            ctx.coordinator.on_stage_resized(size.width, size.height);
        }
        _ => {
            if let Some(input) = to_input_event(ctx.pointer, event) {
                ctx.coordinator.on_input_event_at(input, Instant::now());
            }
        }
    }
}

/// Translates an iced event into coordinator input, tracking the pointer.
pub(super) fn to_input_event(pointer: &mut PointerState, event: &iced::Event) -> Option<InputEvent> {
    match event {
        iced::Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. })
            if !modifiers.command() && !modifiers.alt() =>
        {
            Some(InputEvent::KeyPress(map_key(key)))
        }
        iced::Event::Mouse(mouse::Event::CursorMoved { position }) => {
            pointer.position = Some(*position);
            let (x, y) = (position.x, position.y);
            Some(if pointer.button_held {
                InputEvent::PointerDrag { x, y }
            } else {
                InputEvent::Motion { x, y }
            })
        }
        iced::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
            pointer.button_held = true;
            pointer
                .position
                .map(|position| InputEvent::ButtonPress {
                    x: position.x,
                    y: position.y,
                })
        }
        iced::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
            pointer.button_held = false;
            None
        }
        _ => None,
    }
}

pub fn handle_close_requested(ctx: &mut UpdateContext<'_>, window: window::Id) {
    ctx.window_id.get_or_insert(window);
    ctx.coordinator.quit();
}

/// Turns queued stage requests into window tasks.
///
/// Requests are held back until the window id is known.
pub fn flush_stage_requests(ctx: &mut UpdateContext<'_>) -> Task<Message> {
    ctx.pending.extend(ctx.coordinator.take_stage_requests());
    let Some(window_id) = *ctx.window_id else {
        return Task::none();
    };

    let requests: Vec<StageRequest> = ctx.pending.drain(..).collect();
    let mut tasks = Vec::with_capacity(requests.len());
    for request in requests {
        debug!("stage request: {request:?}");
        match request {
            StageRequest::SetFullscreen(enable) => {
                let mode = if enable {
                    window::Mode::Fullscreen
                } else {
                    window::Mode::Windowed
                };
                tasks.push(window::set_mode(window_id, mode));
            }
            StageRequest::Resize { width, height } => {
                tasks.push(window::resize(window_id, Size::new(width, height)));
            }
            StageRequest::Quit => {
                persist_audio_settings(ctx);
                tasks.push(iced::exit());
            }
        }
    }
    Task::batch(tasks)
}

/// Writes the current volume and mute state back to the settings file.
fn persist_audio_settings(ctx: &mut UpdateContext<'_>) {
    let pipeline = ctx.coordinator.pipeline();
    ctx.config.video.volume = Some(pipeline.volume().value());
    ctx.config.video.muted = Some(pipeline.is_muted());

    if let Err(err) = config::save_with_override(ctx.config, ctx.config_dir.cloned()) {
        warn!("failed to save settings: {err}");
    }
}

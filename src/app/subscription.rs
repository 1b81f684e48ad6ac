// SPDX-License-Identifier: MPL-2.0
//! Event subscriptions for the application.
//!
//! Native keyboard, pointer and window events are forwarded as raw events;
//! the update loop turns them into coordinator input.

use super::Message;
use crate::input::Key;
use iced::keyboard::{self, key::Named};
use iced::{event, time, Subscription};
use std::time::Duration;

/// Tick period while something moves on screen.
const FRAME_TICK: Duration = Duration::from_millis(16);

/// Tick period while nothing is animating or playing.
const IDLE_TICK: Duration = Duration::from_millis(100);

/// Routes window close requests and uncaptured input to the update loop.
pub fn create_event_subscription() -> Subscription<Message> {
    event::listen_with(|event, status, window_id| {
        if let event::Event::Window(iced::window::Event::CloseRequested) = &event {
            return Some(Message::WindowCloseRequested(window_id));
        }

        // Size changes matter even when a widget captured them
        if let event::Event::Window(
            iced::window::Event::Resized(_) | iced::window::Event::Opened { .. },
        ) = &event
        {
            return Some(Message::RawEvent {
                window: window_id,
                event,
            });
        }

        let relevant = matches!(
            event,
            event::Event::Keyboard(keyboard::Event::KeyPressed { .. })
                | event::Event::Mouse(
                    iced::mouse::Event::CursorMoved { .. }
                        | iced::mouse::Event::ButtonPressed(iced::mouse::Button::Left)
                        | iced::mouse::Event::ButtonReleased(iced::mouse::Button::Left)
                )
        );

        match status {
            event::Status::Ignored if relevant => Some(Message::RawEvent {
                window: window_id,
                event,
            }),
            _ => None,
        }
    })
}

/// Creates the periodic tick, fast while `busy`.
pub fn create_tick_subscription(busy: bool) -> Subscription<Message> {
    let period = if busy { FRAME_TICK } else { IDLE_TICK };
    time::every(period).map(Message::Tick)
}

/// Maps an iced key to the keys the coordinator understands.
pub(super) fn map_key(key: &keyboard::Key) -> Key {
    match key {
        keyboard::Key::Named(Named::ArrowLeft) => Key::Left,
        keyboard::Key::Named(Named::ArrowRight) => Key::Right,
        keyboard::Key::Named(Named::ArrowUp) => Key::Up,
        keyboard::Key::Named(Named::ArrowDown) => Key::Down,
        keyboard::Key::Named(Named::Escape) => Key::Escape,
        keyboard::Key::Named(Named::Space) => Key::Space,
        keyboard::Key::Character(c) => {
            let mut chars = c.as_str().chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Key::Character(ch.to_ascii_lowercase()),
                _ => Key::Other,
            }
        }
        _ => Key::Other,
    }
}

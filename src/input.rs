// SPDX-License-Identifier: MPL-2.0
//! Input events as seen by the playback coordinator.

/// A key the coordinator may react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    Character(char),
    Other,
}

/// Keyboard and pointer input, in stage coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyPress(Key),
    /// Primary button pressed at the given position.
    ButtonPress { x: f32, y: f32 },
    /// Pointer moved while the primary button is held.
    PointerDrag { x: f32, y: f32 },
    /// Pointer moved with no button held.
    Motion { x: f32, y: f32 },
}

impl InputEvent {
    /// Shorthand for a printable key press.
    #[must_use]
    pub fn char(c: char) -> Self {
        InputEvent::KeyPress(Key::Character(c))
    }
}

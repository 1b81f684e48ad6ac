// SPDX-License-Identifier: MPL-2.0
//! Toolkit-neutral handle on the player window.
//!
//! The stage records what the core wants from the window (fullscreen, a new
//! size, a title, cursor visibility, quitting) and the application shell turns
//! queued [`StageRequest`]s into window tasks after each update.

/// Window operation requested by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum StageRequest {
    SetFullscreen(bool),
    Resize { width: f32, height: f32 },
    Quit,
}

#[derive(Debug, Clone)]
pub struct Stage {
    width: f32,
    height: f32,
    title: String,
    fullscreen: bool,
    cursor_visible: bool,
    requests: Vec<StageRequest>,
}

impl Stage {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            title: String::from("dogme"),
            fullscreen: false,
            cursor_visible: true,
            requests: Vec::new(),
        }
    }

    #[must_use]
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Records the size the window system reports.
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Asks the window system for a new size.
    ///
    /// The logical size is updated immediately so layout done in the same
    /// update sees it; the real resize event confirms it later.
    pub fn request_size(&mut self, width: f32, height: f32) {
        self.set_size(width, height);
        self.requests.push(StageRequest::Resize { width, height });
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn set_fullscreen(&mut self, enable: bool) {
        if self.fullscreen == enable {
            return;
        }
        self.fullscreen = enable;
        self.requests.push(StageRequest::SetFullscreen(enable));
    }

    #[must_use]
    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn show_cursor(&mut self) {
        self.cursor_visible = true;
    }

    pub fn hide_cursor(&mut self) {
        self.cursor_visible = false;
    }

    pub fn quit(&mut self) {
        if !self.requests.contains(&StageRequest::Quit) {
            self.requests.push(StageRequest::Quit);
        }
    }

    /// Drains the pending window requests in the order they were made.
    pub fn take_requests(&mut self) -> Vec<StageRequest> {
        std::mem::take(&mut self.requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_request_is_queued_only_on_change() {
        let mut stage = Stage::new(640.0, 480.0);
        stage.set_fullscreen(false);
        assert!(stage.take_requests().is_empty());

        stage.set_fullscreen(true);
        stage.set_fullscreen(true);
        assert_eq!(
            stage.take_requests(),
            vec![StageRequest::SetFullscreen(true)]
        );
        assert!(stage.is_fullscreen());
    }

    #[test]
    fn request_size_updates_logical_size() {
        let mut stage = Stage::new(640.0, 480.0);
        stage.request_size(1280.0, 720.0);
        assert_eq!(stage.size(), (1280.0, 720.0));
        assert_eq!(
            stage.take_requests(),
            vec![StageRequest::Resize {
                width: 1280.0,
                height: 720.0
            }]
        );
    }

    #[test]
    fn quit_is_queued_once() {
        let mut stage = Stage::new(1.0, 1.0);
        stage.quit();
        stage.quit();
        assert_eq!(stage.take_requests(), vec![StageRequest::Quit]);
        assert!(stage.take_requests().is_empty());
    }

    #[test]
    fn cursor_visibility_toggles() {
        let mut stage = Stage::new(1.0, 1.0);
        assert!(stage.cursor_visible());
        stage.hide_cursor();
        assert!(!stage.cursor_visible());
        stage.show_cursor();
        assert!(stage.cursor_visible());
    }
}

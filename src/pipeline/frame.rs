// SPDX-License-Identifier: MPL-2.0
//! Decoded frames and the slot the decode thread renders into.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A decoded video frame in RGBA format.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGBA pixel data, tightly packed (width * height * 4 bytes).
    pub rgba: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    /// Presentation timestamp.
    pub pts: Duration,
}

impl VideoFrame {
    /// Returns the size of this frame in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.rgba.len()
    }
}

/// Latest-frame slot shared between the decode thread and the renderer.
///
/// Presenting replaces any frame the renderer has not picked up yet, so a
/// slow UI drops frames instead of queueing them.
#[derive(Debug, Clone, Default)]
pub struct FrameSink {
    slot: Arc<Mutex<Option<VideoFrame>>>,
}

impl FrameSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn present(&self, frame: VideoFrame) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(frame);
        }
    }

    /// Takes the newest unseen frame, if any.
    #[must_use]
    pub fn take_latest(&self) -> Option<VideoFrame> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pts_ms: u64) -> VideoFrame {
        VideoFrame {
            rgba: Arc::new(vec![0; 2 * 2 * 4]),
            width: 2,
            height: 2,
            pts: Duration::from_millis(pts_ms),
        }
    }

    #[test]
    fn newer_frame_replaces_unseen_one() {
        let sink = FrameSink::new();
        sink.present(frame(0));
        sink.present(frame(40));

        let latest = sink.take_latest().map(|f| f.pts);
        assert_eq!(latest, Some(Duration::from_millis(40)));
        assert!(sink.take_latest().is_none());
    }

    #[test]
    fn clones_share_the_slot() {
        let sink = FrameSink::new();
        let producer = sink.clone();
        producer.present(frame(10));
        assert_eq!(sink.take_latest().map(|f| f.size_bytes()), Some(16));
    }
}

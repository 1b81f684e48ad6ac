// SPDX-License-Identifier: MPL-2.0
//! Lock-free playback position shared between the decode thread and the UI.
//!
//! The decode thread re-anchors the clock on every presented frame; readers
//! extrapolate from the last anchor while the clock runs, so position queries
//! stay smooth between frames.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Reference instant for storing `Instant`s as atomic microseconds.
static REFERENCE_INSTANT: OnceLock<Instant> = OnceLock::new();

#[allow(clippy::cast_possible_truncation)] // u128 microseconds won't overflow u64 for reasonable durations
fn instant_to_us(instant: Instant) -> u64 {
    let reference = REFERENCE_INSTANT.get_or_init(Instant::now);
    instant.saturating_duration_since(*reference).as_micros() as u64
}

#[allow(clippy::cast_possible_truncation)]
fn duration_to_us(duration: Duration) -> u64 {
    duration.as_micros() as u64
}

#[derive(Debug, Default)]
pub struct PlaybackClock {
    /// Media position at the last anchor, in microseconds.
    anchor_pts_us: AtomicU64,

    /// Wall time of the last anchor as microseconds since `REFERENCE_INSTANT`.
    anchor_time_us: AtomicU64,

    running: AtomicBool,
}

impl PlaybackClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-anchors the clock at `position`, keeping its running state.
    pub fn set_position(&self, position: Duration) {
        self.anchor_at(position, Instant::now());
    }

    fn anchor_at(&self, position: Duration, now: Instant) {
        self.anchor_pts_us
            .store(duration_to_us(position), Ordering::SeqCst);
        self.anchor_time_us
            .store(instant_to_us(now), Ordering::SeqCst);
    }

    /// Starts advancing from the current position.
    pub fn resume(&self) {
        let position = self.position();
        self.anchor_at(position, Instant::now());
        self.running.store(true, Ordering::SeqCst);
    }

    /// Freezes the clock at its current position.
    pub fn pause(&self) {
        let position = self.position();
        self.running.store(false, Ordering::SeqCst);
        self.anchor_at(position, Instant::now());
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current media position.
    #[must_use]
    pub fn position(&self) -> Duration {
        self.position_at(Instant::now())
    }

    fn position_at(&self, now: Instant) -> Duration {
        let anchor = Duration::from_micros(self.anchor_pts_us.load(Ordering::SeqCst));
        if !self.is_running() {
            return anchor;
        }
        let anchor_time_us = self.anchor_time_us.load(Ordering::SeqCst);
        let elapsed_us = instant_to_us(now).saturating_sub(anchor_time_us);
        anchor + Duration::from_micros(elapsed_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_clock_holds_position() {
        let clock = PlaybackClock::new();
        clock.set_position(Duration::from_secs(42));
        let later = Instant::now() + Duration::from_secs(5);
        assert_eq!(clock.position_at(later), Duration::from_secs(42));
    }

    #[test]
    fn running_clock_extrapolates_from_anchor() {
        let clock = PlaybackClock::new();
        instant_to_us(Instant::now());
        let now = Instant::now();
        clock.running.store(true, Ordering::SeqCst);
        clock.anchor_at(Duration::from_secs(10), now);

        let later = now + Duration::from_millis(1_500);
        let position = clock.position_at(later);
        assert!(position >= Duration::from_millis(11_499));
        assert!(position <= Duration::from_millis(11_501));
    }

    #[test]
    fn pause_freezes_and_resume_restarts() {
        let clock = PlaybackClock::new();
        clock.set_position(Duration::from_secs(3));
        clock.resume();
        assert!(clock.is_running());

        clock.pause();
        assert!(!clock.is_running());
        let frozen = clock.position();
        assert!(frozen >= Duration::from_secs(3));
        assert!(frozen < Duration::from_secs(4));
    }
}

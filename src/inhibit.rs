// SPDX-License-Identifier: MPL-2.0
//! Keeps the screensaver and display sleep away while a video plays.

use log::{debug, warn};

/// Something that can hold off the screensaver.
pub trait SleepInhibitor {
    /// Takes or releases the inhibition. Repeated calls with the same value
    /// do nothing.
    fn set_inhibited(&mut self, inhibited: bool);

    fn is_inhibited(&self) -> bool;
}

/// Inhibitor backed by the platform's idle-inhibit service through
/// `keepawake` (D-Bus screensaver on Linux, power assertions on macOS,
/// `SetThreadExecutionState` on Windows).
#[derive(Default)]
pub struct KeepAwakeInhibitor {
    guard: Option<keepawake::KeepAwake>,
}

impl KeepAwakeInhibitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SleepInhibitor for KeepAwakeInhibitor {
    fn set_inhibited(&mut self, inhibited: bool) {
        if !inhibited {
            if self.guard.take().is_some() {
                debug!("screensaver released");
            }
            return;
        }
        if self.guard.is_some() {
            return;
        }

        let created = keepawake::Builder::default()
            .display(true)
            .idle(true)
            .reason("Video playback")
            .app_name("Dogme")
            .app_reverse_domain("org.dogme.Dogme")
            .create();
        match created {
            Ok(guard) => {
                self.guard = Some(guard);
                debug!("screensaver inhibited");
            }
            // Playback goes on without it
            Err(err) => warn!("cannot inhibit the screensaver: {err}"),
        }
    }

    fn is_inhibited(&self) -> bool {
        self.guard.is_some()
    }
}

/// Inhibitor that only remembers what it was asked for. Used until a real
/// one is installed, and in tests.
#[derive(Debug, Default)]
pub struct RecordingInhibitor {
    inhibited: bool,
}

impl SleepInhibitor for RecordingInhibitor {
    fn set_inhibited(&mut self, inhibited: bool) {
        self.inhibited = inhibited;
    }

    fn is_inhibited(&self) -> bool {
        self.inhibited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_inhibitor_follows_requests() {
        let mut inhibitor = RecordingInhibitor::default();
        assert!(!inhibitor.is_inhibited());

        inhibitor.set_inhibited(true);
        inhibitor.set_inhibited(true);
        assert!(inhibitor.is_inhibited());

        inhibitor.set_inhibited(false);
        assert!(!inhibitor.is_inhibited());
    }

    #[test]
    fn releasing_an_idle_keepawake_inhibitor_is_a_no_op() {
        let mut inhibitor = KeepAwakeInhibitor::new();
        inhibitor.set_inhibited(false);
        assert!(!inhibitor.is_inhibited());
    }
}

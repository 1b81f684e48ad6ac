// SPDX-License-Identifier: MPL-2.0
//! Output gain as controlled from the keyboard.

use crate::config::{DEFAULT_VOLUME, MAX_VOLUME, MIN_VOLUME, VOLUME_STEP};

/// Linear gain between 0.0 and 1.0, adjusted in steps of 0.1.
///
/// ```
/// use dogme::pipeline::Volume;
///
/// assert_eq!(Volume::new(2.0).value(), 1.0);
/// assert_eq!(Volume::new(0.5).increase().value(), 0.6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume(f64);

impl Volume {
    /// NaN maps to silence.
    #[must_use]
    pub fn new(volume: f64) -> Self {
        if volume.is_nan() {
            return Self(MIN_VOLUME);
        }
        Self(volume.clamp(MIN_VOLUME, MAX_VOLUME))
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn increase(self) -> Self {
        Self::new(snap(self.0 + VOLUME_STEP))
    }

    #[must_use]
    pub fn decrease(self) -> Self {
        Self::new(snap(self.0 - VOLUME_STEP))
    }
}

/// Rounds to two decimals so repeated steps land on exact values.
fn snap(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Default for Volume {
    fn default() -> Self {
        Self(DEFAULT_VOLUME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_abs_diff_eq;

    #[test]
    fn new_clamps_to_valid_range() {
        assert_abs_diff_eq!(Volume::new(-0.5).value(), MIN_VOLUME);
        assert_abs_diff_eq!(Volume::new(1.5).value(), MAX_VOLUME);
        assert_abs_diff_eq!(Volume::new(0.5).value(), 0.5);
        assert_abs_diff_eq!(Volume::new(f64::NAN).value(), MIN_VOLUME);
    }

    #[test]
    fn increase_adds_step() {
        assert_abs_diff_eq!(Volume::new(0.5).increase().value(), 0.6);
        assert_abs_diff_eq!(Volume::new(MAX_VOLUME).increase().value(), MAX_VOLUME);
    }

    #[test]
    fn decrease_subtracts_step() {
        assert_abs_diff_eq!(Volume::new(0.5).decrease().value(), 0.4);
        assert_abs_diff_eq!(Volume::new(MIN_VOLUME).decrease().value(), MIN_VOLUME);
    }

    #[test]
    fn repeated_steps_land_on_exact_bounds() {
        let mut vol = Volume::new(0.0);
        for _ in 0..10 {
            vol = vol.increase();
        }
        assert_eq!(vol.value(), 1.0);

        for _ in 0..10 {
            vol = vol.decrease();
        }
        assert_eq!(vol.value(), 0.0);
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Test utilities for float comparisons and other common test helpers.
//!
//! Re-exports the `approx` crate's assertion macros, which handle
//! floating-point precision issues that `assert_eq!` cannot.

pub use approx::{assert_abs_diff_eq, assert_relative_eq};

use std::time::{Duration, Instant};

/// Epsilon for scene geometry and opacity comparisons.
pub const F32_EPSILON: f32 = 1e-4;

/// Returns `base` shifted forward by `millis`.
pub fn after_ms(base: Instant, millis: u64) -> Instant {
    base + Duration::from_millis(millis)
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Rate-limited approach of a commanded power towards its target.

use micromath::F32Ext;

/// Longest time step a single ramp update may cover, in seconds.
pub const MAX_STEP_S: f32 = 0.1;

/// Convert a millisecond interval to a ramp step, clamped to [`MAX_STEP_S`].
#[inline]
pub fn step_seconds(elapsed_ms: u32) -> f32 {
    (elapsed_ms as f32 / 1000.0).min(MAX_STEP_S)
}

/// Move `current` towards `target` by at most `max_change`, landing exactly on `target` once the
/// remaining gap fits in one step.
pub fn ramp_towards(current: f32, target: f32, max_change: f32) -> f32 {
    let difference = target - current;
    if difference.abs() <= max_change {
        target
    } else if difference > 0.0 {
        current + max_change
    } else {
        current - max_change
    }
}

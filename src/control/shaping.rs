// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Axis shaping shared by the mixer and the RC decoder.

use micromath::F32Ext;

pub use crate::drivers::picoborg_rev::clamp_power;

/// Zero a centered band of half-width `deadzone` and rescale the rest back to [-1, 1].
///
/// Odd-symmetric, and continuous at `|value| == deadzone`. A NaN input maps to 0.
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    let magnitude = value.abs();
    if value.is_nan() || magnitude < deadzone {
        return 0.0;
    }
    let scaled = (magnitude - deadzone) / (1.0 - deadzone);
    if value < 0.0 {
        -scaled
    } else {
        scaled
    }
}

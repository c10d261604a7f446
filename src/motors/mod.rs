// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Drive Abstractions
//!
//! This module contains chassis-level wrappers that sit above device-level drivers in `drivers`.
//!
//! ## Modules
//!
//! - [`skid_steer`] - Left/right drive on a PicoBorg Reverse, including the wiring polarity.

pub mod skid_steer;

pub use skid_steer::SkidSteer;

use crate::drivers::picoborg_rev::DriverState;

/// Sink for per-side power commands, in chassis terms (positive drives forward).
pub trait DriveOutput {
    /// Apply `left` and `right` power in [-1.0, 1.0]. Best-effort; never fails.
    fn set_sides(&mut self, left: f32, right: f32);

    /// Cut power to both sides.
    fn all_off(&mut self);

    /// Identity and cached safety flags of the motor driver.
    fn driver_state(&self) -> DriverState;

    /// Re-read the safety flags from hardware.
    fn refresh_status(&mut self);

    /// Tell the output stage whether to ignore its emergency power-off input.
    fn set_epo_ignore(&mut self, ignore: bool);
}

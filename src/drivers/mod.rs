// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! application logic.
//!
//! ## Existing drivers
//!
//! - [`picoborg_rev`] – PiBorg PicoBorg Reverse dual motor driver over I2C
//! - [`rc_receiver`] – FlySky RC receiver, PPM or per-channel PWM
//! - [`gamepad`] – seam to an external gamepad driver
//! - [`retry`] – bounded retry used by the bus drivers

pub mod gamepad;
pub mod picoborg_rev;
pub mod rc_receiver;
pub mod retry;

pub use gamepad::{Gamepad, GamepadInput, NoGamepad};
pub use picoborg_rev::PicoBorgRev;
pub use rc_receiver::{FramedReceiver, RcReceiver};

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Logic
//!
//! This module turns operator input into motor power. It does not touch hardware directly; power
//! leaves through [`crate::motors::DriveOutput`].
//!
//! ## Modules
//!
//! - [`shaping`] - Clamping and deadzone rescaling of axis values.
//! - [`ramp`] - Rate-limited approach towards a target power.
//! - [`mixer`] - Drive mixer: tank/arcade intents to ramped per-side power.
//! - [`input`] - Input sample and source trait shared by the RC receiver and the gamepad.
//! - [`arbiter`] - Input source selection, deadman timeout and per-tick orchestration.

pub mod arbiter;
pub mod input;
pub mod mixer;
pub mod ramp;
pub mod shaping;

pub use arbiter::{InputArbiter, InputMode};
pub use input::{InputSample, InputSource, SpeedRequest};
pub use mixer::DriveMixer;

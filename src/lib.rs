// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # DiddyBorg Drive Firmware
//!
//! Drive core for a six-wheeled skid-steer robot, written in Rust, targeting an STM32F777 MCU. A
//! PicoBorg Reverse dual motor driver on I2C powers the two sides; driving input comes from a
//! hobby RC receiver or a gamepad, whichever is alive.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | Time base, GPIO, console and `embedded-hal` adapters |
//! | [`drivers`] | PicoBorg Reverse, RC receiver and gamepad |
//! | [`motors`] | Left/right drive output over the motor driver |
//! | [`control`] | Shaping, ramping, mixing and input arbitration |
//! | [`protocol`] | PPM decoding and the binary console link |
//! | [`config`] | Tunables and their defaults |
//! | [`system`] | The assembled robot and its control-loop tick |
//!
//! Everything except the register-level parts of [`hw`] builds and tests on the host.
//!
//! ## Getting Started
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod hw;
pub mod motors;
pub mod protocol;
pub mod system;

pub use error::{Error, Result};

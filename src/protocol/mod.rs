// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Protocols
//!
//! - [`ppm`] - Interrupt-side decoder for a framed RC pulse train.
//! - [`messages`], [`parser`] - Console configuration and telemetry link.

pub mod messages;
pub mod parser;
pub mod ppm;

pub use messages::Command;
pub use parser::Parser;

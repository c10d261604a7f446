// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MCU-level support: time base, GPIO, console and the `embedded-hal` 1.0 adapters.
//!
//! [`clock`], [`compat`] and [`led`] are portable; the rest touch STM32F7 registers and only build
//! for the target.

pub mod clock;
pub mod compat;
pub mod led;

#[cfg(target_os = "none")]
pub mod exti;
#[cfg(target_os = "none")]
pub mod pins;
#[cfg(target_os = "none")]
pub mod timer;
#[cfg(target_os = "none")]
pub mod usart;

pub use clock::Clock;
pub use compat::{LegacyI2c, LegacyInput, LegacyOutput};
pub use led::{Blinker, Led};

#[cfg(target_os = "none")]
pub use timer::MonoTimer;
#[cfg(target_os = "none")]
pub use usart::Usart;

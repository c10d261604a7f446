// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LED with active-level handling and a non-blocking blinker.

use embedded_hal::digital::OutputPin;

use crate::hw::clock::elapsed;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

/// LED abstraction that remembers its active level and last known state.
pub struct Led<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Create an LED wrapper, initializing it to OFF.
    pub fn new(mut pin: PIN, active: ActiveLevel) -> Self {
        match active {
            ActiveLevel::High => pin.set_low().ok(),
            ActiveLevel::Low => pin.set_high().ok(),
        };
        Self {
            pin,
            active,
            is_on: false,
        }
    }

    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    /// Drive the LED logically ON (true) or OFF (false).
    pub fn set(&mut self, on: bool) {
        match (self.active, on) {
            (ActiveLevel::High, true) | (ActiveLevel::Low, false) => self.pin.set_high().ok(),
            (ActiveLevel::High, false) | (ActiveLevel::Low, true) => self.pin.set_low().ok(),
        };
        self.is_on = on;
    }

    pub fn toggle(&mut self) {
        self.set(!self.is_on);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}

/// Toggles an [`Led`] at a caller-chosen interval from the control loop.
pub struct Blinker<PIN: OutputPin> {
    led: Led<PIN>,
    last_toggle_ms: Option<u32>,
}

impl<PIN: OutputPin> Blinker<PIN> {
    pub fn new(led: Led<PIN>) -> Self {
        Self {
            led,
            last_toggle_ms: None,
        }
    }

    /// Toggle if at least `interval_ms` has passed since the last toggle.
    pub fn tick(&mut self, now_ms: u32, interval_ms: u32) {
        let due = match self.last_toggle_ms {
            Some(last) => elapsed(last, now_ms) >= interval_ms,
            None => true,
        };
        if due {
            self.last_toggle_ms = Some(now_ms);
            self.led.toggle();
        }
    }

    #[inline]
    pub fn led(&self) -> &Led<PIN> {
        &self.led
    }

    pub fn free(self) -> Led<PIN> {
        self.led
    }
}

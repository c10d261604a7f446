// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Robot configuration and its defaults.
//!
//! Values here are only ever applied through the component setters, which clamp out-of-range
//! input, so a config struct may hold anything.

use crate::drivers::picoborg_rev::DEFAULT_ADDRESS;
use crate::protocol::ppm::MAX_CHANNELS;

/// Control loop period.
pub const CONTROL_PERIOD_MS: u32 = 10;

/// Interval between periodic status reports.
pub const STATUS_PERIOD_MS: u32 = 2000;

/// Console baud rate.
pub const SERIAL_BAUD: u32 = 115_200;

/// Motor driver bus clock.
pub const I2C_FREQUENCY_HZ: u32 = 100_000;

/// How drive intents are mixed into per-side power.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DriveMode {
    /// Left and right axes drive each side directly.
    Tank,
    /// Throttle plus steering.
    Arcade,
    /// Declared by the control surface but not implemented; rejected by the mixer.
    Racing,
}

impl DriveMode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DriveMode::Tank),
            1 => Some(DriveMode::Arcade),
            2 => Some(DriveMode::Racing),
            _ => None,
        }
    }
}

/// Which input source the arbiter may select.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputPolicy {
    /// Gamepad if connected, else the RC receiver.
    #[default]
    Auto,
    ForceGamepad,
    ForceFlysky,
}

impl InputPolicy {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(InputPolicy::Auto),
            1 => Some(InputPolicy::ForceGamepad),
            2 => Some(InputPolicy::ForceFlysky),
            _ => None,
        }
    }
}

/// Drive mixer settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DriveConfig {
    /// Scalar applied to every side power, [0, 1].
    pub speed_limit: f32,
    /// Axis dead band, [0, 0.5).
    pub deadzone: f32,
    pub ramping: bool,
    /// Ramp slope in power units per second.
    pub ramp_rate: f32,
    pub invert_left: bool,
    pub invert_right: bool,
    pub mode: DriveMode,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            speed_limit: 0.7,
            deadzone: 0.15,
            ramping: true,
            ramp_rate: 3.0,
            invert_left: false,
            invert_right: false,
            mode: DriveMode::Arcade,
        }
    }
}

/// RC receiver channel mapping (0-indexed, Mode 2 transmitter layout by default).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RcConfig {
    pub throttle_channel: usize,
    pub steering_channel: usize,
    /// Tank-mode left side.
    pub left_channel: usize,
    /// Tank-mode right side.
    pub right_channel: usize,
    pub reversed: [bool; MAX_CHANNELS],
    /// Half-width of the ignored band around the 1500 us center.
    pub pulse_deadband_us: u16,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            throttle_channel: 2,
            steering_channel: 0,
            left_channel: 3,
            right_channel: 1,
            reversed: [false; MAX_CHANNELS],
            pulse_deadband_us: 50,
        }
    }
}

/// Speed limits selected by the gamepad buttons.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpeedPresets {
    pub default: f32,
    pub boost: f32,
    pub slow: f32,
}

impl Default for SpeedPresets {
    fn default() -> Self {
        Self {
            default: 0.7,
            boost: 1.0,
            slow: 0.3,
        }
    }
}

/// Everything applied at start-up.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SystemConfig {
    pub drive: DriveConfig,
    pub rc: RcConfig,
    pub policy: InputPolicy,
    pub presets: SpeedPresets,
    /// Pushed to the motor driver; set when no EPO switch is fitted.
    pub epo_ignore: bool,
    pub motor_address: u8,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            drive: DriveConfig::default(),
            rc: RcConfig::default(),
            policy: InputPolicy::Auto,
            presets: SpeedPresets::default(),
            epo_ignore: false,
            motor_address: DEFAULT_ADDRESS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_codes() {
        assert_eq!(DriveMode::from_code(0), Some(DriveMode::Tank));
        assert_eq!(DriveMode::from_code(2), Some(DriveMode::Racing));
        assert_eq!(DriveMode::from_code(3), None);
        assert_eq!(InputPolicy::from_code(2), Some(InputPolicy::ForceFlysky));
        assert_eq!(InputPolicy::from_code(9), None);
    }

    #[test]
    fn defaults_match_robot_tuning() {
        let cfg = SystemConfig::default();
        assert_eq!(cfg.drive.speed_limit, 0.7);
        assert_eq!(cfg.drive.deadzone, 0.15);
        assert_eq!(cfg.drive.mode, DriveMode::Arcade);
        assert_eq!(cfg.rc.throttle_channel, 2);
        assert_eq!(cfg.policy, InputPolicy::Auto);
        assert_eq!(cfg.motor_address, 0x44);
    }
}

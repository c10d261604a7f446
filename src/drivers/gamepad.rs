// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Seam to an external gamepad driver.
//!
//! The pairing and transport stack is outside this crate. A driver implements [`Gamepad`] and
//! reports raw stick values in ±512 (Y positive towards the operator) plus the A/B/Y buttons.
//! [`GamepadInput`] normalizes those reports for the arbiter.

use crate::control::input::{InputSample, InputSource, SpeedRequest};
use crate::control::shaping::clamp_power;

/// Full-scale raw stick value.
pub const AXIS_MAX: i16 = 512;

/// One report as delivered by the gamepad driver.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GamepadReport {
    /// Left stick X.
    pub axis_x: i16,
    /// Left stick Y, positive pulled back.
    pub axis_y: i16,
    /// Right stick X.
    pub axis_rx: i16,
    /// Right stick Y, positive pulled back.
    pub axis_ry: i16,
    /// Stop.
    pub a: bool,
    /// Boost speed.
    pub b: bool,
    /// Slow speed.
    pub y: bool,
}

impl GamepadReport {
    /// Arcade on left-Y/right-X, tank on both Y axes, Y axes flipped so forward is positive.
    pub fn to_sample(&self) -> InputSample {
        let speed = if self.b {
            SpeedRequest::Boost
        } else if self.y {
            SpeedRequest::Slow
        } else {
            SpeedRequest::Default
        };
        InputSample {
            throttle: -normalize(self.axis_y),
            steering: normalize(self.axis_rx),
            left: -normalize(self.axis_y),
            right: -normalize(self.axis_ry),
            speed: Some(speed),
            brake: self.a,
        }
    }
}

/// Raw stick value to [-1.0, 1.0].
#[inline]
pub fn normalize(raw: i16) -> f32 {
    clamp_power(raw as f32 / AXIS_MAX as f32)
}

/// What the external gamepad driver provides.
pub trait Gamepad {
    fn is_connected(&self) -> bool;

    /// Report received since the previous call, if any.
    fn read(&mut self) -> Option<GamepadReport>;
}

/// Stand-in for boards without a gamepad bridge. Never connected.
pub struct NoGamepad;

impl Gamepad for NoGamepad {
    fn is_connected(&self) -> bool {
        false
    }

    fn read(&mut self) -> Option<GamepadReport> {
        None
    }
}

/// [`InputSource`] adapter over a [`Gamepad`].
pub struct GamepadInput<G> {
    pad: G,
}

impl<G: Gamepad> GamepadInput<G> {
    pub fn new(pad: G) -> Self {
        Self { pad }
    }

    #[inline]
    pub fn inner(&mut self) -> &mut G {
        &mut self.pad
    }
}

impl<G: Gamepad> InputSource for GamepadInput<G> {
    fn is_connected(&mut self, _now_ms: u32) -> bool {
        self.pad.is_connected()
    }

    fn poll(&mut self, _now_ms: u32) -> Option<InputSample> {
        if !self.pad.is_connected() {
            return None;
        }
        self.pad.read().map(|report| report.to_sample())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Default)]
    pub(crate) struct FakePad {
        pub connected: bool,
        pub pending: Option<GamepadReport>,
    }

    impl Gamepad for FakePad {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn read(&mut self) -> Option<GamepadReport> {
            self.pending.take()
        }
    }

    #[test]
    fn axes_are_normalized_and_y_flipped() {
        let report = GamepadReport {
            axis_y: -512,
            axis_rx: 256,
            axis_ry: 512,
            ..GamepadReport::default()
        };
        let s = report.to_sample();
        assert_eq!(s.throttle, 1.0);
        assert_eq!(s.steering, 0.5);
        assert_eq!(s.left, 1.0);
        assert_eq!(s.right, -1.0);
        assert_eq!(s.speed, Some(SpeedRequest::Default));
        assert!(!s.brake);
    }

    #[test]
    fn out_of_range_raw_is_clamped() {
        assert_eq!(normalize(i16::MIN), -1.0);
        assert_eq!(normalize(700), 1.0);
    }

    #[test]
    fn buttons_map_to_requests() {
        let boost = GamepadReport {
            b: true,
            y: true,
            ..GamepadReport::default()
        };
        assert_eq!(boost.to_sample().speed, Some(SpeedRequest::Boost));
        let slow = GamepadReport {
            y: true,
            ..GamepadReport::default()
        };
        assert_eq!(slow.to_sample().speed, Some(SpeedRequest::Slow));
        let stop = GamepadReport {
            a: true,
            ..GamepadReport::default()
        };
        assert!(stop.to_sample().brake);
    }

    #[test]
    fn poll_only_when_connected() {
        let mut input = GamepadInput::new(FakePad {
            connected: false,
            pending: Some(GamepadReport::default()),
        });
        assert_eq!(input.poll(0), None);
        input.inner().connected = true;
        assert!(input.poll(0).is_some());
        assert_eq!(input.poll(10), None);
    }

    #[test]
    fn no_gamepad_is_never_live() {
        let mut input = GamepadInput::new(NoGamepad);
        assert!(!input.is_connected(0));
        assert_eq!(input.poll(0), None);
    }
}

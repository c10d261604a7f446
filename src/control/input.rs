// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Common shape of a human input source as seen by the arbiter.

/// Speed limit requested by the operator alongside a sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpeedRequest {
    Default,
    Boost,
    Slow,
}

/// One reading from an input source. All axes are normalized to [-1.0, 1.0], positive forward
/// and right.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InputSample {
    pub throttle: f32,
    pub steering: f32,
    /// Tank-mode left side.
    pub left: f32,
    /// Tank-mode right side.
    pub right: f32,
    /// `None` leaves the speed limit untouched.
    pub speed: Option<SpeedRequest>,
    /// Operator asked for an immediate stop.
    pub brake: bool,
}

impl InputSample {
    /// Arcade-only sample with no buttons held.
    pub fn arcade(throttle: f32, steering: f32) -> Self {
        Self {
            throttle,
            steering,
            left: 0.0,
            right: 0.0,
            speed: None,
            brake: false,
        }
    }
}

/// A source the arbiter can select.
pub trait InputSource {
    /// Liveness, sampled on the arbiter's re-evaluation cadence.
    fn is_connected(&mut self, now_ms: u32) -> bool;

    /// Fresh sample since the previous poll, if any. Called every control tick while active.
    fn poll(&mut self, now_ms: u32) -> Option<InputSample>;
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Input arbiter: selects the active input source and drives the mixer every control tick.
//!
//! Source selection is re-evaluated on a slow fixed cadence ([`REEVALUATE_PERIOD_MS`]) so a
//! momentary dropout does not flap the mode. Sampling, forwarding and the deadman check run on
//! every tick, in that order, followed by the mixer update, so a stop decided in a tick reaches
//! the motors in the same tick.

use log::{info, warn};

use crate::config::{DriveMode, InputPolicy, SpeedPresets};
use crate::control::input::{InputSample, InputSource, SpeedRequest};
use crate::control::mixer::DriveMixer;
use crate::hw::clock::elapsed;
use crate::motors::DriveOutput;

/// Interval between source re-evaluations.
pub const REEVALUATE_PERIOD_MS: u32 = 500;

/// Silence on the active source after which the motors are stopped.
pub const DEADMAN_TIMEOUT_MS: u32 = 5000;

/// Active input source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Gamepad,
    Flysky,
    None,
}

/// Pick the mode for `policy` given source liveness.
pub fn select_mode(policy: InputPolicy, gamepad: bool, rc: bool) -> InputMode {
    match policy {
        InputPolicy::Auto if gamepad => InputMode::Gamepad,
        InputPolicy::Auto if rc => InputMode::Flysky,
        InputPolicy::Auto => InputMode::None,
        InputPolicy::ForceGamepad if gamepad => InputMode::Gamepad,
        InputPolicy::ForceFlysky if rc => InputMode::Flysky,
        InputPolicy::ForceGamepad | InputPolicy::ForceFlysky => InputMode::None,
    }
}

pub struct InputArbiter {
    policy: InputPolicy,
    mode: InputMode,
    presets: SpeedPresets,

    /// `None` forces a re-evaluation on the next tick.
    last_eval_ms: Option<u32>,
    last_sample_ms: u32,
    deadman_tripped: bool,

    gamepad_connected: bool,
    rc_connected: bool,
}

impl InputArbiter {
    pub fn new(policy: InputPolicy, presets: SpeedPresets) -> Self {
        Self {
            policy,
            mode: InputMode::None,
            presets,
            last_eval_ms: None,
            last_sample_ms: 0,
            deadman_tripped: false,
            gamepad_connected: false,
            rc_connected: false,
        }
    }

    /// One control tick.
    pub fn tick<O, G, R>(
        &mut self,
        now_ms: u32,
        gamepad: &mut G,
        rc: &mut R,
        mixer: &mut DriveMixer<O>,
    )
    where
        O: DriveOutput,
        G: InputSource,
        R: InputSource,
    {
        let due = match self.last_eval_ms {
            Some(last) => elapsed(last, now_ms) >= REEVALUATE_PERIOD_MS,
            None => true,
        };
        if due {
            self.reevaluate(now_ms, gamepad, rc, mixer);
        }

        let sample = match self.mode {
            InputMode::Gamepad => gamepad.poll(now_ms),
            InputMode::Flysky => rc.poll(now_ms),
            InputMode::None => None,
        };

        match sample {
            Some(sample) => self.accept(now_ms, &sample, mixer),
            None => self.check_deadman(now_ms, mixer),
        }

        mixer.update(now_ms);
    }

    /// Change the selection policy. Takes effect on the next tick.
    pub fn set_policy(&mut self, policy: InputPolicy) {
        if policy != self.policy {
            info!("input: policy {:?}", policy);
        }
        self.policy = policy;
        self.last_eval_ms = None;
    }

    #[inline]
    pub fn policy(&self) -> InputPolicy {
        self.policy
    }

    #[inline]
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    #[inline]
    pub fn deadman_tripped(&self) -> bool {
        self.deadman_tripped
    }

    /// Gamepad liveness as of the last re-evaluation.
    #[inline]
    pub fn gamepad_connected(&self) -> bool {
        self.gamepad_connected
    }

    /// RC liveness as of the last re-evaluation.
    #[inline]
    pub fn rc_connected(&self) -> bool {
        self.rc_connected
    }

    #[inline]
    pub fn presets(&self) -> SpeedPresets {
        self.presets
    }

    pub fn set_presets(&mut self, presets: SpeedPresets) {
        self.presets = presets;
    }

    fn reevaluate<O, G, R>(
        &mut self,
        now_ms: u32,
        gamepad: &mut G,
        rc: &mut R,
        mixer: &mut DriveMixer<O>,
    )
    where
        O: DriveOutput,
        G: InputSource,
        R: InputSource,
    {
        self.last_eval_ms = Some(now_ms);
        self.gamepad_connected = gamepad.is_connected(now_ms);
        self.rc_connected = rc.is_connected(now_ms);

        let previous = self.mode;
        let next = select_mode(self.policy, self.gamepad_connected, self.rc_connected);

        let previous_dropped = match previous {
            InputMode::Gamepad => !self.gamepad_connected,
            InputMode::Flysky => !self.rc_connected,
            InputMode::None => false,
        };

        if next != previous {
            info!("input: mode {:?} -> {:?}", previous, next);
            self.mode = next;
            self.last_sample_ms = now_ms;
            self.deadman_tripped = false;
        }

        if previous_dropped || (next == InputMode::None && previous != InputMode::None) {
            mixer.stop();
        }
    }

    fn accept<O: DriveOutput>(
        &mut self,
        now_ms: u32,
        sample: &InputSample,
        mixer: &mut DriveMixer<O>,
    ) {
        self.last_sample_ms = now_ms;
        if self.deadman_tripped {
            info!("input: fresh sample, deadman cleared");
            self.deadman_tripped = false;
        }

        if sample.brake {
            mixer.stop();
            return;
        }

        if let Some(request) = sample.speed {
            mixer.set_speed_limit(match request {
                SpeedRequest::Default => self.presets.default,
                SpeedRequest::Boost => self.presets.boost,
                SpeedRequest::Slow => self.presets.slow,
            });
        }

        match mixer.drive_mode() {
            DriveMode::Tank => mixer.set_drive(sample.left, sample.right),
            DriveMode::Arcade => mixer.set_arcade_drive(sample.throttle, sample.steering),
            // Never held by the mixer
            DriveMode::Racing => {}
        }
    }

    fn check_deadman<O: DriveOutput>(&mut self, now_ms: u32, mixer: &mut DriveMixer<O>) {
        if self.mode == InputMode::None || self.deadman_tripped {
            return;
        }
        if elapsed(self.last_sample_ms, now_ms) > DEADMAN_TIMEOUT_MS {
            warn!(
                "input: no {:?} input for {} ms, stopping",
                self.mode, DEADMAN_TIMEOUT_MS
            );
            mixer.stop();
            self.deadman_tripped = true;
        }
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! The robot's object graph and per-tick orchestration.
//!
//! [`Robot`] owns the mixer (and through it the motor output), both input sources, the arbiter and
//! the status LED. The firmware entry point builds one after the motor driver has been verified
//! and calls [`Robot::tick`] from its control loop.

use embedded_hal::digital::OutputPin;
use log::info;
use micromath::F32Ext;

use crate::config::{InputPolicy, SystemConfig, STATUS_PERIOD_MS};
use crate::control::{DriveMixer, InputArbiter, InputMode, InputSource};
use crate::drivers::picoborg_rev::DriverState;
use crate::hw::clock::elapsed;
use crate::hw::led::{Blinker, Led};
use crate::motors::DriveOutput;
use crate::protocol::messages::{
    Command, StatusReport, FLAG_DEADMAN, FLAG_DRIVER_FOUND, FLAG_DRIVE_FAULT, FLAG_EPO_TRIPPED,
};

/// Blink interval while the motor driver could not be verified.
pub const FATAL_BLINK_MS: u32 = 100;

/// Status LED blink interval for each input mode.
pub fn blink_interval_ms(mode: InputMode) -> u32 {
    match mode {
        InputMode::Gamepad => 1000,
        InputMode::Flysky => 250,
        InputMode::None => 100,
    }
}

/// Read-only snapshot for external consumers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Telemetry {
    pub left: f32,
    pub right: f32,
    pub mode: InputMode,
    pub policy: InputPolicy,
    pub speed_limit: f32,
    pub driver: DriverState,
    pub deadman_tripped: bool,
    pub gamepad_connected: bool,
    pub rc_connected: bool,
}

impl Telemetry {
    /// Scale to wire units for the console link.
    pub fn to_report(&self) -> StatusReport {
        let pct = |v: f32| (v * 100.0).round() as i8;
        let mut flags = 0;
        if self.driver.found {
            flags |= FLAG_DRIVER_FOUND;
        }
        if self.driver.epo_tripped {
            flags |= FLAG_EPO_TRIPPED;
        }
        if self.driver.drive_fault {
            flags |= FLAG_DRIVE_FAULT;
        }
        if self.deadman_tripped {
            flags |= FLAG_DEADMAN;
        }
        StatusReport {
            left_pct: pct(self.left),
            right_pct: pct(self.right),
            mode: match self.mode {
                InputMode::Gamepad => 0,
                InputMode::Flysky => 1,
                InputMode::None => 2,
            },
            speed_limit_pct: pct(self.speed_limit) as u8,
            flags,
        }
    }
}

pub struct Robot<O, G, R, L>
where
    O: DriveOutput,
    G: InputSource,
    R: InputSource,
    L: OutputPin,
{
    mixer: DriveMixer<O>,
    gamepad: G,
    rc: R,
    arbiter: InputArbiter,
    status_led: Blinker<L>,
    last_status_ms: u32,
}

impl<O, G, R, L> Robot<O, G, R, L>
where
    O: DriveOutput,
    G: InputSource,
    R: InputSource,
    L: OutputPin,
{
    /// Assemble the robot and push `config` into every component.
    pub fn new(mut output: O, gamepad: G, rc: R, led: Led<L>, config: &SystemConfig) -> Self {
        output.set_epo_ignore(config.epo_ignore);
        Self {
            mixer: DriveMixer::new(output, &config.drive),
            gamepad,
            rc,
            arbiter: InputArbiter::new(config.policy, config.presets),
            status_led: Blinker::new(led),
            last_status_ms: 0,
        }
    }

    /// One control-loop tick.
    pub fn tick(&mut self, now_ms: u32) {
        self.arbiter
            .tick(now_ms, &mut self.gamepad, &mut self.rc, &mut self.mixer);

        self.status_led
            .tick(now_ms, blink_interval_ms(self.arbiter.mode()));

        if elapsed(self.last_status_ms, now_ms) >= STATUS_PERIOD_MS {
            self.last_status_ms = now_ms;
            self.mixer.output_mut().refresh_status();
            self.log_status();
        }
    }

    /// Apply a console request. `GetStatus` yields the reply to send back.
    pub fn apply(&mut self, command: Command) -> Option<StatusReport> {
        info!("config: {:?}", command);
        match command {
            Command::Stop => self.mixer.stop(),
            Command::SetSpeedLimit(pct) => {
                self.mixer.set_speed_limit(pct as f32 / 100.0);
                // Keep the gamepad's default preset in step with the configured limit
                let mut presets = self.arbiter.presets();
                presets.default = self.mixer.speed_limit();
                self.arbiter.set_presets(presets);
            }
            Command::SetDeadzone(pct) => self.mixer.set_deadzone(pct as f32 / 100.0),
            Command::SetRamping(enabled) => self.mixer.set_ramping(enabled),
            Command::SetRampRate(tenths) => self.mixer.set_ramp_rate(tenths as f32 / 10.0),
            Command::SetInputPolicy(policy) => self.arbiter.set_policy(policy),
            Command::SetInvert { left, right } => {
                self.mixer.set_invert_left(left);
                self.mixer.set_invert_right(right);
            }
            Command::SetDriveMode(mode) => {
                // Rejection is logged by the mixer; the previous mode stays
                let _ = self.mixer.set_drive_mode(mode);
            }
            Command::SetEpoIgnore(ignore) => self.mixer.output_mut().set_epo_ignore(ignore),
            Command::GetStatus => return Some(self.telemetry().to_report()),
        }
        None
    }

    pub fn telemetry(&self) -> Telemetry {
        let (left, right) = self.mixer.current();
        Telemetry {
            left,
            right,
            mode: self.arbiter.mode(),
            policy: self.arbiter.policy(),
            speed_limit: self.mixer.speed_limit(),
            driver: self.mixer.output().driver_state(),
            deadman_tripped: self.arbiter.deadman_tripped(),
            gamepad_connected: self.arbiter.gamepad_connected(),
            rc_connected: self.arbiter.rc_connected(),
        }
    }

    #[inline]
    pub fn mixer(&self) -> &DriveMixer<O> {
        &self.mixer
    }

    #[inline]
    pub fn arbiter(&self) -> &InputArbiter {
        &self.arbiter
    }

    fn log_status(&self) {
        let t = self.telemetry();
        info!(
            "status: mode {:?} | gamepad {} | rc {} | L {:.2} R {:.2} | limit {:.0}%",
            t.mode,
            t.gamepad_connected,
            t.rc_connected,
            t.left,
            t.right,
            t.speed_limit * 100.0
        );
        info!(
            "status: driver {:#04x} found {} | EPO {} | fault {} | deadman {}",
            t.driver.address,
            t.driver.found,
            t.driver.epo_tripped,
            t.driver.drive_fault,
            t.deadman_tripped
        );
    }
}

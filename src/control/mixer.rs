// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Drive mixer and ramp controller.
//!
//! Turns drive intents into bounded per-side power:
//! deadzone → speed limit → inversion → (ramp) → [`DriveOutput`].
//!
//! With ramping enabled, `set_drive` only moves the target and [`DriveMixer::update`] walks the
//! applied power towards it at `ramp_rate` units per second, re-sending both sides every tick.
//! With ramping disabled the power is applied immediately. [`DriveMixer::stop`] is the only path
//! that bypasses the ramp.

use log::{debug, info, warn};
use micromath::F32Ext;

use crate::config::{DriveConfig, DriveMode};
use crate::control::ramp::{ramp_towards, step_seconds};
use crate::control::shaping::{apply_deadzone, clamp_power};
use crate::error::{Error, Result};
use crate::hw::clock::elapsed;
use crate::motors::DriveOutput;

/// Largest accepted deadzone; the band must stay strictly below 0.5.
pub const MAX_DEADZONE: f32 = 0.49;

pub const MIN_RAMP_RATE: f32 = 0.1;
pub const MAX_RAMP_RATE: f32 = 50.0;

/// Clamp to `[lo, hi]`, mapping NaN to `lo`.
#[inline]
fn clamp_setting(value: f32, lo: f32, hi: f32) -> f32 {
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

pub struct DriveMixer<O> {
    output: O,

    speed_limit: f32,
    deadzone: f32,
    ramping: bool,
    ramp_rate: f32,
    invert_left: bool,
    invert_right: bool,
    mode: DriveMode,

    current_left: f32,
    current_right: f32,
    target_left: f32,
    target_right: f32,

    /// `None` until the first `update`, so the first tick covers no time.
    last_update_ms: Option<u32>,
}

impl<O: DriveOutput> DriveMixer<O> {
    /// Create a mixer in the stopped state and apply `config` through the setters.
    pub fn new(output: O, config: &DriveConfig) -> Self {
        let mut mixer = Self {
            output,
            speed_limit: 1.0,
            deadzone: 0.0,
            ramping: true,
            ramp_rate: 3.0,
            invert_left: false,
            invert_right: false,
            mode: DriveMode::Arcade,
            current_left: 0.0,
            current_right: 0.0,
            target_left: 0.0,
            target_right: 0.0,
            last_update_ms: None,
        };
        mixer.apply_config(config);
        mixer
    }

    /// Apply every field of `config`. An unsupported drive mode is logged and skipped.
    pub fn apply_config(&mut self, config: &DriveConfig) {
        self.set_speed_limit(config.speed_limit);
        self.set_deadzone(config.deadzone);
        self.set_ramp_rate(config.ramp_rate);
        self.set_ramping(config.ramping);
        self.set_invert_left(config.invert_left);
        self.set_invert_right(config.invert_right);
        let _ = self.set_drive_mode(config.mode);
    }

    /// Direct per-side drive, each value in [-1.0, 1.0].
    pub fn set_drive(&mut self, left: f32, right: f32) {
        let left = self.shape(left, self.invert_left);
        let right = self.shape(right, self.invert_right);

        self.target_left = left;
        self.target_right = right;

        if !self.ramping {
            self.current_left = left;
            self.current_right = right;
            self.dispatch();
        }
    }

    /// Throttle plus steering, mixed into left/right with the mix ratio preserved on clipping.
    pub fn set_arcade_drive(&mut self, throttle: f32, steering: f32) {
        let throttle = apply_deadzone(clamp_power(throttle), self.deadzone);
        let steering = apply_deadzone(clamp_power(steering), self.deadzone);

        let mut left = throttle + steering;
        let mut right = throttle - steering;

        let max = left.abs().max(right.abs());
        if max > 1.0 {
            left /= max;
            right /= max;
        }

        self.set_drive(left, right);
    }

    /// Zero all power immediately and switch the driver outputs off.
    pub fn stop(&mut self) {
        self.current_left = 0.0;
        self.current_right = 0.0;
        self.target_left = 0.0;
        self.target_right = 0.0;
        self.output.all_off();
        debug!("mixer: stop");
    }

    /// Advance the ramp to `now_ms`. Call once per control tick.
    pub fn update(&mut self, now_ms: u32) {
        let dt = match self.last_update_ms.replace(now_ms) {
            Some(last) => step_seconds(elapsed(last, now_ms)),
            None => 0.0,
        };

        if !self.ramping {
            return;
        }

        let max_change = self.ramp_rate * dt;
        self.current_left = ramp_towards(self.current_left, self.target_left, max_change);
        self.current_right = ramp_towards(self.current_right, self.target_right, max_change);
        self.dispatch();
    }

    pub fn set_speed_limit(&mut self, limit: f32) {
        self.speed_limit = clamp_setting(limit, 0.0, 1.0);
    }

    pub fn set_deadzone(&mut self, deadzone: f32) {
        self.deadzone = clamp_setting(deadzone, 0.0, MAX_DEADZONE);
    }

    /// Enable or disable ramping. Disabling applies the current target at once.
    pub fn set_ramping(&mut self, enabled: bool) {
        let was = self.ramping;
        self.ramping = enabled;
        if was && !enabled {
            self.current_left = self.target_left;
            self.current_right = self.target_right;
            self.dispatch();
        }
    }

    pub fn set_ramp_rate(&mut self, rate: f32) {
        self.ramp_rate = clamp_setting(rate, MIN_RAMP_RATE, MAX_RAMP_RATE);
    }

    pub fn set_invert_left(&mut self, invert: bool) {
        self.invert_left = invert;
    }

    pub fn set_invert_right(&mut self, invert: bool) {
        self.invert_right = invert;
    }

    /// Select the mixing mode. `Racing` has no mixing and is rejected; the mode is unchanged.
    pub fn set_drive_mode(&mut self, mode: DriveMode) -> Result<()> {
        match mode {
            DriveMode::Tank | DriveMode::Arcade => {
                if mode != self.mode {
                    info!("mixer: drive mode {:?}", mode);
                }
                self.mode = mode;
                Ok(())
            }
            DriveMode::Racing => {
                warn!("mixer: {:?} drive mode is not supported", mode);
                Err(Error::UnsupportedDriveMode)
            }
        }
    }

    #[inline]
    pub fn speed_limit(&self) -> f32 {
        self.speed_limit
    }

    #[inline]
    pub fn deadzone(&self) -> f32 {
        self.deadzone
    }

    #[inline]
    pub fn ramping(&self) -> bool {
        self.ramping
    }

    #[inline]
    pub fn ramp_rate(&self) -> f32 {
        self.ramp_rate
    }

    #[inline]
    pub fn drive_mode(&self) -> DriveMode {
        self.mode
    }

    /// Power last applied, `(left, right)`.
    #[inline]
    pub fn current(&self) -> (f32, f32) {
        (self.current_left, self.current_right)
    }

    /// Power being ramped towards, `(left, right)`.
    #[inline]
    pub fn target(&self) -> (f32, f32) {
        (self.target_left, self.target_right)
    }

    /// Snapshot of the active settings.
    pub fn config(&self) -> DriveConfig {
        DriveConfig {
            speed_limit: self.speed_limit,
            deadzone: self.deadzone,
            ramping: self.ramping,
            ramp_rate: self.ramp_rate,
            invert_left: self.invert_left,
            invert_right: self.invert_right,
            mode: self.mode,
        }
    }

    #[inline]
    pub fn output(&self) -> &O {
        &self.output
    }

    #[inline]
    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    fn shape(&self, value: f32, invert: bool) -> f32 {
        let v = apply_deadzone(clamp_power(value), self.deadzone) * self.speed_limit;
        if invert {
            -v
        } else {
            v
        }
    }

    fn dispatch(&mut self) {
        self.output.set_sides(self.current_left, self.current_right);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::drivers::picoborg_rev::DriverState;

    #[derive(Default)]
    pub(crate) struct FakeOutput {
        pub sides: Vec<(f32, f32)>,
        pub offs: usize,
        pub refreshes: usize,
        pub epo_ignore: Option<bool>,
    }

    impl FakeOutput {
        pub fn last(&self) -> (f32, f32) {
            *self.sides.last().unwrap()
        }
    }

    impl DriveOutput for FakeOutput {
        fn set_sides(&mut self, left: f32, right: f32) {
            self.sides.push((left, right));
        }

        fn all_off(&mut self) {
            self.offs += 1;
        }

        fn driver_state(&self) -> DriverState {
            DriverState {
                address: 0x44,
                found: true,
                epo_tripped: false,
                drive_fault: false,
            }
        }

        fn refresh_status(&mut self) {
            self.refreshes += 1;
        }

        fn set_epo_ignore(&mut self, ignore: bool) {
            self.epo_ignore = Some(ignore);
        }
    }

    pub(crate) fn direct(speed_limit: f32) -> DriveMixer<FakeOutput> {
        let cfg = DriveConfig {
            speed_limit,
            deadzone: 0.0,
            ramping: false,
            ..DriveConfig::default()
        };
        DriveMixer::new(FakeOutput::default(), &cfg)
    }

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < 1e-5 && (a.1 - b.1).abs() < 1e-5
    }

    #[test]
    fn speed_limit_scales_direct_drive() {
        let mut m = direct(0.5);
        m.set_drive(1.0, 1.0);
        assert_eq!(m.output().last(), (0.5, 0.5));
        assert_eq!(m.current(), (0.5, 0.5));
    }

    #[test]
    fn arcade_clipping_preserves_ratio() {
        let mut m = direct(1.0);
        m.set_arcade_drive(0.8, 0.8);
        assert!(close(m.output().last(), (1.0, 0.0)));

        m.set_arcade_drive(0.5, 0.5);
        assert!(close(m.output().last(), (1.0, 0.0)));

        m.set_arcade_drive(1.0, 0.5);
        assert!(close(m.output().last(), (1.0, 0.5 / 1.5)));

        m.set_arcade_drive(-0.6, 0.9);
        assert!(close(m.output().last(), (0.3 / 1.5, -1.0)));
    }

    #[test]
    fn inputs_beyond_range_are_clamped() {
        let mut m = direct(1.0);
        m.set_drive(3.0, -f32::INFINITY);
        assert_eq!(m.output().last(), (1.0, -1.0));
        m.set_drive(f32::NAN, 0.25);
        assert_eq!(m.output().last(), (0.0, 0.25));
    }

    #[test]
    fn deadzone_then_limit_then_invert() {
        let cfg = DriveConfig {
            speed_limit: 0.5,
            deadzone: 0.2,
            ramping: false,
            invert_right: true,
            ..DriveConfig::default()
        };
        let mut m = DriveMixer::new(FakeOutput::default(), &cfg);
        m.set_drive(0.6, 0.6);
        assert!(close(m.output().last(), (0.25, -0.25)));
        m.set_drive(0.1, -0.1);
        assert_eq!(m.output().last(), (0.0, 0.0));
    }

    #[test]
    fn ramp_walks_to_target_and_resends_each_tick() {
        let cfg = DriveConfig {
            speed_limit: 1.0,
            deadzone: 0.0,
            ramping: true,
            ramp_rate: 3.0,
            ..DriveConfig::default()
        };
        let mut m = DriveMixer::new(FakeOutput::default(), &cfg);
        m.set_drive(1.0, -1.0);
        assert!(m.output().sides.is_empty());

        m.update(1000);
        assert_eq!(m.current(), (0.0, 0.0));
        m.update(1100);
        assert!(close(m.current(), (0.3, -0.3)));
        // Stalled loop: the step is capped at 100 ms
        m.update(5000);
        assert!(close(m.current(), (0.6, -0.6)));
        m.update(5100);
        m.update(5200);
        assert_eq!(m.current(), (1.0, -1.0));

        m.update(5210);
        m.update(5220);
        assert_eq!(m.output().sides.len(), 7);
        assert_eq!(m.output().last(), (1.0, -1.0));
    }

    #[test]
    fn ramp_gap_never_grows() {
        let mut m = DriveMixer::new(
            FakeOutput::default(),
            &DriveConfig {
                deadzone: 0.0,
                speed_limit: 1.0,
                ..DriveConfig::default()
            },
        );
        m.set_drive(-0.9, 0.4);
        let mut gap = 0.9f32;
        let mut now = 0;
        m.update(now);
        for _ in 0..100 {
            now += 7;
            m.update(now);
            let g = (m.target().0 - m.current().0).abs();
            assert!(g <= gap);
            assert!(gap - g <= 3.0 * 0.007 + 1e-5);
            gap = g;
        }
        assert_eq!(m.current(), m.target());
    }

    #[test]
    fn stop_bypasses_ramp() {
        let mut m = DriveMixer::new(FakeOutput::default(), &DriveConfig::default());
        m.set_drive(1.0, 1.0);
        m.update(0);
        m.update(50);
        m.stop();
        assert_eq!(m.current(), (0.0, 0.0));
        assert_eq!(m.target(), (0.0, 0.0));
        assert_eq!(m.output().offs, 1);
    }

    #[test]
    fn disabling_ramping_snaps_to_target() {
        let mut m = DriveMixer::new(
            FakeOutput::default(),
            &DriveConfig {
                deadzone: 0.0,
                speed_limit: 1.0,
                ..DriveConfig::default()
            },
        );
        m.set_drive(0.8, 0.2);
        m.set_ramping(false);
        assert_eq!(m.current(), (0.8, 0.2));
        assert_eq!(m.output().last(), (0.8, 0.2));

        // Without ramping, update does not dispatch
        let n = m.output().sides.len();
        m.update(10);
        m.update(20);
        assert_eq!(m.output().sides.len(), n);
    }

    #[test]
    fn setters_clamp() {
        let mut m = direct(1.0);
        m.set_speed_limit(1.4);
        assert_eq!(m.speed_limit(), 1.0);
        m.set_speed_limit(-0.1);
        assert_eq!(m.speed_limit(), 0.0);
        m.set_speed_limit(f32::NAN);
        assert_eq!(m.speed_limit(), 0.0);
        m.set_deadzone(0.7);
        assert_eq!(m.deadzone(), MAX_DEADZONE);
        m.set_ramp_rate(0.0);
        assert_eq!(m.ramp_rate(), MIN_RAMP_RATE);
        m.set_ramp_rate(1000.0);
        assert_eq!(m.ramp_rate(), MAX_RAMP_RATE);
    }

    #[test]
    fn racing_mode_is_rejected() {
        let mut m = direct(1.0);
        assert_eq!(m.set_drive_mode(DriveMode::Tank), Ok(()));
        assert_eq!(
            m.set_drive_mode(DriveMode::Racing),
            Err(Error::UnsupportedDriveMode)
        );
        assert_eq!(m.drive_mode(), DriveMode::Tank);
    }
}

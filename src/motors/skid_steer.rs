// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Chassis wiring of the two drive motors onto the PicoBorg Reverse.
//!
//! The right motor is on channel B with its natural polarity. The left motor is on channel A and is
//! mounted mirrored, so its power is negated before it reaches the board.

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::drivers::picoborg_rev::{Channel, DriverState, PicoBorgRev};
use crate::motors::DriveOutput;

pub const LEFT_CHANNEL: Channel = Channel::A;
pub const RIGHT_CHANNEL: Channel = Channel::B;

/// Left/right drive built on a [`PicoBorgRev`].
pub struct SkidSteer<I2C, D> {
    driver: PicoBorgRev<I2C, D>,
}

impl<I2C, D> SkidSteer<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(driver: PicoBorgRev<I2C, D>) -> Self {
        Self { driver }
    }

    /// Access the underlying motor driver.
    #[inline]
    pub fn driver(&mut self) -> &mut PicoBorgRev<I2C, D> {
        &mut self.driver
    }

    pub fn free(self) -> PicoBorgRev<I2C, D> {
        self.driver
    }
}

impl<I2C, D> DriveOutput for SkidSteer<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn set_sides(&mut self, left: f32, right: f32) {
        self.driver.set_motor_power(RIGHT_CHANNEL, right);
        self.driver.set_motor_power(LEFT_CHANNEL, -left);
    }

    fn all_off(&mut self) {
        self.driver.motors_off();
    }

    fn driver_state(&self) -> DriverState {
        self.driver.state()
    }

    fn refresh_status(&mut self) {
        // Stale flags stay cached on failure; the driver has already logged it
        let _ = self.driver.refresh_status();
    }

    fn set_epo_ignore(&mut self, ignore: bool) {
        self.driver.set_epo_ignore(ignore);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::picoborg_rev::{cmd, tests::started};

    #[test]
    fn left_side_is_negated_on_channel_a() {
        let mut drive = SkidSteer::new(started());
        drive.set_sides(0.5, 0.5);
        assert_eq!(
            drive.free().free().0.writes,
            vec![[cmd::SET_B_FWD, 128], [cmd::SET_A_REV, 128]]
        );
    }

    #[test]
    fn reverse_left_drives_channel_a_forward() {
        let mut drive = SkidSteer::new(started());
        drive.set_sides(-1.0, 0.0);
        drive.all_off();
        let chip = drive.free().free().0;
        assert_eq!(
            chip.writes,
            vec![[cmd::SET_B_FWD, 0], [cmd::SET_A_FWD, 255], [cmd::ALL_OFF, 0]]
        );
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! PiBorg PicoBorg Reverse dual H-bridge, driven over I2C.
//!
//! This module handles command framing and register access for the board. Every write is a single
//! `[command, value]` transmission. Every read writes the command byte with a repeated start (bus
//! held) and reads back a fixed four-byte frame whose first byte must echo the command.
//!
//! Writes are best-effort: a failed write is logged and counted in [`BusDiagnostics`], never
//! retried and never returned, because the control loop resends the full motor state on the next
//! tick. Reads are retried a bounded number of times and return a [`Result`].
//!
//! Until [`PicoBorgRev::begin`] has positively identified the chip, every command is a no-op and
//! every query returns [`Error::DeviceNotFound`].

use embedded_hal::{delay::DelayNs, i2c::I2c};
use log::{debug, error, info, warn};
use micromath::F32Ext;

use crate::drivers::retry::with_retries;
use crate::error::{Error, Result};

/// Factory I2C address of the board.
pub const DEFAULT_ADDRESS: u8 = 0x44;

/// Identity byte returned by `GET_ID`.
pub const DEVICE_ID: u8 = 0x15;

/// Length of every read frame, echo byte included.
pub const READ_LEN: usize = 4;

/// Full-scale PWM value.
pub const PWM_MAX: u8 = 255;

/// Attempts per read before giving up.
pub const READ_ATTEMPTS: u8 = 3;

/// Pause between read attempts.
pub const RETRY_DELAY_MS: u32 = 5;

// Command codes
pub mod cmd {
    pub const SET_LED: u8 = 1;
    pub const GET_LED: u8 = 2;
    pub const SET_A_FWD: u8 = 3;
    pub const SET_A_REV: u8 = 4;
    pub const GET_A: u8 = 5;
    pub const SET_B_FWD: u8 = 6;
    pub const SET_B_REV: u8 = 7;
    pub const GET_B: u8 = 8;
    pub const ALL_OFF: u8 = 9;
    pub const RESET_EPO: u8 = 10;
    pub const GET_EPO: u8 = 11;
    pub const SET_EPO_IGNORE: u8 = 12;
    pub const GET_EPO_IGNORE: u8 = 13;
    pub const GET_DRIVE_FAULT: u8 = 14;
    pub const SET_ALL_FWD: u8 = 15;
    pub const SET_ALL_REV: u8 = 16;
    pub const SET_FAILSAFE: u8 = 17;
    pub const GET_FAILSAFE: u8 = 18;
    pub const GET_ID: u8 = 0x99;
}

// Command values
pub const VALUE_FWD: u8 = 1;
pub const VALUE_REV: u8 = 2;
pub const VALUE_ON: u8 = 1;
pub const VALUE_OFF: u8 = 0;

/// Clamp a power request to [-1.0, 1.0]. NaN maps to 0.0.
#[inline]
pub fn clamp_power(power: f32) -> f32 {
    if power.is_nan() {
        0.0
    } else {
        power.clamp(-1.0, 1.0)
    }
}

/// Output channel on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    A,
    B,
    Both,
}

/// Drive direction as encoded by the command byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// A signed power value translated to the board's wire format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PowerCommand {
    pub direction: Direction,
    pub magnitude: u8,
}

impl PowerCommand {
    /// Clamp `power`, pick the direction by sign and scale the magnitude to 0..=255.
    pub fn from_power(power: f32) -> Self {
        let power = clamp_power(power);
        let direction = if power < 0.0 {
            Direction::Reverse
        } else {
            Direction::Forward
        };
        let magnitude = (power.abs() * PWM_MAX as f32).round() as u8;
        Self {
            direction,
            magnitude,
        }
    }

    /// Command byte for this direction on `channel`.
    pub fn opcode(&self, channel: Channel) -> u8 {
        match (channel, self.direction) {
            (Channel::A, Direction::Forward) => cmd::SET_A_FWD,
            (Channel::A, Direction::Reverse) => cmd::SET_A_REV,
            (Channel::B, Direction::Forward) => cmd::SET_B_FWD,
            (Channel::B, Direction::Reverse) => cmd::SET_B_REV,
            (Channel::Both, Direction::Forward) => cmd::SET_ALL_FWD,
            (Channel::Both, Direction::Reverse) => cmd::SET_ALL_REV,
        }
    }
}

/// Identity and last-known safety flags of the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DriverState {
    pub address: u8,
    pub found: bool,
    pub epo_tripped: bool,
    pub drive_fault: bool,
}

/// Counters for bus failures that were swallowed or surfaced as stale data.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BusDiagnostics {
    pub write_failures: u32,
    pub read_failures: u32,
    pub last_error: Option<Error>,
}

/// PicoBorg Reverse driver owning its I2C bus and a delay source for read back-off.
pub struct PicoBorgRev<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    found: bool,
    epo_tripped: bool,
    drive_fault: bool,
    diag: BusDiagnostics,
}

impl<I2C, D> PicoBorgRev<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Driver at the factory address.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    /// Driver at a custom (re-flashed) address.
    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            found: false,
            epo_tripped: false,
            drive_fault: false,
            diag: BusDiagnostics::default(),
        }
    }

    /// Release the bus and delay source.
    pub fn free(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Probe the board and bring it into a known safe state.
    ///
    /// On a matching identity: disables the comms failsafe, clears any EPO latch left from a
    /// previous session and switches both outputs off. Any failure leaves the driver not-found.
    pub fn begin(&mut self) -> Result<()> {
        info!("PBR: probing motor driver at {:#04x}", self.address);
        self.found = false;

        let frame = match self.query_raw(cmd::GET_ID) {
            Ok(frame) => frame,
            Err(e) => {
                error!("PBR: no response from {:#04x}: {}", self.address, e);
                return Err(e);
            }
        };

        if frame[1] != DEVICE_ID {
            error!(
                "PBR: device at {:#04x} is not a PicoBorg Reverse (id {:#04x})",
                self.address, frame[1]
            );
            return Err(Error::ProtocolMismatch {
                expected: DEVICE_ID,
                got: frame[1],
            });
        }

        self.found = true;
        self.set_comms_failsafe(false);
        self.reset_epo();
        self.motors_off();

        info!("PBR: found PicoBorg Reverse at {:#04x}", self.address);
        Ok(())
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.found
    }

    #[inline]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Identity plus the cached EPO and fault flags.
    pub fn state(&self) -> DriverState {
        DriverState {
            address: self.address,
            found: self.found,
            epo_tripped: self.epo_tripped,
            drive_fault: self.drive_fault,
        }
    }

    #[inline]
    pub fn diagnostics(&self) -> BusDiagnostics {
        self.diag
    }

    /// Command `power` in [-1.0, 1.0] on `channel`. Out-of-range values are clamped.
    pub fn set_motor_power(&mut self, channel: Channel, power: f32) {
        if !self.found {
            return;
        }
        let command = PowerCommand::from_power(power);
        let _ = self.send(command.opcode(channel), command.magnitude);
    }

    /// Switch both outputs off.
    pub fn motors_off(&mut self) {
        if !self.found {
            return;
        }
        let _ = self.send(cmd::ALL_OFF, 0);
    }

    pub fn set_led(&mut self, on: bool) {
        if !self.found {
            return;
        }
        let _ = self.send(cmd::SET_LED, on_off(on));
    }

    pub fn led(&mut self) -> Result<bool> {
        Ok(self.query(cmd::GET_LED)?[1] == VALUE_ON)
    }

    /// Clear the EPO latch.
    pub fn reset_epo(&mut self) {
        if !self.found {
            return;
        }
        if self.send(cmd::RESET_EPO, 0).is_ok() {
            self.epo_tripped = false;
        }
    }

    /// Read the EPO latch, refreshing the cached flag on success.
    pub fn epo(&mut self) -> Result<bool> {
        let tripped = self.query(cmd::GET_EPO)?[1] == VALUE_ON;
        self.epo_tripped = tripped;
        Ok(tripped)
    }

    /// Tell the board whether to ignore the EPO input. Applied in hardware, not emulated.
    pub fn set_epo_ignore(&mut self, ignore: bool) {
        if !self.found {
            return;
        }
        let _ = self.send(cmd::SET_EPO_IGNORE, on_off(ignore));
    }

    pub fn epo_ignore(&mut self) -> Result<bool> {
        Ok(self.query(cmd::GET_EPO_IGNORE)?[1] == VALUE_ON)
    }

    /// Read the drive-fault flag, refreshing the cached flag on success.
    pub fn drive_fault(&mut self) -> Result<bool> {
        let fault = self.query(cmd::GET_DRIVE_FAULT)?[1] == VALUE_ON;
        self.drive_fault = fault;
        Ok(fault)
    }

    /// Enable or disable the board's own comms-loss failsafe.
    pub fn set_comms_failsafe(&mut self, enabled: bool) {
        if !self.found {
            return;
        }
        let _ = self.send(cmd::SET_FAILSAFE, on_off(enabled));
    }

    pub fn comms_failsafe(&mut self) -> Result<bool> {
        Ok(self.query(cmd::GET_FAILSAFE)?[1] == VALUE_ON)
    }

    /// Identity byte as reported by the board.
    pub fn identity(&mut self) -> Result<u8> {
        Ok(self.query(cmd::GET_ID)?[1])
    }

    /// Power currently applied on channel A, as reported by the board.
    pub fn motor_a_power(&mut self) -> Result<f32> {
        self.read_power(cmd::GET_A)
    }

    /// Power currently applied on channel B, as reported by the board.
    pub fn motor_b_power(&mut self) -> Result<f32> {
        self.read_power(cmd::GET_B)
    }

    /// Re-read the EPO and drive-fault flags. Cached values are kept on failure.
    pub fn refresh_status(&mut self) -> Result<()> {
        self.epo()?;
        self.drive_fault()?;
        Ok(())
    }

    /// Log a one-shot status report.
    pub fn log_status(&mut self) {
        info!("=== PicoBorg Reverse Status ===");
        info!(
            "Connected: {} | Address: {:#04x}",
            if self.found { "Yes" } else { "No" },
            self.address
        );
        if self.found {
            let led = self.led();
            let epo = self.epo();
            let fault = self.drive_fault();
            info!("LED: {:?} | EPO tripped: {:?} | Drive fault: {:?}", led, epo, fault);
        }
    }

    fn read_power(&mut self, command: u8) -> Result<f32> {
        let frame = self.query(command)?;
        let magnitude = frame[2] as f32 / PWM_MAX as f32;
        Ok(if frame[1] == VALUE_REV {
            -magnitude
        } else {
            magnitude
        })
    }

    /// Single `[command, value]` transmission. Failures are logged and counted.
    fn send(&mut self, command: u8, value: u8) -> Result<()> {
        match self.i2c.write(self.address, &[command, value]) {
            Ok(()) => Ok(()),
            Err(e) => {
                let e = Error::transport(e);
                warn!("PBR: write error {} for command {:#04x}", e, command);
                self.diag.write_failures = self.diag.write_failures.wrapping_add(1);
                self.diag.last_error = Some(e);
                Err(e)
            }
        }
    }

    fn query(&mut self, command: u8) -> Result<[u8; READ_LEN]> {
        if !self.found {
            return Err(Error::DeviceNotFound);
        }
        self.query_raw(command)
    }

    /// Repeated-start read of one frame, retried on transport error or echo mismatch.
    fn query_raw(&mut self, command: u8) -> Result<[u8; READ_LEN]> {
        let address = self.address;
        let i2c = &mut self.i2c;
        let delay = &mut self.delay;

        let result = with_retries(
            READ_ATTEMPTS,
            |attempt| {
                read_frame(i2c, address, command).map_err(|e| {
                    debug!(
                        "PBR: read {:#04x} attempt {} failed: {}",
                        command,
                        attempt + 1,
                        e
                    );
                    e
                })
            },
            || delay.delay_ms(RETRY_DELAY_MS),
        );

        if let Err(e) = result {
            warn!("PBR: read {:#04x} failed after retries: {}", command, e);
            self.diag.read_failures = self.diag.read_failures.wrapping_add(1);
            self.diag.last_error = Some(e);
        }
        result
    }
}

fn read_frame<I2C: I2c>(i2c: &mut I2C, address: u8, command: u8) -> Result<[u8; READ_LEN]> {
    let mut frame = [0u8; READ_LEN];
    i2c.write_read(address, &[command], &mut frame)
        .map_err(Error::transport)?;
    if frame[0] != command {
        return Err(Error::ProtocolMismatch {
            expected: command,
            got: frame[0],
        });
    }
    Ok(frame)
}

#[inline]
fn on_off(on: bool) -> u8 {
    if on {
        VALUE_ON
    } else {
        VALUE_OFF
    }
}

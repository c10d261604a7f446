// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Configuration and telemetry messages exchanged over the console link.
//!
//! Frame: `[START_BYTE][id][payload?][checksum]`, checksum being the wrapping sum of id and
//! payload. Every request carries zero or one payload byte.

use crate::config::{DriveMode, InputPolicy};

/// Sync byte for the protocol.
pub const START_BYTE: u8 = 0xA5;

// Request IDs
pub const MSG_STOP: u8 = 0x10;
pub const MSG_SET_SPEED_LIMIT: u8 = 0x11;
pub const MSG_SET_DEADZONE: u8 = 0x12;
pub const MSG_SET_RAMPING: u8 = 0x13;
pub const MSG_SET_RAMP_RATE: u8 = 0x14;
pub const MSG_SET_INPUT_POLICY: u8 = 0x15;
pub const MSG_SET_INVERT: u8 = 0x16;
pub const MSG_SET_DRIVE_MODE: u8 = 0x17;
pub const MSG_SET_EPO_IGNORE: u8 = 0x18;
pub const MSG_GET_STATUS: u8 = 0x20;

// Reply IDs
pub const MSG_STATUS: u8 = 0x21;

// Status flags
pub const FLAG_DRIVER_FOUND: u8 = 1 << 0;
pub const FLAG_EPO_TRIPPED: u8 = 1 << 1;
pub const FLAG_DRIVE_FAULT: u8 = 1 << 2;
pub const FLAG_DEADMAN: u8 = 1 << 3;

/// Length of an encoded status reply.
pub const STATUS_FRAME_LEN: usize = 8;

/// Requests accepted by the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stop,
    /// Percent, clamped to 0..=100 by the mixer.
    SetSpeedLimit(u8),
    /// Percent.
    SetDeadzone(u8),
    SetRamping(bool),
    /// Tenths of a power unit per second.
    SetRampRate(u8),
    SetInputPolicy(InputPolicy),
    SetInvert { left: bool, right: bool },
    SetDriveMode(DriveMode),
    SetEpoIgnore(bool),
    GetStatus,
}

/// Payload length for a request id, or `None` if the id is unknown.
pub fn payload_len(id: u8) -> Option<usize> {
    match id {
        MSG_STOP | MSG_GET_STATUS => Some(0),
        MSG_SET_SPEED_LIMIT | MSG_SET_DEADZONE | MSG_SET_RAMPING | MSG_SET_RAMP_RATE
        | MSG_SET_INPUT_POLICY | MSG_SET_INVERT | MSG_SET_DRIVE_MODE | MSG_SET_EPO_IGNORE => {
            Some(1)
        }
        _ => None,
    }
}

impl Command {
    /// Build a command from a checked frame. Unknown enum codes yield `None`.
    pub fn decode(id: u8, payload: u8) -> Option<Self> {
        let cmd = match id {
            MSG_STOP => Command::Stop,
            MSG_SET_SPEED_LIMIT => Command::SetSpeedLimit(payload),
            MSG_SET_DEADZONE => Command::SetDeadzone(payload),
            MSG_SET_RAMPING => Command::SetRamping(payload != 0),
            MSG_SET_RAMP_RATE => Command::SetRampRate(payload),
            MSG_SET_INPUT_POLICY => Command::SetInputPolicy(InputPolicy::from_code(payload)?),
            MSG_SET_INVERT => Command::SetInvert {
                left: payload & 0b01 != 0,
                right: payload & 0b10 != 0,
            },
            MSG_SET_DRIVE_MODE => Command::SetDriveMode(DriveMode::from_code(payload)?),
            MSG_SET_EPO_IGNORE => Command::SetEpoIgnore(payload != 0),
            MSG_GET_STATUS => Command::GetStatus,
            _ => return None,
        };
        Some(cmd)
    }
}

/// Status reply payload, already scaled to wire units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub left_pct: i8,
    pub right_pct: i8,
    /// 0 gamepad, 1 RC, 2 none.
    pub mode: u8,
    pub speed_limit_pct: u8,
    pub flags: u8,
}

impl StatusReport {
    pub fn encode(&self) -> [u8; STATUS_FRAME_LEN] {
        let payload = [
            self.left_pct as u8,
            self.right_pct as u8,
            self.mode,
            self.speed_limit_pct,
            self.flags,
        ];
        let checksum = payload
            .iter()
            .fold(MSG_STATUS, |sum, &b| sum.wrapping_add(b));

        let mut frame = [0u8; STATUS_FRAME_LEN];
        frame[0] = START_BYTE;
        frame[1] = MSG_STATUS;
        frame[2..7].copy_from_slice(&payload);
        frame[7] = checksum;
        frame
    }
}

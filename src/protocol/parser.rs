// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Message parser for the console configuration protocol.
//!
//! This module parses incoming request frames byte by byte and converts them into [`Command`]s
//! for the robot.

use crate::protocol::messages::*;

enum State {
    WaitStart,
    WaitId,
    WaitPayload { id: u8 },
    WaitChecksum { id: u8, payload: u8 },
}

pub struct Parser {
    state: State,
    checksum: u8,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::WaitStart,
            checksum: 0,
        }
    }

    /// Process a single incoming byte. Returns `Some(Command)` if a complete packet is received.
    pub fn push(&mut self, byte: u8) -> Option<Command> {
        match self.state {
            State::WaitStart => {
                if byte == START_BYTE {
                    self.state = State::WaitId;
                    self.checksum = 0;
                }
            }
            State::WaitId => {
                self.checksum = self.checksum.wrapping_add(byte);

                self.state = match payload_len(byte) {
                    Some(0) => State::WaitChecksum {
                        id: byte,
                        payload: 0,
                    },
                    Some(_) => State::WaitPayload { id: byte },
                    // Unknown message ID, reset state
                    None => State::WaitStart,
                };
            }
            State::WaitPayload { id } => {
                self.checksum = self.checksum.wrapping_add(byte);
                self.state = State::WaitChecksum { id, payload: byte };
            }
            State::WaitChecksum { id, payload } => {
                let valid = byte == self.checksum;
                self.state = State::WaitStart;

                if valid {
                    return Command::decode(id, payload);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputPolicy;

    fn frame(id: u8, payload: &[u8]) -> Vec<u8> {
        let sum = payload.iter().fold(id, |s, &b| s.wrapping_add(b));
        let mut out = vec![START_BYTE, id];
        out.extend_from_slice(payload);
        out.push(sum);
        out
    }

    fn feed(parser: &mut Parser, bytes: &[u8]) -> Vec<Command> {
        bytes.iter().filter_map(|&b| parser.push(b)).collect()
    }

    #[test]
    fn parses_requests_with_and_without_payload() {
        let mut p = Parser::new();
        let mut bytes = frame(MSG_STOP, &[]);
        bytes.extend(frame(MSG_SET_SPEED_LIMIT, &[55]));
        bytes.extend(frame(MSG_SET_INPUT_POLICY, &[2]));
        bytes.extend(frame(MSG_GET_STATUS, &[]));
        assert_eq!(
            feed(&mut p, &bytes),
            vec![
                Command::Stop,
                Command::SetSpeedLimit(55),
                Command::SetInputPolicy(InputPolicy::ForceFlysky),
                Command::GetStatus
            ]
        );
    }

    #[test]
    fn bad_checksum_is_dropped() {
        let mut p = Parser::new();
        let mut bytes = frame(MSG_SET_RAMPING, &[1]);
        *bytes.last_mut().unwrap() ^= 0xFF;
        bytes.extend(frame(MSG_SET_RAMPING, &[0]));
        assert_eq!(feed(&mut p, &bytes), vec![Command::SetRamping(false)]);
    }

    #[test]
    fn resyncs_after_garbage_and_unknown_ids() {
        let mut p = Parser::new();
        let mut bytes = vec![0x00, 0x13, START_BYTE, 0x7E];
        bytes.extend(frame(MSG_SET_RAMP_RATE, &[30]));
        assert_eq!(feed(&mut p, &bytes), vec![Command::SetRampRate(30)]);
    }

    #[test]
    fn invalid_enum_payload_is_dropped() {
        let mut p = Parser::new();
        let mut bytes = frame(MSG_SET_DRIVE_MODE, &[9]);
        bytes.extend(frame(MSG_SET_EPO_IGNORE, &[1]));
        assert_eq!(feed(&mut p, &bytes), vec![Command::SetEpoIgnore(true)]);
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Error types shared by the drive core.
//!
//! Motor writes never surface these to the control loop; they are counted and logged by the
//! driver. Reads and start-up checks return them so call sites must handle the failure path.

use embedded_hal::i2c::ErrorKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Bus-level failure reported by the I2C peripheral (NACK, arbitration loss, ...).
    #[error("bus transport error: {0:?}")]
    Transport(ErrorKind),

    /// The device answered, but not with what was expected (command echo or identity byte).
    #[error("protocol mismatch: expected {expected:#04x}, got {got:#04x}")]
    ProtocolMismatch { expected: u8, got: u8 },

    /// A bounded wait expired (pulse edge, pulse width).
    #[error("timed out")]
    Timeout,

    /// No live samples from an input source.
    #[error("input source disconnected")]
    Disconnected,

    /// The motor driver was never positively identified; the call was not sent.
    #[error("motor driver not found")]
    DeviceNotFound,

    /// A pulse was measured but lies outside the valid 1000–2000 µs window.
    #[error("pulse width {0} us out of range")]
    PulseOutOfRange(u16),

    /// The requested drive mode has no mixing implementation.
    #[error("drive mode not supported")]
    UnsupportedDriveMode,
}

impl Error {
    /// Wrap any `embedded-hal` I2C error.
    pub fn transport<E: embedded_hal::i2c::Error>(e: E) -> Self {
        Error::Transport(e.kind())
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::NoAcknowledgeSource;

    #[test]
    fn transport_keeps_error_kind() {
        let e = Error::transport(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        assert_eq!(
            e,
            Error::Transport(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        );
    }
}

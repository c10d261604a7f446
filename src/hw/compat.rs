// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Adapters from the HAL's `embedded-hal` 0.2 peripherals to the 1.0 traits used by the drivers.
//!
//! The HAL reports its own error enums; drivers only need the [`ErrorKind`], and every HAL error
//! is reported as `Other` after being logged at debug level.

use core::fmt::Debug;

use embedded_hal::digital;
use embedded_hal::i2c::{self, ErrorKind, Operation};
use embedded_hal_02::blocking::i2c::{Write, WriteRead};
use embedded_hal_02::digital::v2;
use log::debug;

/// HAL error carried as an `embedded-hal` 1.0 error kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LegacyError(ErrorKind);

impl i2c::Error for LegacyError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Error of a wrapped GPIO pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PinError;

impl digital::Error for PinError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

/// Blocking I2C bus (write and write-read with repeated start).
pub struct LegacyI2c<T> {
    bus: T,
}

impl<T> LegacyI2c<T> {
    pub fn new(bus: T) -> Self {
        Self { bus }
    }

    pub fn free(self) -> T {
        self.bus
    }
}

impl<T, E> i2c::ErrorType for LegacyI2c<T>
where
    T: Write<Error = E> + WriteRead<Error = E>,
    E: Debug,
{
    type Error = LegacyError;
}

impl<T, E> i2c::I2c for LegacyI2c<T>
where
    T: Write<Error = E> + WriteRead<Error = E>,
    E: Debug,
{
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let result = match operations {
            [Operation::Write(bytes)] => self.bus.write(address, bytes),
            [Operation::Write(bytes), Operation::Read(buf)] => {
                self.bus.write_read(address, bytes, buf)
            }
            // Only the shapes the drivers issue are supported
            _ => return Err(LegacyError(ErrorKind::Other)),
        };
        result.map_err(|e| {
            debug!("i2c: {:#04x} {:?}", address, e);
            LegacyError(ErrorKind::Other)
        })
    }
}

/// Push-pull output pin.
pub struct LegacyOutput<P> {
    pin: P,
}

impl<P> LegacyOutput<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: v2::OutputPin> digital::ErrorType for LegacyOutput<P> {
    type Error = PinError;
}

impl<P: v2::OutputPin> digital::OutputPin for LegacyOutput<P> {
    fn set_low(&mut self) -> Result<(), PinError> {
        self.pin.set_low().map_err(|_| PinError)
    }

    fn set_high(&mut self) -> Result<(), PinError> {
        self.pin.set_high().map_err(|_| PinError)
    }
}

/// Floating input pin.
pub struct LegacyInput<P> {
    pin: P,
}

impl<P> LegacyInput<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: v2::InputPin> digital::ErrorType for LegacyInput<P> {
    type Error = PinError;
}

impl<P: v2::InputPin> digital::InputPin for LegacyInput<P> {
    fn is_high(&mut self) -> Result<bool, PinError> {
        self.pin.is_high().map_err(|_| PinError)
    }

    fn is_low(&mut self) -> Result<bool, PinError> {
        self.pin.is_low().map_err(|_| PinError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{InputPin as _, OutputPin as _};
    use embedded_hal::i2c::{Error as _, I2c as _};

    #[derive(Default)]
    struct OldBus {
        writes: Vec<(u8, Vec<u8>)>,
        fail: bool,
    }

    impl Write for OldBus {
        type Error = &'static str;

        fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err("nack");
            }
            self.writes.push((address, bytes.to_vec()));
            Ok(())
        }
    }

    impl WriteRead for OldBus {
        type Error = &'static str;

        fn write_read(
            &mut self,
            _address: u8,
            bytes: &[u8],
            buffer: &mut [u8],
        ) -> Result<(), Self::Error> {
            if self.fail {
                return Err("nack");
            }
            buffer.fill(bytes[0]);
            Ok(())
        }
    }

    #[test]
    fn i2c_shapes_are_forwarded() {
        let mut bus = LegacyI2c::new(OldBus::default());
        bus.write(0x44, &[9, 0]).unwrap();
        let mut buf = [0u8; 4];
        bus.write_read(0x44, &[0x99], &mut buf).unwrap();
        assert_eq!(buf, [0x99; 4]);
        assert_eq!(bus.free().writes, vec![(0x44, vec![9, 0])]);
    }

    #[test]
    fn i2c_errors_become_other() {
        let mut bus = LegacyI2c::new(OldBus {
            fail: true,
            ..OldBus::default()
        });
        let e = bus.write(0x44, &[1, 1]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Other);

        let mut buf = [0u8; 2];
        let mut bus = LegacyI2c::new(OldBus::default());
        assert!(bus.read(0x44, &mut buf).is_err());
    }

    struct OldPin(bool);

    impl v2::OutputPin for OldPin {
        type Error = ();

        fn set_low(&mut self) -> Result<(), ()> {
            self.0 = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), ()> {
            self.0 = true;
            Ok(())
        }
    }

    impl v2::InputPin for OldPin {
        type Error = ();

        fn is_high(&self) -> Result<bool, ()> {
            Ok(self.0)
        }

        fn is_low(&self) -> Result<bool, ()> {
            Ok(!self.0)
        }
    }

    #[test]
    fn pins_are_forwarded() {
        let mut out = LegacyOutput::new(OldPin(false));
        out.set_high().unwrap();
        let mut input = LegacyInput::new(out.free());
        assert!(input.is_high().unwrap());
        assert!(!input.is_low().unwrap());
    }
}

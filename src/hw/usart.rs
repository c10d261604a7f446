// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART console: blocking transmit, polled receive and a `log` backend.
//!
//! Note: When using `writeln!`, be sure to include `\r` (CR) in the format string to ensure correct
//! line endings on the terminal.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```
//!
//! To close the debug terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use core::cell::RefCell;
use core::fmt::{self, Write as _};

use critical_section::Mutex;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use nb::block;
use stm32f7xx_hal::{
    pac::USART1,
    prelude::*,
    serial::{Instance, Pins, Rx, Serial, Tx},
};

pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

/// Receive half of the console.
pub struct UsartRx<U: Instance> {
    rx: Rx<U>,
}

impl<U: Instance> Usart<U> {
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> (Self, UsartRx<U>) {
        let (tx, rx) = serial.split();
        (Self { tx }, UsartRx { rx })
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }

    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}

impl<U: Instance> UsartRx<U> {
    /// Next received byte, if any. Overrun and framing errors drop the byte.
    #[inline]
    pub fn read_byte(&mut self) -> Option<u8> {
        self.rx.read().ok()
    }
}

/// `log` backend writing `[LEVEL] message` lines to the console.
///
/// The USART is taken out of the shared cell for the duration of a write, so interrupts stay
/// enabled while bytes go out. Records logged while another write is in flight are dropped.
pub struct SerialLogger {
    usart: Mutex<RefCell<Option<Usart<USART1>>>>,
}

pub static LOGGER: SerialLogger = SerialLogger::new();

impl SerialLogger {
    const fn new() -> Self {
        Self {
            usart: Mutex::new(RefCell::new(None)),
        }
    }

    /// Hand the console to the logger and register it with `log`.
    pub fn install(
        &'static self,
        usart: Usart<USART1>,
        level: LevelFilter,
    ) -> Result<(), SetLoggerError> {
        critical_section::with(|cs| self.usart.borrow(cs).replace(Some(usart)));
        log::set_logger(self)?;
        log::set_max_level(level);
        Ok(())
    }

    /// Raw bytes on the shared console (binary replies).
    pub fn write_bytes(&self, bytes: &[u8]) {
        self.with_usart(|usart| usart.write_bytes(bytes));
    }

    fn with_usart(&self, f: impl FnOnce(&mut Usart<USART1>)) {
        let taken = critical_section::with(|cs| self.usart.borrow(cs).take());
        if let Some(mut usart) = taken {
            f(&mut usart);
            critical_section::with(|cs| self.usart.borrow(cs).replace(Some(usart)));
        }
    }
}

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.with_usart(|usart| {
            let _ = write!(usart, "[{}] {}\r\n", record.level(), record.args());
        });
    }

    fn flush(&self) {
        self.with_usart(|usart| usart.flush());
    }
}

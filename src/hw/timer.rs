// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Monotonic time base.
//!
//! TIM2 free-runs at 1 MHz over its full 32-bit range and provides microseconds for pulse timing.
//! SysTick fires at 1 kHz and advances a separate millisecond counter, so both counters wrap at
//! `u32::MAX` and work with [`elapsed`](crate::hw::clock::elapsed).
//!
//! The binary must forward the `SysTick` exception to [`on_systick`].

use core::sync::atomic::{AtomicU32, Ordering};

use cortex_m::peripheral::{syst::SystClkSource, SYST};
use embedded_hal::delay::DelayNs;
use stm32f7xx_hal::{pac, rcc::Clocks};

use crate::hw::clock::{elapsed, Clock};

static MILLIS: AtomicU32 = AtomicU32::new(0);

/// Handle to the started time base. Copies all read the same counters.
#[derive(Copy, Clone, Debug)]
pub struct MonoTimer {
    _private: (),
}

impl MonoTimer {
    /// Start TIM2 and SysTick. Consumes both peripherals.
    pub fn start(tim2: pac::TIM2, mut syst: SYST, clocks: &Clocks) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

        tim2.cr1.modify(|_, w| w.cen().clear_bit());

        // 1 MHz tick
        let psc = clocks.timclk1().raw() / 1_000_000 - 1;
        tim2.psc.write(|w| unsafe { w.bits(psc) });
        tim2.arr.write(|w| unsafe { w.bits(0xFFFF_FFFF) });

        // Latch the prescaler, then start from zero
        tim2.egr.write(|w| w.ug().set_bit());
        tim2.cnt.write(|w| unsafe { w.bits(0) });
        tim2.cr1.modify(|_, w| w.cen().set_bit());

        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(clocks.sysclk().raw() / 1_000 - 1);
        syst.clear_current();
        syst.enable_interrupt();
        syst.enable_counter();

        Self { _private: () }
    }
}

/// Microseconds since [`MonoTimer::start`], read straight from TIM2.
#[inline]
pub fn micros() -> u32 {
    let tim2 = unsafe { &*pac::TIM2::ptr() };
    tim2.cnt.read().bits()
}

#[inline]
pub fn millis() -> u32 {
    MILLIS.load(Ordering::Relaxed)
}

/// SysTick body; call from the `SysTick` exception handler.
#[inline]
pub fn on_systick() {
    MILLIS.fetch_add(1, Ordering::Relaxed);
}

impl Clock for MonoTimer {
    #[inline]
    fn now_us(&self) -> u32 {
        micros()
    }

    #[inline]
    fn now_ms(&self) -> u32 {
        millis()
    }
}

impl DelayNs for MonoTimer {
    fn delay_ns(&mut self, ns: u32) {
        let us = ns.div_ceil(1_000);
        let start = micros();
        while elapsed(start, micros()) < us {
            cortex_m::asm::nop();
        }
    }
}

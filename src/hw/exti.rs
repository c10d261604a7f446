// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Rising-edge interrupt on the PPM input (PE10, EXTI line 10).

use cortex_m::peripheral::NVIC;
use stm32f7xx_hal::pac::{self, interrupt};

const LINE: u32 = 10;

/// Route PE10 to EXTI10, trigger on rising edges and unmask `EXTI15_10`.
pub fn enable_ppm_edge(syscfg: &pac::SYSCFG, exti: &pac::EXTI) {
    let rcc = unsafe { &*pac::RCC::ptr() };
    rcc.apb2enr.modify(|_, w| w.syscfgen().set_bit());

    // EXTICR3 covers lines 8..11; port E is 0b0100
    syscfg
        .exticr3
        .modify(|r, w| unsafe { w.bits((r.bits() & !(0xF << 8)) | (0x4 << 8)) });

    exti.rtsr.modify(|r, w| unsafe { w.bits(r.bits() | (1 << LINE)) });
    exti.ftsr.modify(|r, w| unsafe { w.bits(r.bits() & !(1 << LINE)) });
    exti.imr.modify(|r, w| unsafe { w.bits(r.bits() | (1 << LINE)) });

    unsafe { NVIC::unmask(interrupt::EXTI15_10) };
}

/// Acknowledge the edge; call first thing in the `EXTI15_10` handler.
#[inline]
pub fn clear_ppm_pending() {
    let exti = unsafe { &*pac::EXTI::ptr() };
    // Write-one-to-clear
    exti.pr.write(|w| unsafe { w.bits(1 << LINE) });
}

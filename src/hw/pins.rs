// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Pin definitions for the STM32F777 drive controller.

use stm32f7xx_hal::{
    gpio::{gpioa, gpiob, gpiod, gpioe, Alternate, Floating, Input, OpenDrain, Output, PushPull},
    pac,
    prelude::*,
};

/// All board pins. Construct this once at startup using:
///
/// ```rust
/// let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE);
/// ```
pub struct BoardPins {
    /// Status LED (active-low)
    pub led: gpiod::PD10<Output<PushPull>>,
    pub usart1: Usart1Pins,
    pub i2c1: I2c1Pins,
    pub rc: RcPins,
}

pub struct Usart1Pins {
    pub tx: gpioa::PA9<Alternate<7>>,
    pub rx: gpioa::PA10<Alternate<7>>,
}

/// I2C1 to the motor driver, external pull-ups
pub struct I2c1Pins {
    pub scl: gpiob::PB8<Alternate<4, OpenDrain>>,
    pub sda: gpiob::PB9<Alternate<4, OpenDrain>>,
}

/// Combined PPM stream on a single EXTI-capable pin
#[cfg(not(feature = "per-pin-rc"))]
pub struct RcPins {
    pub ppm: gpioe::PE10<Input<Floating>>,
}

/// One PWM output of the receiver per channel, channel order 1..6
#[cfg(feature = "per-pin-rc")]
pub struct RcPins {
    pub ch1: gpioe::PE9<Input<Floating>>,
    pub ch2: gpioe::PE11<Input<Floating>>,
    pub ch3: gpioe::PE13<Input<Floating>>,
    pub ch4: gpioe::PE14<Input<Floating>>,
    pub ch5: gpioe::PE5<Input<Floating>>,
    pub ch6: gpioe::PE6<Input<Floating>>,
}

impl BoardPins {
    /// Create all named pins from raw GPIO peripherals.
    pub fn new(gpioa: pac::GPIOA, gpiob: pac::GPIOB, gpiod: pac::GPIOD, gpioe: pac::GPIOE) -> Self {
        let gpioa = gpioa.split();
        let gpiob = gpiob.split();
        let gpiod = gpiod.split();
        let gpioe = gpioe.split();

        Self {
            led: gpiod.pd10.into_push_pull_output(),

            usart1: Usart1Pins {
                tx: gpioa.pa9.into_alternate::<7>(),
                rx: gpioa.pa10.into_alternate::<7>(),
            },

            i2c1: I2c1Pins {
                scl: gpiob.pb8.into_alternate_open_drain::<4>(),
                sda: gpiob.pb9.into_alternate_open_drain::<4>(),
            },

            #[cfg(not(feature = "per-pin-rc"))]
            rc: RcPins {
                ppm: gpioe.pe10.into_floating_input(),
            },

            #[cfg(feature = "per-pin-rc")]
            rc: RcPins {
                ch1: gpioe.pe9.into_floating_input(),
                ch2: gpioe.pe11.into_floating_input(),
                ch3: gpioe.pe13.into_floating_input(),
                ch4: gpioe.pe14.into_floating_input(),
                ch5: gpioe.pe5.into_floating_input(),
                ch6: gpioe.pe6.into_floating_input(),
            },
        }
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! DiddyBorg drive controller firmware entry point.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use cortex_m_rt::{entry, exception};
    use log::{error, info, LevelFilter};
    use panic_halt as _;

    use stm32f7xx_hal::{
        i2c::{BlockingI2c, Mode},
        pac::{self, interrupt},
        prelude::*,
        serial::{Config, Serial},
    };

    use diddyborg::config::{SystemConfig, CONTROL_PERIOD_MS, I2C_FREQUENCY_HZ, SERIAL_BAUD};
    use diddyborg::drivers::{GamepadInput, NoGamepad, PicoBorgRev};
    use diddyborg::hw::clock::elapsed;
    use diddyborg::hw::pins::BoardPins;
    use diddyborg::hw::timer::{self, MonoTimer};
    use diddyborg::hw::usart::LOGGER;
    use diddyborg::hw::{Blinker, LegacyI2c, LegacyOutput, Led, Usart};
    use diddyborg::motors::SkidSteer;
    use diddyborg::protocol::Parser;
    use diddyborg::system::{Robot, FATAL_BLINK_MS};

    #[cfg(not(feature = "per-pin-rc"))]
    use diddyborg::{drivers::FramedReceiver, hw::exti, protocol::ppm::PpmLine};

    #[cfg(feature = "per-pin-rc")]
    use diddyborg::{drivers::RcReceiver, hw::LegacyInput};

    #[cfg(not(feature = "per-pin-rc"))]
    static PPM_LINE: PpmLine = PpmLine::new();

    #[entry]
    fn main() -> ! {
        // Peripherals
        let (Some(dp), Some(cp)) = (pac::Peripherals::take(), cortex_m::Peripherals::take()) else {
            loop {
                cortex_m::asm::nop();
            }
        };

        // Clocks
        let mut rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.freeze();

        let pins = BoardPins::new(dp.GPIOA, dp.GPIOB, dp.GPIOD, dp.GPIOE);
        let config = SystemConfig::default();

        // USART1 (console and logger)
        let usart_cfg = Config {
            baud_rate: SERIAL_BAUD.bps(),
            ..Default::default()
        };
        let serial = Serial::new(
            dp.USART1,
            (pins.usart1.tx, pins.usart1.rx),
            &clocks,
            usart_cfg,
        );
        let (console, mut console_rx) = Usart::new(serial);
        let _ = LOGGER.install(console, LevelFilter::Info);
        info!("DiddyBorg starting");

        let clock = MonoTimer::start(dp.TIM2, cp.SYST, &clocks);
        let led = Led::active_low(LegacyOutput::new(pins.led));

        // I2C1 to the PicoBorg Reverse
        let i2c = BlockingI2c::i2c1(
            dp.I2C1,
            (pins.i2c1.scl, pins.i2c1.sda),
            Mode::standard(I2C_FREQUENCY_HZ.Hz()),
            &clocks,
            &mut rcc.apb1,
            10_000,
        );
        let mut driver =
            PicoBorgRev::with_address(LegacyI2c::new(i2c), clock, config.motor_address);
        if let Err(e) = driver.begin() {
            error!("motor driver unavailable: {}", e);
            fatal(Blinker::new(led));
        }
        driver.log_status();

        // RC receiver
        #[cfg(not(feature = "per-pin-rc"))]
        let rc = {
            let _ppm_pin = pins.rc.ppm;
            let Some(line) = PPM_LINE.claim() else {
                error!("PPM line already claimed");
                fatal(Blinker::new(led));
            };
            exti::enable_ppm_edge(&dp.SYSCFG, &dp.EXTI);
            FramedReceiver::framed(clock, line, config.rc)
        };

        #[cfg(feature = "per-pin-rc")]
        let rc = {
            let p = pins.rc;
            let rc_pins = [
                p.ch1.erase(),
                p.ch2.erase(),
                p.ch3.erase(),
                p.ch4.erase(),
                p.ch5.erase(),
                p.ch6.erase(),
            ]
            .map(LegacyInput::new);
            RcReceiver::per_pin(clock, rc_pins, config.rc)
        };

        let mut robot = Robot::new(
            SkidSteer::new(driver),
            GamepadInput::new(NoGamepad),
            rc,
            led,
            &config,
        );
        let mut parser = Parser::new();

        info!("DiddyBorg ready");

        loop {
            let start = timer::millis();

            while let Some(byte) = console_rx.read_byte() {
                if let Some(command) = parser.push(byte) {
                    if let Some(report) = robot.apply(command) {
                        LOGGER.write_bytes(&report.encode());
                    }
                }
            }

            robot.tick(start);

            // SysTick wakes the core every millisecond
            while elapsed(start, timer::millis()) < CONTROL_PERIOD_MS {
                cortex_m::asm::wfi();
            }
        }
    }

    fn fatal<L: embedded_hal::digital::OutputPin>(mut blinker: Blinker<L>) -> ! {
        loop {
            blinker.tick(timer::millis(), FATAL_BLINK_MS);
            cortex_m::asm::wfi();
        }
    }

    #[exception]
    fn SysTick() {
        timer::on_systick();
    }

    #[cfg(not(feature = "per-pin-rc"))]
    #[interrupt]
    fn EXTI15_10() {
        exti::clear_ppm_pending();
        PPM_LINE.on_rising_edge(timer::micros());
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}

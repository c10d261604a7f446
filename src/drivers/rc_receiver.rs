// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! FlySky-style RC receiver, loop side.
//!
//! Two acquisition modes are supported:
//! - **Framed**: one PPM line decoded in interrupt context by [`crate::protocol::ppm`]. `update`
//!   copies the shared channel array.
//! - **Per-pin**: one PWM pin per channel, measured by busy-waiting inside `update` with hard
//!   bounds (25 ms for the rising edge, 3 ms for the pulse).
//!
//! Channel values are pulse widths in microseconds (1000–2000, center 1500). Accessors map them to
//! [-1.0, 1.0] with a dead band around center and optional per-channel reversal.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin};
use log::debug;

use crate::config::RcConfig;
use crate::control::input::{InputSample, InputSource};
use crate::control::shaping::{apply_deadzone, clamp_power};
use crate::error::{Error, Result};
use crate::hw::clock::{elapsed, Clock};
use crate::protocol::ppm::{PpmHandle, MAX_CHANNELS, PULSE_CENTER_US, PULSE_MAX_US, PULSE_MIN_US};

/// A channel is live if it was updated within this window.
pub const SIGNAL_TIMEOUT_MS: u32 = 100;

/// Per-pin mode: longest wait for a rising edge.
pub const PULSE_WAIT_TIMEOUT_US: u32 = 25_000;

/// Per-pin mode: longest accepted high time.
pub const PULSE_WIDTH_TIMEOUT_US: u32 = 3_000;

/// Half of the pulse range, center to either end.
const HALF_RANGE_US: f32 = (PULSE_MAX_US - PULSE_CENTER_US) as f32;

/// Placeholder pin type for a framed receiver.
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl InputPin for NoPin {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(false)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(true)
    }
}

enum Acquisition<P, const N: usize> {
    Framed { line: PpmHandle, last_pulses: u32 },
    PerPin([P; N]),
}

/// Receiver reading a claimed PPM line.
pub type FramedReceiver<C> = RcReceiver<C, NoPin, 0>;

pub struct RcReceiver<C, P, const N: usize> {
    clock: C,
    source: Acquisition<P, N>,
    num_channels: usize,
    channels: [u16; MAX_CHANNELS],
    stamps_ms: [Option<u32>; MAX_CHANNELS],
    /// Data acquired by a liveness check and not yet handed out by `poll`.
    unread: bool,
    config: RcConfig,
}

impl<C: Clock> FramedReceiver<C> {
    /// Receiver fed by the PPM edge interrupt.
    pub fn framed(clock: C, line: PpmHandle, config: RcConfig) -> Self {
        debug!("rc: PPM mode, {} channels", MAX_CHANNELS);
        Self {
            clock,
            source: Acquisition::Framed {
                line,
                last_pulses: 0,
            },
            num_channels: MAX_CHANNELS,
            channels: [PULSE_CENTER_US; MAX_CHANNELS],
            stamps_ms: [None; MAX_CHANNELS],
            unread: false,
            config,
        }
    }
}

impl<C, P, const N: usize> RcReceiver<C, P, N>
where
    C: Clock,
    P: InputPin,
{
    /// Receiver measuring one pin per channel. Pins beyond the sixth are ignored.
    pub fn per_pin(clock: C, pins: [P; N], config: RcConfig) -> Self {
        let num_channels = N.min(MAX_CHANNELS);
        debug!("rc: PWM mode, {} channels", num_channels);
        Self {
            clock,
            source: Acquisition::PerPin(pins),
            num_channels,
            channels: [PULSE_CENTER_US; MAX_CHANNELS],
            stamps_ms: [None; MAX_CHANNELS],
            unread: false,
            config,
        }
    }

    /// Acquire new channel values. Returns the number of channels that received fresh data.
    pub fn update(&mut self) -> usize {
        let now_ms = self.clock.now_ms();
        self.update_at(now_ms)
    }

    fn update_at(&mut self, now_ms: u32) -> usize {
        match &mut self.source {
            Acquisition::Framed { line, last_pulses } => {
                let frame = line.snapshot();
                if frame.pulses == *last_pulses {
                    return 0;
                }
                *last_pulses = frame.pulses;
                self.channels = frame.channels;
                for stamp in self.stamps_ms.iter_mut() {
                    *stamp = Some(now_ms);
                }
                MAX_CHANNELS
            }
            Acquisition::PerPin(pins) => {
                let mut fresh = 0;
                for (i, pin) in pins.iter_mut().take(MAX_CHANNELS).enumerate() {
                    match measure_pulse(&self.clock, pin) {
                        Ok(width) => {
                            self.channels[i] = width;
                            self.stamps_ms[i] = Some(now_ms);
                            fresh += 1;
                        }
                        // Previous sample stays in place
                        Err(e) => debug!("rc: ch{} no sample: {}", i, e),
                    }
                }
                fresh
            }
        }
    }

    /// True if any channel was updated within [`SIGNAL_TIMEOUT_MS`].
    pub fn is_connected(&self) -> bool {
        self.connected_at(self.clock.now_ms())
    }

    fn connected_at(&self, now_ms: u32) -> bool {
        self.stamps_ms[..self.num_channels]
            .iter()
            .flatten()
            .any(|&t| elapsed(t, now_ms) < SIGNAL_TIMEOUT_MS)
    }

    /// Last pulse width on `channel`, or center if the channel does not exist.
    pub fn raw_channel(&self, channel: usize) -> u16 {
        if channel < self.num_channels {
            self.channels[channel]
        } else {
            PULSE_CENTER_US
        }
    }

    /// Normalized value of `channel` in [-1.0, 1.0]; 0.0 if the channel does not exist.
    pub fn channel(&self, channel: usize) -> f32 {
        if channel >= self.num_channels {
            return 0.0;
        }
        let centered = (self.channels[channel] as f32 - PULSE_CENTER_US as f32) / HALF_RANGE_US;
        let deadband = self.config.pulse_deadband_us as f32 / HALF_RANGE_US;
        let value = clamp_power(apply_deadzone(centered, deadband));
        if self.config.reversed[channel] {
            -value
        } else {
            value
        }
    }

    pub fn set_channel_reverse(&mut self, channel: usize, reverse: bool) {
        if let Some(r) = self.config.reversed.get_mut(channel) {
            *r = reverse;
        }
    }

    pub fn throttle(&self) -> f32 {
        self.channel(self.config.throttle_channel)
    }

    pub fn steering(&self) -> f32 {
        self.channel(self.config.steering_channel)
    }

    pub fn left_stick(&self) -> f32 {
        self.channel(self.config.left_channel)
    }

    pub fn right_stick(&self) -> f32 {
        self.channel(self.config.right_channel)
    }

    /// All mapped axes, or [`Error::Disconnected`] if no channel is live.
    pub fn axes(&self) -> Result<InputSample> {
        if !self.is_connected() {
            return Err(Error::Disconnected);
        }
        Ok(self.sample())
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    fn sample(&self) -> InputSample {
        InputSample {
            throttle: self.throttle(),
            steering: self.steering(),
            left: self.left_stick(),
            right: self.right_stick(),
            speed: None,
            brake: false,
        }
    }
}

impl<C, P, const N: usize> InputSource for RcReceiver<C, P, N>
where
    C: Clock,
    P: InputPin,
{
    /// Acquires before checking, so an idle receiver is noticed as soon as a signal appears.
    fn is_connected(&mut self, now_ms: u32) -> bool {
        if self.update_at(now_ms) > 0 {
            self.unread = true;
        }
        self.connected_at(now_ms)
    }

    fn poll(&mut self, now_ms: u32) -> Option<InputSample> {
        let fresh = self.update_at(now_ms) > 0;
        if fresh || core::mem::take(&mut self.unread) {
            Some(self.sample())
        } else {
            None
        }
    }
}

#[inline]
fn is_high<P: InputPin>(pin: &mut P) -> bool {
    pin.is_high().unwrap_or(false)
}

/// Measure one high pulse on `pin`, waiting for a fresh rising edge first.
fn measure_pulse<C: Clock, P: InputPin>(clock: &C, pin: &mut P) -> Result<u16> {
    let start = clock.now_us();

    // Let a pulse already in progress finish
    while is_high(pin) {
        if elapsed(start, clock.now_us()) >= PULSE_WAIT_TIMEOUT_US {
            return Err(Error::Timeout);
        }
    }
    while !is_high(pin) {
        if elapsed(start, clock.now_us()) >= PULSE_WAIT_TIMEOUT_US {
            return Err(Error::Timeout);
        }
    }

    let rise = clock.now_us();
    while is_high(pin) {
        if elapsed(rise, clock.now_us()) >= PULSE_WIDTH_TIMEOUT_US {
            return Err(Error::Timeout);
        }
    }

    let width = elapsed(rise, clock.now_us()) as u16;
    if !(PULSE_MIN_US..=PULSE_MAX_US).contains(&width) {
        return Err(Error::PulseOutOfRange(width));
    }
    Ok(width)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::protocol::ppm::tests::{feed_frame, leaked_line};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Microsecond clock that advances by 1 us on every `now_us` read.
    #[derive(Clone, Default)]
    pub(crate) struct SimClock(Rc<Cell<u32>>);

    impl SimClock {
        pub(crate) fn set_ms(&self, ms: u32) {
            self.0.set(ms * 1000);
        }
    }

    impl Clock for SimClock {
        fn now_us(&self) -> u32 {
            let t = self.0.get();
            self.0.set(t.wrapping_add(1));
            t
        }

        fn now_ms(&self) -> u32 {
            self.0.get() / 1000
        }
    }

    /// 50 Hz PWM with a fixed high time, sampled against the shared clock.
    struct SimPwm {
        clock: SimClock,
        width_us: u32,
    }

    impl ErrorType for SimPwm {
        type Error = Infallible;
    }

    impl InputPin for SimPwm {
        fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
            Ok(self.width_us > 0 && self.clock.0.get() % 20_000 < self.width_us)
        }

        fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
            self.is_high().map(|h| !h)
        }
    }

    fn framed() -> (FramedReceiver<SimClock>, SimClock, &'static crate::protocol::ppm::PpmLine) {
        let clock = SimClock::default();
        let line = leaked_line();
        let rx = FramedReceiver::framed(clock.clone(), line.claim().unwrap(), RcConfig::default());
        (rx, clock, line)
    }

    #[test]
    fn framed_update_copies_and_stamps() {
        let (mut rx, clock, line) = framed();
        assert_eq!(rx.update(), 0);
        assert!(!rx.is_connected());

        feed_frame(
            |t| line.on_rising_edge(t),
            0,
            &[2000, 1500, 1000, 1500, 1500, 1500],
        );
        clock.set_ms(1000);
        assert_eq!(rx.update(), MAX_CHANNELS);
        assert!(rx.is_connected());
        assert_eq!(rx.raw_channel(0), 2000);
        assert_eq!(rx.raw_channel(2), 1000);
        assert_eq!(rx.steering(), 1.0);
        assert_eq!(rx.throttle(), -1.0);

        // No new pulses: nothing is re-stamped and the signal ages out
        clock.set_ms(1099);
        assert_eq!(rx.update(), 0);
        assert!(rx.is_connected());
        clock.set_ms(1100);
        assert!(!rx.is_connected());
        assert_eq!(rx.axes(), Err(Error::Disconnected));
    }

    #[test]
    fn deadband_and_reversal() {
        let (mut rx, _clock, line) = framed();
        feed_frame(
            |t| line.on_rising_edge(t),
            0,
            &[1540, 1460, 1750, 1275, 1500, 1500],
        );
        rx.update();
        assert_eq!(rx.channel(0), 0.0);
        assert_eq!(rx.channel(1), 0.0);
        // (250 - 50) / (500 - 50)
        assert!((rx.channel(2) - 200.0 / 450.0).abs() < 1e-6);
        assert!((rx.channel(3) + 175.0 / 450.0).abs() < 1e-6);

        rx.set_channel_reverse(2, true);
        assert!((rx.channel(2) + 200.0 / 450.0).abs() < 1e-6);
        rx.set_channel_reverse(17, true);
    }

    #[test]
    fn out_of_range_channel_reads_center() {
        let (rx, _clock, _line) = framed();
        assert_eq!(rx.raw_channel(6), PULSE_CENTER_US);
        assert_eq!(rx.channel(9), 0.0);
    }

    #[test]
    fn poll_yields_only_fresh_samples() {
        let (mut rx, _clock, line) = framed();
        assert_eq!(rx.poll(0), None);
        feed_frame(
            |t| line.on_rising_edge(t),
            0,
            &[1500, 1500, 2000, 1500, 1500, 1500],
        );
        let sample = rx.poll(10).unwrap();
        assert_eq!(sample.throttle, 1.0);
        assert_eq!(sample.speed, None);
        assert!(!sample.brake);
        assert_eq!(rx.poll(20), None);
        assert!(InputSource::is_connected(&mut rx, 109));
        assert!(!InputSource::is_connected(&mut rx, 110));
    }

    #[test]
    fn per_pin_measures_each_channel() {
        let clock = SimClock::default();
        let pin = |w| SimPwm {
            clock: clock.clone(),
            width_us: w,
        };
        let mut rx = RcReceiver::per_pin(
            clock.clone(),
            [pin(1200), pin(1800), pin(1500)],
            RcConfig::default(),
        );
        assert_eq!(rx.num_channels(), 3);
        assert_eq!(rx.update(), 3);
        for (ch, expected) in [1200u16, 1800, 1500].into_iter().enumerate() {
            assert!(rx.raw_channel(ch).abs_diff(expected) <= 2);
        }
        assert!(rx.is_connected());
    }

    #[test]
    fn per_pin_keeps_previous_sample_on_failure() {
        let clock = SimClock::default();
        let mut rx = RcReceiver::per_pin(
            clock.clone(),
            [SimPwm {
                clock: clock.clone(),
                width_us: 1700,
            }],
            RcConfig::default(),
        );
        assert_eq!(rx.update(), 1);
        let before = rx.raw_channel(0);

        if let Acquisition::PerPin(pins) = &mut rx.source {
            pins[0].width_us = 0;
        }
        assert_eq!(rx.update(), 0);
        assert_eq!(rx.raw_channel(0), before);
    }

    #[test]
    fn measure_pulse_bounds() {
        let clock = SimClock::default();

        // Never rises: gives up after the 25 ms wait
        let mut dead = SimPwm {
            clock: clock.clone(),
            width_us: 0,
        };
        assert_eq!(measure_pulse(&clock, &mut dead), Err(Error::Timeout));
        assert!(clock.0.get() <= PULSE_WAIT_TIMEOUT_US + 2);

        let mut short = SimPwm {
            clock: clock.clone(),
            width_us: 800,
        };
        clock.0.set(0);
        assert!(matches!(
            measure_pulse(&clock, &mut short),
            Err(Error::PulseOutOfRange(w)) if w.abs_diff(800) <= 2
        ));

        // Stuck high: the width bound fires
        let mut stuck = SimPwm {
            clock: clock.clone(),
            width_us: 19_999,
        };
        clock.0.set(19_999);
        assert_eq!(measure_pulse(&clock, &mut stuck), Err(Error::Timeout));
    }

    #[test]
    fn liveness_check_acquires_and_keeps_sample_for_poll() {
        let (mut rx, _clock, line) = framed();
        assert!(!InputSource::is_connected(&mut rx, 0));

        feed_frame(
            |t| line.on_rising_edge(t),
            0,
            &[1500, 1500, 2000, 1500, 1500, 1500],
        );
        assert!(InputSource::is_connected(&mut rx, 500));

        // Acquired by the check, handed out once
        assert_eq!(rx.poll(500).map(|s| s.throttle), Some(1.0));
        assert_eq!(rx.poll(510), None);
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt side of the framed (PPM) RC decoder.
//!
//! A PPM line carries all channels back to back: each rising edge starts the next channel, and a
//! gap longer than [`SYNC_GAP_US`] marks the start of a new frame. [`PpmDecoder`] turns edge
//! timestamps into channel pulse widths. [`PpmLine`] is the single instance shared between the
//! edge interrupt and the control loop; the loop takes it exactly once with [`PpmLine::claim`].

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;

/// Number of channels carried by one frame.
pub const MAX_CHANNELS: usize = 6;

/// Intervals longer than this are a frame-sync gap.
pub const SYNC_GAP_US: u32 = 3000;

pub const PULSE_MIN_US: u16 = 1000;
pub const PULSE_MAX_US: u16 = 2000;
pub const PULSE_CENTER_US: u16 = 1500;

/// Copy of the decoder state handed to the control loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PpmFrame {
    pub channels: [u16; MAX_CHANNELS],
    /// Count of valid pulses recorded since start-up (wrapping).
    pub pulses: u32,
}

/// Edge-interval state machine. Allocation-free and constant time per edge.
#[derive(Debug)]
pub struct PpmDecoder {
    channels: [u16; MAX_CHANNELS],
    index: usize,
    last_edge_us: Option<u32>,
    pulses: u32,
}

impl PpmDecoder {
    pub const fn new() -> Self {
        Self {
            channels: [PULSE_CENTER_US; MAX_CHANNELS],
            index: 0,
            last_edge_us: None,
            pulses: 0,
        }
    }

    /// Feed one rising edge timestamped on the free-running microsecond counter.
    pub fn on_rising_edge(&mut self, now_us: u32) {
        let Some(last) = self.last_edge_us.replace(now_us) else {
            return;
        };
        let interval = now_us.wrapping_sub(last);

        if interval > SYNC_GAP_US {
            self.index = 0;
        } else if (PULSE_MIN_US as u32..=PULSE_MAX_US as u32).contains(&interval) {
            if self.index < MAX_CHANNELS {
                self.channels[self.index] = interval as u16;
                self.index += 1;
                self.pulses = self.pulses.wrapping_add(1);
            }
        }
        // Anything else is noise and leaves the index where it is
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn frame(&self) -> PpmFrame {
        PpmFrame {
            channels: self.channels,
            pulses: self.pulses,
        }
    }
}

impl Default for PpmDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// The one PPM input of the board, shared with the edge interrupt.
pub struct PpmLine {
    claimed: AtomicBool,
    decoder: Mutex<RefCell<PpmDecoder>>,
}

impl PpmLine {
    pub const fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
            decoder: Mutex::new(RefCell::new(PpmDecoder::new())),
        }
    }

    /// Register the control-loop reader. Succeeds once; later calls return `None`.
    pub fn claim(&'static self) -> Option<PpmHandle> {
        if self.claimed.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(PpmHandle { line: self })
        }
    }

    /// Interrupt entry point. Edges arriving before the line is claimed are ignored.
    pub fn on_rising_edge(&self, now_us: u32) {
        if !self.claimed.load(Ordering::Acquire) {
            return;
        }
        critical_section::with(|cs| self.decoder.borrow_ref_mut(cs).on_rising_edge(now_us));
    }
}

impl Default for PpmLine {
    fn default() -> Self {
        Self::new()
    }
}

/// Loop-side reader of a claimed [`PpmLine`].
pub struct PpmHandle {
    line: &'static PpmLine,
}

impl PpmHandle {
    /// Bulk copy of the channel array, taken with interrupts masked.
    pub fn snapshot(&self) -> PpmFrame {
        critical_section::with(|cs| self.line.decoder.borrow_ref(cs).frame())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Feed a full frame: sync gap, then one edge per pulse width.
    pub(crate) fn feed_frame(mut edge: impl FnMut(u32), start_us: u32, widths: &[u16]) -> u32 {
        let mut t = start_us;
        edge(t);
        t = t.wrapping_add(5000);
        edge(t);
        for &w in widths {
            t = t.wrapping_add(w as u32);
            edge(t);
        }
        t
    }

    pub(crate) fn leaked_line() -> &'static PpmLine {
        Box::leak(Box::new(PpmLine::new()))
    }

    #[test]
    fn decodes_one_frame() {
        let mut dec = PpmDecoder::new();
        feed_frame(
            |t| dec.on_rising_edge(t),
            0,
            &[1500, 1000, 2000, 1250, 1750, 1600],
        );
        let frame = dec.frame();
        assert_eq!(frame.channels, [1500, 1000, 2000, 1250, 1750, 1600]);
        assert_eq!(frame.pulses, 6);
        assert_eq!(dec.index(), MAX_CHANNELS);
    }

    #[test]
    fn sync_gap_resets_index_from_any_position() {
        for partial in 0..=MAX_CHANNELS {
            let mut dec = PpmDecoder::new();
            let widths = [1100u16; MAX_CHANNELS];
            let t = feed_frame(|t| dec.on_rising_edge(t), 0, &widths[..partial]);
            dec.on_rising_edge(t + 4000);
            assert_eq!(dec.index(), 0);
            dec.on_rising_edge(t + 4000 + 1900);
            assert_eq!(dec.frame().channels[0], 1900);
            assert_eq!(dec.index(), 1);
        }
    }

    #[test]
    fn noise_does_not_advance_index() {
        let mut dec = PpmDecoder::new();
        let t = feed_frame(|t| dec.on_rising_edge(t), 0, &[1200]);
        // 400 us glitch, then 2500 us (neither pulse nor sync)
        dec.on_rising_edge(t + 400);
        dec.on_rising_edge(t + 2900);
        assert_eq!(dec.index(), 1);
        assert_eq!(dec.frame().pulses, 1);
        assert_eq!(dec.frame().channels[1], PULSE_CENTER_US);
    }

    #[test]
    fn extra_pulses_are_dropped_until_sync() {
        let mut dec = PpmDecoder::new();
        let t = feed_frame(|t| dec.on_rising_edge(t), 0, &[1500; MAX_CHANNELS]);
        dec.on_rising_edge(t + 1300);
        assert_eq!(dec.index(), MAX_CHANNELS);
        assert!(dec.frame().channels.iter().all(|&c| c == 1500));
    }

    #[test]
    fn intervals_across_counter_wrap() {
        let mut dec = PpmDecoder::new();
        feed_frame(|t| dec.on_rising_edge(t), u32::MAX - 5500, &[1800, 1200]);
        assert_eq!(&dec.frame().channels[..2], &[1800, 1200]);
    }

    #[test]
    fn line_is_claimed_once_and_ignores_edges_before() {
        let line = leaked_line();
        line.on_rising_edge(0);
        line.on_rising_edge(5000);
        line.on_rising_edge(6500);

        let handle = line.claim().unwrap();
        assert!(line.claim().is_none());
        assert_eq!(handle.snapshot().pulses, 0);

        feed_frame(|t| line.on_rising_edge(t), 10_000, &[1400]);
        let frame = handle.snapshot();
        assert_eq!(frame.channels[0], 1400);
        assert_eq!(frame.pulses, 1);
    }
}

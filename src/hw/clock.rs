// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Monotonic time source used by the control loop and the RC decoder.
//!
//! Both counters wrap; callers compare timestamps with [`elapsed`] only.

/// Free-running time source.
pub trait Clock {
    /// Microseconds since an arbitrary epoch, wrapping at `u32::MAX`.
    fn now_us(&self) -> u32;

    /// Milliseconds since boot, wrapping at `u32::MAX`.
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }

    #[inline]
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}

/// Time elapsed from `since` to `now` on a wrapping counter.
#[inline]
pub fn elapsed(since: u32, now: u32) -> u32 {
    now.wrapping_sub(since)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_across_wrap() {
        assert_eq!(elapsed(u32::MAX - 9, 10), 20);
        assert_eq!(elapsed(100, 350), 250);
    }
}

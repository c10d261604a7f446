// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bounded retry with a fixed back-off between attempts.

/// Run `op` up to `attempts` times, calling `backoff` between failed attempts.
///
/// `op` receives the zero-based attempt number. The last error is returned once all attempts are
/// used up. `attempts == 0` is treated as a single attempt.
pub fn with_retries<T, E, Op, Backoff>(
    attempts: u8,
    mut op: Op,
    mut backoff: Backoff,
) -> Result<T, E>
where
    Op: FnMut(u8) -> Result<T, E>,
    Backoff: FnMut(),
{
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                attempt += 1;
                if attempt >= attempts {
                    return Err(e);
                }
                backoff();
            }
        }
    }
}

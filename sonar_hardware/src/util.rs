use std::time::{Duration, Instant};

/// Spin until `is_high()` reports `want_high`, or `deadline` passes.
///
/// Returns `true` when the level was observed before the deadline. Spins
/// instead of sleeping: echo edges need microsecond resolution.
pub fn wait_for_level(
    mut is_high: impl FnMut() -> bool,
    want_high: bool,
    deadline: Instant,
) -> bool {
    while is_high() != want_high {
        if Instant::now() >= deadline {
            return false;
        }
        std::hint::spin_loop();
    }
    true
}

/// Measure the width of the next HIGH pulse in microseconds.
///
/// A pulse already in progress is skipped: the line must first be seen LOW,
/// then rise, then fall. All three waits share one deadline of `timeout`
/// from the call, so the function never blocks longer than that. Returns 0
/// when no complete pulse was seen in time.
pub fn measure_pulse_us(mut is_high: impl FnMut() -> bool, timeout: Duration) -> u32 {
    let deadline = Instant::now() + timeout;

    if !wait_for_level(&mut is_high, false, deadline) {
        return 0;
    }
    if !wait_for_level(&mut is_high, true, deadline) {
        return 0;
    }
    let rise = Instant::now();
    if !wait_for_level(&mut is_high, false, deadline) {
        return 0;
    }
    let width = rise.elapsed().as_micros();
    u32::try_from(width).unwrap_or(u32::MAX).max(1)
}

/// Busy-wait for `us` microseconds.
#[inline]
pub fn spin_delay_us(us: u32) {
    let until = Instant::now() + Duration::from_micros(u64::from(us));
    while Instant::now() < until {
        std::hint::spin_loop();
    }
}

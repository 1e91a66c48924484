//! Tick period arithmetic shared by the gate, the runner and the CLI.

use std::time::Duration;

/// One tick at `tick_hz`, never shorter than 1 µs. Zero is treated as 1 Hz
/// in release builds.
#[inline]
pub fn tick_period(tick_hz: u32) -> Duration {
    debug_assert!(tick_hz > 0, "tick_hz must be > 0");
    Duration::from_micros((1_000_000 / u64::from(tick_hz.max(1))).max(1))
}

/// `tick_period` in whole microseconds.
#[inline]
pub fn period_us(tick_hz: u32) -> u64 {
    u64::try_from(tick_period(tick_hz).as_micros()).unwrap_or(u64::MAX)
}

/// Whole milliseconds per tick, floored at 1 ms. Same rule the config uses
/// to compare against the echo timeout.
#[inline]
pub fn period_ms(tick_hz: u32) -> u64 {
    debug_assert!(tick_hz > 0, "tick_hz must be > 0");
    sonar_config::tick_period_ms(tick_hz)
}

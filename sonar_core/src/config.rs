//! Runtime configuration types for the sampling pipeline.
//!
//! These are the structs the core consumes. They are separate from the
//! TOML-deserialized config in `sonar_config`; see `conversions`.

use std::time::Duration;

/// Default trigger settle time (line held LOW before the pulse).
pub const TRIGGER_SETTLE_US: u32 = 2;
/// Default trigger pulse width.
pub const TRIGGER_PULSE_US: u32 = 10;
/// Default hard deadline for the echo wait.
pub const ECHO_TIMEOUT: Duration = Duration::from_millis(30);
/// Default tick rate (~33 ms period).
pub const TICK_HZ: u32 = 30;

/// Trigger/echo timing for the ranging unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangingCfg {
    /// Trigger held LOW for this long before the pulse.
    pub settle_us: u32,
    /// Width of the trigger pulse.
    pub trigger_pulse_us: u32,
    /// Upper bound on the echo wait; a missing echo reports `NoEcho` after this.
    pub echo_timeout: Duration,
}

impl Default for RangingCfg {
    fn default() -> Self {
        Self {
            settle_us: TRIGGER_SETTLE_US,
            trigger_pulse_us: TRIGGER_PULSE_US,
            echo_timeout: ECHO_TIMEOUT,
        }
    }
}

/// Tick pacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplingCfg {
    /// Nominal tick rate in Hz.
    pub tick_hz: u32,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self { tick_hz: TICK_HZ }
    }
}

//! `From` implementations bridging `sonar_config` types to `sonar_core` types.

use std::time::Duration;

use crate::config::{RangingCfg, SamplingCfg};

impl From<&sonar_config::RangingCfg> for RangingCfg {
    fn from(c: &sonar_config::RangingCfg) -> Self {
        Self {
            settle_us: c.settle_us,
            trigger_pulse_us: c.trigger_pulse_us,
            echo_timeout: Duration::from_millis(c.echo_timeout_ms),
        }
    }
}

impl From<&sonar_config::SamplingCfg> for SamplingCfg {
    fn from(c: &sonar_config::SamplingCfg) -> Self {
        Self { tick_hz: c.tick_hz }
    }
}

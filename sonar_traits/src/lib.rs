pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

/// Logic level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Trigger/echo ultrasonic transducer as seen by the ranging unit.
pub trait Transducer {
    /// Drive the trigger line to `level`.
    fn write_trigger(
        &mut self,
        level: Level,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Length of the next HIGH pulse on the echo line in microseconds,
    /// or 0 when no complete pulse was observed within `timeout`.
    fn read_pulse_us(
        &mut self,
        timeout: Duration,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>>;

    /// Busy-wait for `us` microseconds.
    fn delay_us(&mut self, us: u32);
}

/// A single digital input line (raw electrical level, no inversion).
pub trait DigitalInput {
    fn is_high(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// A single analog input channel returning raw conversion counts.
pub trait AnalogInput {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: Transducer + ?Sized> Transducer for Box<T> {
    fn write_trigger(
        &mut self,
        level: Level,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write_trigger(level)
    }

    fn read_pulse_us(
        &mut self,
        timeout: Duration,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_pulse_us(timeout)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us);
    }
}

impl<T: DigitalInput + ?Sized> DigitalInput for Box<T> {
    fn is_high(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).is_high()
    }
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read_raw()
    }
}

//! Ranging unit: one trigger/echo measurement per call.

use sonar_traits::{Level, Transducer};

use crate::config::RangingCfg;
use crate::error::Result;
use crate::fixed_point::quantize_mm;
use crate::hw_error::map_hw_error;

/// Speed of sound at room temperature.
pub const SPEED_OF_SOUND_MM_PER_US: f64 = 0.343;

/// Outcome of one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawRange {
    Distance(u32),
    /// Nothing came back before the echo deadline.
    NoEcho,
}

impl RawRange {
    /// Convert a round-trip echo width to a one-way distance, rounded to
    /// the nearest millimetre. A zero width means no echo.
    pub fn from_echo_us(echo_us: u32) -> Self {
        if echo_us == 0 {
            return RawRange::NoEcho;
        }
        let mm = f64::from(echo_us) * SPEED_OF_SOUND_MM_PER_US / 2.0;
        RawRange::Distance(quantize_mm(mm))
    }

    pub fn mm(self) -> Option<u32> {
        match self {
            RawRange::Distance(mm) => Some(mm),
            RawRange::NoEcho => None,
        }
    }
}

/// Drives the transducer. Holds no measurement history.
#[derive(Debug)]
pub struct RangingUnit<T: Transducer> {
    transducer: T,
    cfg: RangingCfg,
}

impl<T: Transducer> RangingUnit<T> {
    pub fn new(transducer: T, cfg: RangingCfg) -> Self {
        Self { transducer, cfg }
    }

    pub fn cfg(&self) -> &RangingCfg {
        &self.cfg
    }

    pub fn transducer(&self) -> &T {
        &self.transducer
    }

    pub fn into_inner(self) -> T {
        self.transducer
    }

    /// Measure once, surfacing transducer I/O errors.
    pub fn try_measure(&mut self) -> Result<RawRange> {
        let t = &mut self.transducer;
        t.write_trigger(Level::Low).map_err(|e| map_hw_error(&*e))?;
        t.delay_us(self.cfg.settle_us);
        t.write_trigger(Level::High).map_err(|e| map_hw_error(&*e))?;
        t.delay_us(self.cfg.trigger_pulse_us);
        t.write_trigger(Level::Low).map_err(|e| map_hw_error(&*e))?;

        let echo_us = t
            .read_pulse_us(self.cfg.echo_timeout)
            .map_err(|e| map_hw_error(&*e))?;
        let raw = RawRange::from_echo_us(echo_us);
        tracing::trace!(echo_us, ?raw, "ranging measurement");
        Ok(raw)
    }

    /// Measure once. Transducer I/O errors degrade to `NoEcho`, which the
    /// stabilizer already absorbs as a transient miss.
    pub fn measure(&mut self) -> RawRange {
        match self.try_measure() {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "ranging failed; reporting no echo");
                RawRange::NoEcho
            }
        }
    }
}

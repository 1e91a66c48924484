//! The per-tick sampling pipeline and its builder.
//!
//! `TelemetrySampler` owns every input collaborator plus the stabilizer
//! state. `sample()` runs exactly one tick: range, stabilize, read buttons
//! and pot, and return the merged record.

use sonar_traits::{AnalogInput, DigitalInput, Transducer};

use crate::config::RangingCfg;
use crate::error::{BuildError, Result};
use crate::inputs::{Button, Potentiometer};
use crate::ranging::{RawRange, RangingUnit};
use crate::record::TelemetryRecord;
use crate::stabilizer::{Stabilizer, StabilizerCfg};

pub struct TelemetrySampler<T: Transducer, B: DigitalInput, A: AnalogInput> {
    ranging: RangingUnit<T>,
    stabilizer: Stabilizer,
    btn1: Button<B>,
    btn2: Button<B>,
    pot: Potentiometer<A>,
    ticks: u64,
    last_raw: Option<RawRange>,
}

impl<T: Transducer, B: DigitalInput, A: AnalogInput> core::fmt::Debug for TelemetrySampler<T, B, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TelemetrySampler")
            .field("ticks", &self.ticks)
            .field("last_raw", &self.last_raw)
            .field("stabilizer", self.stabilizer.state())
            .finish()
    }
}

impl<T: Transducer, B: DigitalInput, A: AnalogInput> TelemetrySampler<T, B, A> {
    pub fn builder() -> SamplerBuilder<T, B, A> {
        SamplerBuilder::default()
    }

    /// Run one tick.
    ///
    /// Ranging problems never fail a tick; only button or pot read errors do.
    pub fn sample(&mut self) -> Result<TelemetryRecord> {
        let raw = self.ranging.measure();
        let dist_mm = self.stabilizer.step(raw);
        let record = TelemetryRecord {
            btn1: self.btn1.pressed()?,
            btn2: self.btn2.pressed()?,
            pot: self.pot.read()?,
            dist_mm,
        };
        self.ticks = self.ticks.saturating_add(1);
        self.last_raw = Some(raw);
        tracing::trace!(tick = self.ticks, ?raw, dist_mm, "tick");
        Ok(record)
    }

    /// Ticks sampled so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Raw range from the most recent tick.
    pub fn last_raw(&self) -> Option<RawRange> {
        self.last_raw
    }

    pub fn stabilizer(&self) -> &Stabilizer {
        &self.stabilizer
    }

    pub fn ranging(&self) -> &RangingUnit<T> {
        &self.ranging
    }
}

/// Collects the sampler's collaborators; `build()` checks that all are set.
pub struct SamplerBuilder<T, B, A> {
    transducer: Option<T>,
    buttons: Option<(B, B)>,
    pot: Option<A>,
    active_low: bool,
    ranging: RangingCfg,
    stabilizer: StabilizerCfg,
}

impl<T, B, A> Default for SamplerBuilder<T, B, A> {
    fn default() -> Self {
        Self {
            transducer: None,
            buttons: None,
            pot: None,
            active_low: true,
            ranging: RangingCfg::default(),
            stabilizer: StabilizerCfg::default(),
        }
    }
}

impl<T: Transducer, B: DigitalInput, A: AnalogInput> SamplerBuilder<T, B, A> {
    pub fn with_transducer(mut self, transducer: T) -> Self {
        self.transducer = Some(transducer);
        self
    }

    pub fn with_buttons(mut self, btn1: B, btn2: B) -> Self {
        self.buttons = Some((btn1, btn2));
        self
    }

    pub fn with_pot(mut self, pot: A) -> Self {
        self.pot = Some(pot);
        self
    }

    /// Buttons are active-low unless told otherwise.
    pub fn buttons_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }

    pub fn with_ranging(mut self, cfg: RangingCfg) -> Self {
        self.ranging = cfg;
        self
    }

    pub fn with_stabilizer(mut self, cfg: StabilizerCfg) -> Self {
        self.stabilizer = cfg;
        self
    }

    pub fn try_build(self) -> std::result::Result<TelemetrySampler<T, B, A>, BuildError> {
        let transducer = self.transducer.ok_or(BuildError::MissingTransducer)?;
        let (b1, b2) = self.buttons.ok_or(BuildError::MissingButtons)?;
        let pot = self.pot.ok_or(BuildError::MissingPot)?;
        self.stabilizer.validate()?;
        if self.ranging.echo_timeout.is_zero() {
            return Err(BuildError::InvalidConfig("echo_timeout must be > 0"));
        }
        if self.ranging.trigger_pulse_us == 0 {
            return Err(BuildError::InvalidConfig("trigger_pulse_us must be > 0"));
        }

        let active_low = self.active_low;
        let wrap = |line: B| {
            if active_low {
                Button::active_low(line)
            } else {
                Button::active_high(line)
            }
        };
        Ok(TelemetrySampler {
            ranging: RangingUnit::new(transducer, self.ranging),
            stabilizer: Stabilizer::new(self.stabilizer),
            btn1: wrap(b1),
            btn2: wrap(b2),
            pot: Potentiometer::new(pot),
            ticks: 0,
            last_raw: None,
        })
    }

    /// Like `try_build`, with the error wrapped for `?` in eyre contexts.
    pub fn build(self) -> Result<TelemetrySampler<T, B, A>> {
        Ok(self.try_build()?)
    }
}

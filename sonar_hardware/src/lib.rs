pub mod error;
pub mod mcp3208;
pub mod util;

#[cfg(feature = "hardware")]
pub mod hardware;

use sonar_traits::{AnalogInput, DigitalInput, Level, Transducer};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

/// Round-trip echo width in microseconds for a target at `mm`
/// (speed of sound 0.343 mm/µs).
pub fn echo_us_for_mm(mm: u32) -> u32 {
    let us = (f64::from(mm) * 2.0 / 0.343).round();
    if us >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        us as u32
    }
}

#[derive(Debug, Clone)]
enum EchoPattern {
    /// Pop scripted widths; silent once exhausted.
    Script(VecDeque<u32>),
    /// Same target every ping.
    Constant(u32),
    /// Triangle wave between two distances, dropping every n-th echo.
    Sweep {
        min_mm: u32,
        max_mm: u32,
        step_mm: u32,
        dropout_every: u32,
        pos_mm: u32,
        rising: bool,
        pings: u32,
    },
}

/// Simulated trigger/echo transducer.
///
/// An echo is only produced after a complete trigger pulse (LOW→HIGH→LOW),
/// and only if its width fits within the caller's timeout.
#[derive(Debug, Clone)]
pub struct SimulatedTransducer {
    pattern: EchoPattern,
    trigger: Level,
    armed: bool,
    triggers: u32,
    delayed_us: u64,
}

impl SimulatedTransducer {
    fn with_pattern(pattern: EchoPattern) -> Self {
        Self {
            pattern,
            trigger: Level::Low,
            armed: false,
            triggers: 0,
            delayed_us: 0,
        }
    }

    /// Replay the given echo widths (µs, 0 = no echo) once, then go silent.
    pub fn scripted(echo_us: impl IntoIterator<Item = u32>) -> Self {
        Self::with_pattern(EchoPattern::Script(echo_us.into_iter().collect()))
    }

    /// A target that never moves.
    pub fn constant_mm(mm: u32) -> Self {
        Self::with_pattern(EchoPattern::Constant(echo_us_for_mm(mm)))
    }

    /// A target swinging between `min_mm` and `max_mm`; every
    /// `dropout_every`-th ping is lost (0 disables dropouts).
    pub fn sweep(min_mm: u32, max_mm: u32, step_mm: u32, dropout_every: u32) -> Self {
        let (lo, hi) = if min_mm <= max_mm {
            (min_mm, max_mm)
        } else {
            (max_mm, min_mm)
        };
        Self::with_pattern(EchoPattern::Sweep {
            min_mm: lo,
            max_mm: hi,
            step_mm: step_mm.max(1),
            dropout_every,
            pos_mm: lo,
            rising: true,
            pings: 0,
        })
    }

    /// A transducer whose echo never returns.
    pub fn silent() -> Self {
        Self::scripted(std::iter::empty())
    }

    /// Number of complete trigger pulses seen so far.
    pub fn trigger_count(&self) -> u32 {
        self.triggers
    }

    /// Total time spent in `delay_us`.
    pub fn delayed_us(&self) -> u64 {
        self.delayed_us
    }

    fn next_echo_us(&mut self) -> u32 {
        match &mut self.pattern {
            EchoPattern::Script(q) => q.pop_front().unwrap_or(0),
            EchoPattern::Constant(us) => *us,
            EchoPattern::Sweep {
                min_mm,
                max_mm,
                step_mm,
                dropout_every,
                pos_mm,
                rising,
                pings,
            } => {
                *pings = pings.wrapping_add(1);
                let current = *pos_mm;
                if *rising {
                    *pos_mm = pos_mm.saturating_add(*step_mm).min(*max_mm);
                    if *pos_mm == *max_mm {
                        *rising = false;
                    }
                } else {
                    *pos_mm = pos_mm.saturating_sub(*step_mm).max(*min_mm);
                    if *pos_mm == *min_mm {
                        *rising = true;
                    }
                }
                if *dropout_every > 0 && *pings % *dropout_every == 0 {
                    0
                } else {
                    echo_us_for_mm(current)
                }
            }
        }
    }
}

impl Transducer for SimulatedTransducer {
    fn write_trigger(
        &mut self,
        level: Level,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match (self.trigger, level) {
            (Level::Low, Level::High) => self.armed = true,
            (Level::High, Level::Low) if self.armed => self.triggers += 1,
            _ => {}
        }
        self.trigger = level;
        Ok(())
    }

    fn read_pulse_us(
        &mut self,
        timeout: Duration,
    ) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        if !self.armed || self.trigger != Level::Low {
            return Ok(0);
        }
        self.armed = false;
        let us = self.next_echo_us();
        let limit = u32::try_from(timeout.as_micros()).unwrap_or(u32::MAX);
        let us = if us > limit { 0 } else { us };
        tracing::trace!(echo_us = us, "simulated echo");
        Ok(us)
    }

    fn delay_us(&mut self, us: u32) {
        self.delayed_us = self.delayed_us.saturating_add(u64::from(us));
    }
}

/// Bias resistor that holds a released button at its idle level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonBias {
    /// Button shorts the pin to ground; released reads HIGH.
    PullUp,
    /// Button shorts the pin to supply; released reads LOW.
    PullDown,
}

impl ButtonBias {
    pub fn for_polarity(active_low: bool) -> Self {
        if active_low {
            Self::PullUp
        } else {
            Self::PullDown
        }
    }

    /// Line level of a released button.
    pub fn idle_high(self) -> bool {
        self == Self::PullUp
    }
}

/// Simulated button line; the shared handle lets tests press it from outside.
#[derive(Debug, Clone)]
pub struct SimulatedButton {
    level_high: Rc<Cell<bool>>,
    idle_high: bool,
}

impl SimulatedButton {
    /// Released button on a pulled-up line (reads HIGH).
    pub fn new() -> Self {
        Self::with_bias(ButtonBias::PullUp)
    }

    /// Released button idling at the level `bias` gives it.
    pub fn with_bias(bias: ButtonBias) -> Self {
        let idle_high = bias.idle_high();
        Self {
            level_high: Rc::new(Cell::new(idle_high)),
            idle_high,
        }
    }

    /// Drive the line away from its idle level.
    pub fn press(&self) {
        self.level_high.set(!self.idle_high);
    }

    pub fn release(&self) {
        self.level_high.set(self.idle_high);
    }
}

impl Default for SimulatedButton {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitalInput for SimulatedButton {
    fn is_high(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.level_high.get())
    }
}

/// Simulated potentiometer channel.
#[derive(Debug, Clone)]
pub struct SimulatedPot {
    raw: Rc<Cell<u16>>,
}

impl SimulatedPot {
    pub fn new(raw: u16) -> Self {
        Self {
            raw: Rc::new(Cell::new(raw)),
        }
    }

    pub fn set(&self, raw: u16) {
        self.raw.set(raw);
    }
}

impl AnalogInput for SimulatedPot {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.raw.get())
    }
}

//! Distance stabilizer: turns a stream of noisy, sometimes missing raw
//! ranges into a smooth integer distance with no discontinuities.
//!
//! Per tick:
//! 1. **Gate**: accept `Distance(mm)` only inside `[dist_min_mm, dist_max_mm]`.
//! 2. **Hold**: an accepted reading replaces `last_accepted`; anything else
//!    leaves it alone.
//! 3. **Seed**: the first accepted reading becomes `smoothed` directly, so
//!    there is no ramp up from zero.
//! 4. **Slew**: the target (`last_accepted`) is clamped to within
//!    `max_step_mm` of the currently published value.
//! 5. **EMA**: `smoothed += alpha * (target - smoothed)`.
//! 6. **Publish**: `round(smoothed)`, or `0` until the first accepted reading.
//!
//! All arithmetic is `f64` with a single rounding at publish time, so the
//! same input sequence always yields the same outputs.

use crate::error::BuildError;
use crate::fixed_point::quantize_mm;
use crate::ranging::RawRange;

/// Nearest distance accepted as a real reading.
pub const DIST_MIN_MM: u32 = 50;
/// Farthest distance accepted as a real reading.
pub const DIST_MAX_MM: u32 = 2000;
/// EMA weight of each new target.
pub const EMA_ALPHA: f64 = 0.25;
/// Whether the slew limiter is active.
pub const SLEW_LIMIT_ENABLED: bool = true;
/// Largest change of the target relative to the published value per tick
/// (80 mm at 30 Hz is about 2.4 m/s).
pub const MAX_STEP_PER_TICK_MM: u32 = 80;
/// Published until the first reading is accepted.
pub const PLACEHOLDER_MM: u32 = 0;

/// Stabilizer policy. `Default` carries the compiled-in constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilizerCfg {
    pub dist_min_mm: u32,
    pub dist_max_mm: u32,
    /// Range: (0.0, 1.0].
    pub alpha: f64,
    /// `None` disables slew limiting.
    pub max_step_mm: Option<u32>,
}

impl Default for StabilizerCfg {
    fn default() -> Self {
        Self {
            dist_min_mm: DIST_MIN_MM,
            dist_max_mm: DIST_MAX_MM,
            alpha: EMA_ALPHA,
            max_step_mm: SLEW_LIMIT_ENABLED.then_some(MAX_STEP_PER_TICK_MM),
        }
    }
}

impl StabilizerCfg {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.dist_min_mm == 0 {
            return Err(BuildError::InvalidConfig("dist_min_mm must be > 0"));
        }
        if self.dist_min_mm > self.dist_max_mm {
            return Err(BuildError::InvalidConfig(
                "dist_min_mm must not exceed dist_max_mm",
            ));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(BuildError::InvalidConfig("alpha must be in (0.0, 1.0]"));
        }
        if self.max_step_mm == Some(0) {
            return Err(BuildError::InvalidConfig("max_step_mm must be > 0"));
        }
        Ok(())
    }

    /// The millimetre value of `raw` if it passes the validity gate.
    #[inline]
    pub fn accepts(&self, raw: RawRange) -> Option<u32> {
        raw.mm()
            .filter(|mm| (self.dist_min_mm..=self.dist_max_mm).contains(mm))
    }
}

/// Filter memory carried from one tick to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StabilizerState {
    /// Set by the first accepted reading; never cleared.
    pub initialized: bool,
    /// Most recent accepted reading (sample-and-hold).
    pub last_accepted: u32,
    /// Running estimate; meaningful only once `initialized`.
    pub smoothed: f64,
}

impl StabilizerState {
    pub const fn new() -> Self {
        Self {
            initialized: false,
            last_accepted: 0,
            smoothed: 0.0,
        }
    }

    /// Published value for this state.
    #[inline]
    pub fn output(&self) -> u32 {
        if self.initialized {
            quantize_mm(self.smoothed)
        } else {
            PLACEHOLDER_MM
        }
    }
}

/// Advance the filter by one tick.
///
/// Pure: the same `(raw, state, cfg)` always produces the same result.
pub fn update(
    raw: RawRange,
    state: StabilizerState,
    cfg: &StabilizerCfg,
) -> (u32, StabilizerState) {
    let mut next = state;

    if let Some(mm) = cfg.accepts(raw) {
        next.last_accepted = mm;
        if !next.initialized {
            next.initialized = true;
            next.smoothed = f64::from(mm);
            return (next.output(), next);
        }
    }

    if !next.initialized {
        return (PLACEHOLDER_MM, next);
    }

    let mut target = f64::from(next.last_accepted);
    if let Some(step) = cfg.max_step_mm {
        let anchor = f64::from(next.output());
        let step = f64::from(step);
        target = target.clamp(anchor - step, anchor + step);
    }
    next.smoothed += cfg.alpha * (target - next.smoothed);

    (next.output(), next)
}

/// Owns a `StabilizerState` and threads it through `update`.
#[derive(Debug, Clone, Default)]
pub struct Stabilizer {
    cfg: StabilizerCfg,
    state: StabilizerState,
}

impl Stabilizer {
    pub fn new(cfg: StabilizerCfg) -> Self {
        Self {
            cfg,
            state: StabilizerState::new(),
        }
    }

    pub fn step(&mut self, raw: RawRange) -> u32 {
        let (out, next) = update(raw, self.state, &self.cfg);
        self.state = next;
        out
    }

    pub fn state(&self) -> &StabilizerState {
        &self.state
    }

    pub fn cfg(&self) -> &StabilizerCfg {
        &self.cfg
    }
}

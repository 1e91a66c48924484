use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use sonar_traits::clock::Clock;
use sonar_traits::{AnalogInput, DigitalInput, Transducer};

use crate::error::Result as CoreResult;
use crate::record::RecordSink;
use crate::sampler::TelemetrySampler;
use crate::status::TickStatus;
use crate::tick::TickGate;

/// Loop limits for `run`.
#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    /// Nominal tick rate in Hz.
    pub tick_hz: u32,
    /// Stop after this many ticks (`None` runs until shutdown).
    pub max_ticks: Option<u64>,
}

/// Latency summary over the ticks of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    /// Ticks whose handler took longer than one period.
    pub overruns: u64,
    pub min_latency_us: u64,
    pub max_latency_us: u64,
    pub total_latency_us: u64,
}

impl RunStats {
    fn record(&mut self, latency_us: u64, period_us: u64) {
        if self.ticks == 0 || latency_us < self.min_latency_us {
            self.min_latency_us = latency_us;
        }
        self.max_latency_us = self.max_latency_us.max(latency_us);
        self.total_latency_us = self.total_latency_us.saturating_add(latency_us);
        self.ticks += 1;
        if latency_us > period_us {
            self.overruns += 1;
        }
    }

    pub fn mean_latency_us(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.total_latency_us as f64 / self.ticks as f64
        }
    }
}

/// Check the gate at `now` and, if a tick is due, sample and emit one record.
pub fn poll_tick<T, B, A, S>(
    sampler: &mut TelemetrySampler<T, B, A>,
    gate: &mut TickGate,
    sink: &mut S,
    now: Instant,
) -> CoreResult<TickStatus>
where
    T: Transducer,
    B: DigitalInput,
    A: AnalogInput,
    S: RecordSink + ?Sized,
{
    if !gate.poll(now) {
        return Ok(TickStatus::NotDue(gate.until_due(now)));
    }
    let record = sampler.sample()?;
    sink.emit(&record)?;
    Ok(TickStatus::Sampled(record))
}

/// Drive the sampler at a fixed rate until `shutdown` is raised or
/// `max_ticks` is reached.
///
/// Between ticks the loop sleeps on `clock` until the next tick is due. A
/// tick that overruns its period is counted, never queued: the next check
/// simply fires once and re-arms.
pub fn run<T, B, A, S, C>(
    sampler: &mut TelemetrySampler<T, B, A>,
    sink: &mut S,
    clock: &C,
    params: RunParams,
    shutdown: &AtomicBool,
) -> CoreResult<RunStats>
where
    T: Transducer,
    B: DigitalInput,
    A: AnalogInput,
    S: RecordSink + ?Sized,
    C: Clock + ?Sized,
{
    let mut gate = TickGate::from_hz(params.tick_hz);
    let period_us = crate::util::period_us(params.tick_hz);
    let mut stats = RunStats::default();

    sink.begin()?;
    tracing::info!(tick_hz = params.tick_hz, max_ticks = ?params.max_ticks, "sampling start");

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!(ticks = stats.ticks, "shutdown requested");
            break;
        }
        if params.max_ticks.is_some_and(|max| stats.ticks >= max) {
            break;
        }

        let now = clock.now();
        match poll_tick(sampler, &mut gate, sink, now)? {
            TickStatus::Sampled(_) => {
                let latency_us = clock.us_since(now);
                if latency_us > period_us {
                    tracing::debug!(latency_us, period_us, "tick overran its period");
                }
                stats.record(latency_us, period_us);
            }
            TickStatus::NotDue(wait) => clock.sleep(wait),
        }
    }

    sink.flush()?;
    tracing::info!(
        ticks = stats.ticks,
        overruns = stats.overruns,
        "sampling stop"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_track_min_max_and_overruns() {
        let mut s = RunStats::default();
        s.record(500, 1000);
        s.record(1500, 1000);
        s.record(200, 1000);
        assert_eq!(s.ticks, 3);
        assert_eq!(s.min_latency_us, 200);
        assert_eq!(s.max_latency_us, 1500);
        assert_eq!(s.overruns, 1);
        assert!((s.mean_latency_us() - 733.333).abs() < 0.01);
    }

    #[test]
    fn empty_stats_have_zero_mean() {
        assert_eq!(RunStats::default().mean_latency_us(), 0.0);
    }
}

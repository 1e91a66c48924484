//! Backend assembly and the sampling, replay and self-check commands.

use std::io::Write;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use sonar_core::error::Result as CoreResult;
use sonar_core::runner::{RunParams, RunStats};
use sonar_core::{RecordSink, TelemetryRecord, TelemetrySampler};
use sonar_traits::{AnalogInput, DigitalInput, MonotonicClock, Transducer};

use crate::cli::FormatArg;
use crate::output::{CsvSink, JsonlSink};
use crate::rt::setup_rt_once;

/// Sampler over boxed collaborators so sim and hardware share one type.
pub type DynSampler =
    TelemetrySampler<Box<dyn Transducer>, Box<dyn DigitalInput>, Box<dyn AnalogInput>>;

/// Which input backend a sampler was assembled from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Backend {
    Sim,
    #[cfg_attr(not(all(feature = "hardware", target_os = "linux")), allow(dead_code))]
    Hardware,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sim => "sim",
            Self::Hardware => "hardware",
        }
    }
}

/// Simulated-backend knobs, read from the environment.
///
/// - `SONAR_TEST_SIM_DISTANCE_MM=<mm>`: fixed target distance
/// - `SONAR_TEST_SIM_NO_ECHO=1`: echo never returns
/// - `SONAR_TEST_SIM_BTN1=1`, `SONAR_TEST_SIM_BTN2=1`: hold a button down
/// - `SONAR_TEST_SIM_POT=<raw>`: potentiometer reading (default mid-scale)
///
/// With no distance knob the target sweeps 150..=1500 mm with periodic
/// dropouts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimKnobs {
    pub distance_mm: Option<u32>,
    pub no_echo: bool,
    pub btn1: bool,
    pub btn2: bool,
    pub pot: Option<u16>,
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_num<N: std::str::FromStr>(name: &str) -> eyre::Result<Option<N>> {
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse::<N>()
            .map(Some)
            .map_err(|_| eyre::eyre!("{name} must be a non-negative integer, got {v:?}")),
        Err(_) => Ok(None),
    }
}

impl SimKnobs {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            distance_mm: env_num("SONAR_TEST_SIM_DISTANCE_MM")?,
            no_echo: env_flag("SONAR_TEST_SIM_NO_ECHO"),
            btn1: env_flag("SONAR_TEST_SIM_BTN1"),
            btn2: env_flag("SONAR_TEST_SIM_BTN2"),
            pot: env_num("SONAR_TEST_SIM_POT")?,
        })
    }

    fn transducer(&self) -> sonar_hardware::SimulatedTransducer {
        use sonar_hardware::SimulatedTransducer;
        if self.no_echo {
            SimulatedTransducer::silent()
        } else if let Some(mm) = self.distance_mm {
            SimulatedTransducer::constant_mm(mm)
        } else {
            SimulatedTransducer::sweep(150, 1500, 25, 17)
        }
    }
}

fn sim_inputs(
    knobs: &SimKnobs,
    active_low: bool,
) -> (Box<dyn DigitalInput>, Box<dyn DigitalInput>, Box<dyn AnalogInput>) {
    use sonar_hardware::{ButtonBias, SimulatedButton, SimulatedPot};
    let bias = ButtonBias::for_polarity(active_low);
    let b1 = SimulatedButton::with_bias(bias);
    let b2 = SimulatedButton::with_bias(bias);
    if knobs.btn1 {
        b1.press();
    }
    if knobs.btn2 {
        b2.press();
    }
    let pot = SimulatedPot::new(knobs.pot.unwrap_or(2048));
    (Box::new(b1), Box::new(b2), Box::new(pot))
}

/// Simulated sampler driven by `knobs`.
pub fn sim_sampler(cfg: &sonar_config::Config, knobs: &SimKnobs) -> eyre::Result<DynSampler> {
    let active_low = cfg.hardware.buttons_active_low;
    let (b1, b2, pot) = sim_inputs(knobs, active_low);
    let sampler = TelemetrySampler::builder()
        .with_transducer(Box::new(knobs.transducer()) as Box<dyn Transducer>)
        .with_buttons(b1, b2)
        .with_pot(pot)
        .buttons_active_low(active_low)
        .with_ranging((&cfg.ranging).into())
        .build()?;
    Ok(sampler)
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn hardware_sampler(cfg: &sonar_config::Config) -> eyre::Result<DynSampler> {
    use sonar_hardware::hardware::{HardwareButton, HardwareTransducer};
    use sonar_hardware::mcp3208::Mcp3208;

    let p = &cfg.pins;
    let transducer =
        HardwareTransducer::new(p.trigger, p.echo).wrap_err("open transducer pins")?;
    let active_low = cfg.hardware.buttons_active_low;
    let b1 = HardwareButton::new(p.button1, active_low).wrap_err("open button1 pin")?;
    let b2 = HardwareButton::new(p.button2, active_low).wrap_err("open button2 pin")?;
    let pot = Mcp3208::new(p.adc_channel, cfg.hardware.spi_clock_hz)
        .wrap_err("open MCP3208 on SPI0")?;
    tracing::info!(
        trigger = p.trigger,
        echo = p.echo,
        button1 = p.button1,
        button2 = p.button2,
        adc_channel = p.adc_channel,
        "hardware backend ready"
    );

    let sampler = TelemetrySampler::builder()
        .with_transducer(Box::new(transducer) as Box<dyn Transducer>)
        .with_buttons(
            Box::new(b1) as Box<dyn DigitalInput>,
            Box::new(b2) as Box<dyn DigitalInput>,
        )
        .with_pot(Box::new(pot) as Box<dyn AnalogInput>)
        .buttons_active_low(active_low)
        .with_ranging((&cfg.ranging).into())
        .build()?;
    Ok(sampler)
}

/// Hardware backend when built with `--features hardware` on Linux, the
/// simulator otherwise.
pub fn make_sampler(cfg: &sonar_config::Config) -> eyre::Result<(DynSampler, Backend)> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        Ok((hardware_sampler(cfg)?, Backend::Hardware))
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        let knobs = SimKnobs::from_env()?;
        tracing::debug!(?knobs, "simulated backend");
        Ok((sim_sampler(cfg, &knobs)?, Backend::Sim))
    }
}

fn make_sink<'a>(
    format: FormatArg,
    header: bool,
    out: impl Write + 'a,
) -> Box<dyn RecordSink + 'a> {
    match format {
        FormatArg::Csv => Box::new(CsvSink::new(out, header)),
        FormatArg::Jsonl => Box::new(JsonlSink::new(out)),
    }
}

/// Options for `sonar run`, already merged with the config.
#[derive(Debug, Clone, Copy)]
pub struct StreamOpts {
    pub params: RunParams,
    pub format: FormatArg,
    pub header: bool,
    pub stats: bool,
    pub rt: bool,
    pub rt_prio: Option<i32>,
}

pub fn run_stream(
    cfg: &sonar_config::Config,
    opts: StreamOpts,
    shutdown: &AtomicBool,
) -> CoreResult<RunStats> {
    setup_rt_once(opts.rt, opts.rt_prio);

    let (mut sampler, backend) = make_sampler(cfg)?;
    tracing::info!(backend = backend.name(), "backend selected");

    let stdout = std::io::stdout();
    let mut sink = make_sink(opts.format, opts.header, stdout.lock());
    let clock = MonotonicClock::new();
    let stats =
        sonar_core::runner::run(&mut sampler, sink.as_mut(), &clock, opts.params, shutdown)?;

    if opts.stats {
        print_stats(&stats, opts.params.tick_hz);
    }
    Ok(stats)
}

pub fn print_stats(stats: &RunStats, tick_hz: u32) {
    eprintln!(
        "ticks={} overruns={} period_us={} latency_us(min/mean/max)={}/{:.1}/{}",
        stats.ticks,
        stats.overruns,
        sonar_core::util::period_us(tick_hz),
        stats.min_latency_us,
        stats.mean_latency_us(),
        stats.max_latency_us
    );
}

/// Push every tick of a recorded echo trace through the pipeline, unpaced.
///
/// Buttons read released and the pot reads 0; only `dist_mm` carries
/// information from the trace.
pub fn run_replay(
    cfg: &sonar_config::Config,
    trace: &sonar_config::EchoTrace,
    format: FormatArg,
    header: bool,
) -> CoreResult<u64> {
    let echoes = trace.echoes_per_tick();
    let ticks = echoes.len() as u64;
    let knobs = SimKnobs {
        pot: Some(0),
        ..SimKnobs::default()
    };
    let active_low = cfg.hardware.buttons_active_low;
    let (b1, b2, pot) = sim_inputs(&knobs, active_low);
    let mut sampler: DynSampler = TelemetrySampler::builder()
        .with_transducer(
            Box::new(sonar_hardware::SimulatedTransducer::scripted(echoes)) as Box<dyn Transducer>,
        )
        .with_buttons(b1, b2)
        .with_pot(pot)
        .buttons_active_low(active_low)
        .with_ranging((&cfg.ranging).into())
        .build()?;

    let stdout = std::io::stdout();
    let mut sink = make_sink(format, header, stdout.lock());
    sink.begin()?;
    for _ in 0..ticks {
        let record = sampler.sample()?;
        sink.emit(&record)?;
    }
    sink.flush()?;
    tracing::info!(ticks, "replay complete");
    Ok(ticks)
}

/// One sample from a freshly assembled backend.
pub fn sample_once(cfg: &sonar_config::Config) -> CoreResult<(TelemetryRecord, Backend)> {
    let (mut sampler, backend) = make_sampler(cfg)?;
    let record = sampler.sample().wrap_err("first sample failed")?;
    Ok((record, backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> sonar_config::Config {
        sonar_config::load_toml(
            "[pins]\ntrigger = 23\necho = 24\nbutton1 = 17\nbutton2 = 27\n",
        )
        .unwrap()
    }

    #[test]
    fn sim_sampler_honours_knobs() {
        let knobs = SimKnobs {
            distance_mm: Some(500),
            btn2: true,
            pot: Some(17),
            ..SimKnobs::default()
        };
        let mut s = sim_sampler(&cfg(), &knobs).unwrap();
        assert_eq!(s.sample().unwrap().to_string(), "0,1,17,500");
    }

    #[test]
    fn no_echo_wins_over_distance() {
        let knobs = SimKnobs {
            distance_mm: Some(500),
            no_echo: true,
            ..SimKnobs::default()
        };
        let mut s = sim_sampler(&cfg(), &knobs).unwrap();
        for _ in 0..3 {
            assert_eq!(s.sample().unwrap().dist_mm, 0);
        }
    }

    #[test]
    fn default_sweep_starts_at_its_low_end() {
        let mut s = sim_sampler(&cfg(), &SimKnobs::default()).unwrap();
        assert_eq!(s.sample().unwrap().dist_mm, 150);
    }
}

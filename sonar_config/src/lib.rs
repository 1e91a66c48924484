#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and echo-trace parsing for the sonar sampler.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The echo-trace CSV loader enforces headers and tick ordering so a
//!   recorded session can be replayed through the stabilizer.
use serde::Deserialize;

/// Echo trace CSV schema.
///
/// Expected headers:
/// tick,echo_us
///
/// Example:
/// tick,echo_us
/// 0,2915
/// 1,0
/// 2,10496
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct EchoTraceRow {
    pub tick: u64,
    /// Echo pulse width in µs; 0 records a missed echo.
    pub echo_us: u32,
}

/// BCM pin numbers and the ADC channel.
#[derive(Debug, Deserialize)]
pub struct Pins {
    pub trigger: u8,
    pub echo: u8,
    pub button1: u8,
    pub button2: u8,
    /// MCP3208 input carrying the potentiometer wiper.
    #[serde(default)]
    pub adc_channel: u8,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingCfg {
    /// Nominal tick rate (Hz).
    pub tick_hz: u32,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self { tick_hz: 30 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RangingCfg {
    /// Hard deadline for the echo wait (ms).
    pub echo_timeout_ms: u64,
    pub trigger_pulse_us: u32,
    /// Trigger held low this long before each pulse.
    pub settle_us: u32,
}

impl Default for RangingCfg {
    fn default() -> Self {
        Self {
            echo_timeout_ms: 30,
            trigger_pulse_us: 10,
            settle_us: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `btn1,btn2,pot,dist_mm` lines
    #[default]
    Csv,
    /// One JSON object per line
    Jsonl,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputCfg {
    /// Emit the field-name header line before the stream.
    pub header: bool,
    pub format: OutputFormat,
}

impl Default for OutputCfg {
    fn default() -> Self {
        Self {
            header: true,
            format: OutputFormat::Csv,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// SPI clock for the MCP3208.
    pub spi_clock_hz: u32,
    /// Buttons pull the line low when pressed (internal pull-up); `false`
    /// selects active-high buttons on an internal pull-down.
    pub buttons_active_low: bool,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            spi_clock_hz: 1_000_000,
            buttons_active_low: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    #[serde(default)]
    pub sampling: SamplingCfg,
    #[serde(default)]
    pub ranging: RangingCfg,
    #[serde(default)]
    pub output: OutputCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub hardware: Hardware,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Whole milliseconds in one tick at `tick_hz`, floored at 1 ms.
pub fn tick_period_ms(tick_hz: u32) -> u64 {
    (1_000 / u64::from(tick_hz.max(1))).max(1)
}

/// Longest tick span a trace may cover (about 3 days at 30 Hz).
pub const MAX_TRACE_SPAN_TICKS: u64 = 8_000_000;

const ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        let p = &self.pins;
        let gpio = [
            ("trigger", p.trigger),
            ("echo", p.echo),
            ("button1", p.button1),
            ("button2", p.button2),
        ];
        for (i, (name_a, a)) in gpio.iter().enumerate() {
            if *a > 27 {
                eyre::bail!("pins.{name_a} must be a BCM GPIO in 0..=27, got {a}");
            }
            for (name_b, b) in &gpio[i + 1..] {
                if a == b {
                    eyre::bail!("pins.{name_a} and pins.{name_b} share GPIO {a}");
                }
            }
        }
        if p.adc_channel > 7 {
            eyre::bail!("pins.adc_channel must be in 0..=7");
        }

        // Sampling
        if self.sampling.tick_hz == 0 {
            eyre::bail!("sampling.tick_hz must be > 0");
        }
        if self.sampling.tick_hz > 1000 {
            eyre::bail!("sampling.tick_hz must be <= 1000");
        }

        // Ranging
        if self.ranging.echo_timeout_ms == 0 {
            eyre::bail!("ranging.echo_timeout_ms must be >= 1");
        }
        if self.ranging.echo_timeout_ms > 1000 {
            eyre::bail!("ranging.echo_timeout_ms is unreasonably large (>1s)");
        }
        if !(1..=100).contains(&self.ranging.trigger_pulse_us) {
            eyre::bail!("ranging.trigger_pulse_us must be in 1..=100");
        }
        if self.ranging.settle_us > 100 {
            eyre::bail!("ranging.settle_us must be <= 100");
        }

        // Hardware
        if !(10_000..=2_000_000).contains(&self.hardware.spi_clock_hz) {
            eyre::bail!("hardware.spi_clock_hz must be in 10000..=2000000");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !ROTATIONS.contains(&r.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {r}");
        }
        if let Some(l) = self.logging.level.as_deref()
            && !LEVELS.contains(&l.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.level must be one of error|warn|info|debug|trace, got {l}");
        }

        Ok(())
    }

    /// Echo timeout exceeds one configured tick period; ticks will overrun
    /// when the echo is missing.
    pub fn echo_timeout_exceeds_tick(&self) -> bool {
        self.echo_timeout_exceeds_period(self.sampling.tick_hz)
    }

    /// Same check against a rate other than `sampling.tick_hz`.
    pub fn echo_timeout_exceeds_period(&self, tick_hz: u32) -> bool {
        self.ranging.echo_timeout_ms > tick_period_ms(tick_hz)
    }
}

/// An ordered, validated echo trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoTrace {
    rows: Vec<EchoTraceRow>,
}

impl EchoTrace {
    pub fn from_rows(rows: Vec<EchoTraceRow>) -> eyre::Result<Self> {
        if rows.is_empty() {
            eyre::bail!("echo trace has no rows");
        }
        for pair in rows.windows(2) {
            if pair[1].tick <= pair[0].tick {
                eyre::bail!(
                    "echo trace ticks must be strictly increasing (tick {} follows {})",
                    pair[1].tick,
                    pair[0].tick
                );
            }
        }
        if let (Some(first), Some(last)) = (rows.first(), rows.last())
            && last.tick - first.tick >= MAX_TRACE_SPAN_TICKS
        {
            eyre::bail!(
                "echo trace spans {} ticks (limit {MAX_TRACE_SPAN_TICKS})",
                last.tick - first.tick + 1
            );
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[EchoTraceRow] {
        &self.rows
    }

    /// One echo width per tick from the first to the last recorded tick.
    /// Ticks absent from the trace are missed echoes (0).
    pub fn echoes_per_tick(&self) -> Vec<u32> {
        let first = self.rows.first().map_or(0, |r| r.tick);
        let mut out = Vec::with_capacity(self.rows.len());
        let mut next = first;
        for row in &self.rows {
            while next < row.tick {
                out.push(0);
                next += 1;
            }
            out.push(row.echo_us);
            next = row.tick + 1;
        }
        out
    }
}

impl TryFrom<Vec<EchoTraceRow>> for EchoTrace {
    type Error = eyre::Report;
    fn try_from(rows: Vec<EchoTraceRow>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

/// Parse an echo trace from any reader (headers enforced).
pub fn parse_echo_trace<R: std::io::Read>(reader: R) -> eyre::Result<EchoTrace> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers: {}", e))?
        .clone();
    let expected = ["tick", "echo_us"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "echo trace CSV must have headers 'tick,echo_us', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<EchoTraceRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    EchoTrace::try_from(rows)
}

pub fn load_echo_trace_csv(path: &std::path::Path) -> eyre::Result<EchoTrace> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open echo trace CSV {:?}: {}", path, e))?;
    parse_echo_trace(file)
}

//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "sonar", version, about = "Ultrasonic ranging telemetry sampler")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/sonar_config.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Record stream encoding on stdout.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FormatArg {
    /// `btn1,btn2,pot,dist_mm` lines
    Csv,
    /// One JSON object per line
    Jsonl,
}

impl From<sonar_config::OutputFormat> for FormatArg {
    fn from(f: sonar_config::OutputFormat) -> Self {
        match f {
            sonar_config::OutputFormat::Csv => Self::Csv,
            sonar_config::OutputFormat::Jsonl => Self::Jsonl,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample the sensors at a fixed rate and stream one record per tick
    Run {
        /// Stop after this many ticks (default: run until Ctrl-C)
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Override sampling.tick_hz from the config
        #[arg(long, value_name = "HZ")]
        tick_hz: Option<u32>,
        /// Override output.format from the config
        #[arg(long, value_enum, value_name = "FORMAT")]
        format: Option<FormatArg>,
        /// Suppress the field-name header line
        #[arg(long, action = ArgAction::SetTrue)]
        no_header: bool,
        /// Print tick latency statistics to stderr on exit
        #[arg(long, action = ArgAction::SetTrue)]
        stats: bool,
        /// Enable real-time mode (SCHED_FIFO, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on Linux.\n\nAttempts SCHED_FIFO priority and calls mlockall(MCL_CURRENT|MCL_FUTURE) to keep echo timing free of scheduler and page-fault jitter. May require elevated privileges or a raised memlock ulimit. Failures are logged and the run continues with default scheduling."
        )]
        rt: bool,
        /// Real-time priority for SCHED_FIFO on Linux (1..=max)
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
    },
    /// Feed a recorded echo trace (CSV `tick,echo_us`) through the stabilizer
    Replay {
        /// Echo trace CSV (strict header)
        #[arg(long, value_name = "FILE")]
        trace: PathBuf,
        /// Override output.format from the config
        #[arg(long, value_enum, value_name = "FORMAT")]
        format: Option<FormatArg>,
        /// Suppress the field-name header line
        #[arg(long, action = ArgAction::SetTrue)]
        no_header: bool,
    },
    /// Assemble the backend, take one sample, and report it
    SelfCheck,
    /// Report backend, effective timing, and one sample as JSON
    Health,
}

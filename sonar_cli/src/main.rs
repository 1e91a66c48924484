mod cli;
mod error_fmt;
mod output;
mod rt;
mod stream;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::stream::StreamOpts;
use sonar_core::SonarError;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn load_config(path: &Path) -> Result<sonar_config::Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SonarError::Config(format!("read config {}: {e}", path.display())))?;
    let cfg = sonar_config::load_toml(&text)
        .map_err(|e| SonarError::Config(format!("parse {}: {e}", path.display())))?;
    cfg.validate().map_err(|e| SonarError::Config(e.to_string()))?;
    Ok(cfg)
}

fn init_tracing(cli: &Cli, logging: &sonar_config::Logging) -> Result<()> {
    // Config level wins over the CLI default; RUST_LOG wins over both.
    let level = logging.level.as_deref().unwrap_or(&cli.log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (json_layer, text_layer) = if cli.json {
        (
            Some(fmt::layer().json().with_writer(std::io::stderr)),
            None,
        )
    } else {
        (
            None,
            Some(fmt::layer().with_writer(std::io::stderr).with_target(false)),
        )
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
            let appender = match logging.rotation.as_deref().map(str::to_ascii_lowercase) {
                Some(r) if r == "daily" => tracing_appender::rolling::daily(dir, name),
                Some(r) if r == "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))?;
    Ok(())
}

fn install_shutdown() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .wrap_err("install Ctrl-C handler")?;
    Ok(flag)
}

fn real_main(cli: Cli) -> Result<()> {
    let cfg = load_config(&cli.config)?;
    init_tracing(&cli, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    match cli.cmd {
        Commands::Run {
            ticks,
            tick_hz,
            format,
            no_header,
            stats,
            rt,
            rt_prio,
        } => {
            let tick_hz = tick_hz.unwrap_or(cfg.sampling.tick_hz);
            if !(1..=1000).contains(&tick_hz) {
                return Err(SonarError::Config(format!(
                    "--tick-hz must be in 1..=1000, got {tick_hz}"
                ))
                .into());
            }
            if cfg.echo_timeout_exceeds_period(tick_hz) {
                tracing::warn!(
                    echo_timeout_ms = cfg.ranging.echo_timeout_ms,
                    period_ms = sonar_config::tick_period_ms(tick_hz),
                    "echo timeout exceeds the tick period; missed echoes will overrun ticks"
                );
            }

            let shutdown = install_shutdown()?;
            let opts = StreamOpts {
                params: sonar_core::RunParams {
                    tick_hz,
                    max_ticks: ticks,
                },
                format: format.unwrap_or_else(|| cfg.output.format.into()),
                header: cfg.output.header && !no_header,
                stats,
                rt,
                rt_prio,
            };
            stream::run_stream(&cfg, opts, &shutdown)?;
        }
        Commands::Replay {
            trace,
            format,
            no_header,
        } => {
            let echo_trace = sonar_config::load_echo_trace_csv(&trace)?;
            stream::run_replay(
                &cfg,
                &echo_trace,
                format.unwrap_or_else(|| cfg.output.format.into()),
                cfg.output.header && !no_header,
            )?;
        }
        Commands::SelfCheck => {
            let (record, backend) = stream::sample_once(&cfg)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "ok": true,
                        "backend": backend.name(),
                        "record": record.to_string(),
                    })
                );
            } else {
                println!("self-check ok ({}): {record}", backend.name());
            }
        }
        Commands::Health => {
            let (record, backend) = stream::sample_once(&cfg)?;
            println!(
                "{}",
                serde_json::json!({
                    "status": "ok",
                    "backend": backend.name(),
                    "tick_hz": cfg.sampling.tick_hz,
                    "period_us": sonar_core::util::period_us(cfg.sampling.tick_hz),
                    "echo_timeout_ms": cfg.ranging.echo_timeout_ms,
                    "echo_timeout_exceeds_tick": cfg.echo_timeout_exceeds_tick(),
                    "sample": {
                        "btn1": u8::from(record.btn1),
                        "btn2": u8::from(record.btn2),
                        "pot": record.pot,
                        "dist_mm": record.dist_mm,
                    },
                })
            );
        }
    }
    Ok(())
}

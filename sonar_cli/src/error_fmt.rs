//! Human-readable error descriptions and structured JSON error formatting.

use sonar_core::error::{BuildError, SonarError};
use sonar_hardware::error::HwError;

/// Stable machine-readable name for the error class.
pub fn error_reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    if err.downcast_ref::<HwError>().is_some() {
        return "Hardware";
    }
    if let Some(se) = err.downcast_ref::<SonarError>() {
        return match se {
            SonarError::Hardware(_) | SonarError::HardwareFault(_) => "Hardware",
            SonarError::Config(_) => "Config",
            SonarError::Output(_) => "Output",
        };
    }
    if chain_text(err).to_ascii_lowercase().contains("echo trace") {
        return "Trace";
    }
    "Other"
}

fn chain_text(err: &eyre::Report) -> String {
    err.chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingTransducer => {
                "What happened: No ranging transducer was provided to the sampler.\nLikely causes: The trigger/echo pins failed to open or were not wired into the builder.\nHow to fix: Ensure the transducer is created successfully and passed via with_transducer(...).".to_string()
            }
            BuildError::MissingButtons => {
                "What happened: Button inputs were not provided to the sampler.\nLikely causes: A button GPIO failed to open.\nHow to fix: Check pins.button1 and pins.button2 in the config.".to_string()
            }
            BuildError::MissingPot => {
                "What happened: No potentiometer input was provided to the sampler.\nLikely causes: The MCP3208 failed to initialize.\nHow to fix: Check SPI is enabled and pins.adc_channel is correct.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SonarError>() {
        return match se {
            SonarError::Output(m) => format!(
                "What happened: Writing the record stream failed ({m}).\nLikely causes: The reading end of stdout was closed.\nHow to fix: Keep the consumer attached, or bound the run with --ticks."
            ),
            SonarError::Hardware(m) | SonarError::HardwareFault(m) => format!(
                "What happened: An input could not be read ({m}).\nLikely causes: Loose wiring, wrong pin numbers, or missing GPIO/SPI permissions.\nHow to fix: Verify [pins] in the config and that the process can access /dev/gpiomem and /dev/spidev0.0."
            ),
            SonarError::Config(m) => format!(
                "What happened: Configuration is invalid or unreadable ({m}).\nLikely causes: Wrong --config path, missing [pins] (trigger, echo, button1, button2), or out-of-range values.\nHow to fix: Edit the TOML config (see etc/sonar_config.toml) and try again."
            ),
        };
    }

    let msg = chain_text(err);

    if err.downcast_ref::<HwError>().is_some() {
        return format!(
            "What happened: Failed to initialize hardware.\nLikely causes: Incorrect pin numbers, SPI disabled, or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO and SPI.\nDetail: {msg}"
        );
    }

    // Echo trace CSV header special-case
    if msg
        .to_ascii_lowercase()
        .contains("echo trace csv must have headers")
    {
        return "Invalid headers in echo trace CSV. Expected 'tick,echo_us'.".to_string();
    }

    // Generic fallback
    format!(
        "Something went wrong.\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Exit codes: 2 config, 3 hardware, 4 output, 5 sampler build, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match error_reason_name(err) {
        "Config" => 2,
        "Hardware" => 3,
        "Output" => 4,
        "Build" => 5,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": error_reason_name(err),
        "message": humanize(err),
        "exit_code": exit_code_for_error(err),
    })
    .to_string()
}

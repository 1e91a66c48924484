#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core sampling logic (hardware-agnostic).
//!
//! All hardware interactions go through the `sonar_traits` capability traits
//! (`Transducer`, `DigitalInput`, `AnalogInput`, `Clock`).
//!
//! ## Architecture
//!
//! - **Ranging**: trigger/echo timing to `RawRange` (`ranging` module)
//! - **Stabilizer**: gating, sample-and-hold, slew limit, EMA (`stabilizer` module)
//! - **Inputs**: active-low buttons and the 12-bit pot (`inputs` module)
//! - **Sampler**: one tick of the full pipeline (`sampler` module)
//! - **Tick gate / runner**: fixed-rate pacing without backlog (`tick`, `runner`)
//!
//! The stabilizer is a pure function of `(raw, state)`; the sampler owns
//! the state and is the only writer.

pub mod config;
pub mod conversions;
pub mod error;
pub mod fixed_point;
pub mod hw_error;
pub mod inputs;
pub mod mocks;
pub mod ranging;
pub mod record;
pub mod runner;
pub mod sampler;
pub mod stabilizer;
pub mod status;
pub mod tick;
pub mod util;

pub use config::{RangingCfg, SamplingCfg};
pub use error::{BuildError, SonarError};
pub use inputs::{Button, POT_MAX, Potentiometer};
pub use ranging::{RangingUnit, RawRange};
pub use record::{HEADER, RecordSink, TelemetryRecord};
pub use runner::{RunParams, RunStats};
pub use sampler::{SamplerBuilder, TelemetrySampler};
pub use stabilizer::{Stabilizer, StabilizerCfg, StabilizerState, update};
pub use status::TickStatus;
pub use tick::TickGate;

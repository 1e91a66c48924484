//! Result of one pass through the tick loop.

use std::time::Duration;

use crate::record::TelemetryRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum TickStatus {
    /// A tick was due; this is what it produced.
    Sampled(TelemetryRecord),
    /// Not due yet; the next tick is this far away.
    NotDue(Duration),
}

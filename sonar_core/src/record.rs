//! Per-tick telemetry record and its line format.

use std::fmt;

/// Field names in output order.
pub const HEADER: [&str; 4] = ["btn1", "btn2", "pot", "dist_mm"];

/// One tick's worth of output: `<btn1>,<btn2>,<pot>,<dist_mm>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetryRecord {
    pub btn1: bool,
    pub btn2: bool,
    /// `[0, 4095]`
    pub pot: u16,
    /// Stabilized distance, or 0 before the first valid echo.
    pub dist_mm: u32,
}

impl TelemetryRecord {
    /// Field values in `HEADER` order.
    pub fn fields(&self) -> [String; 4] {
        [
            u8::from(self.btn1).to_string(),
            u8::from(self.btn2).to_string(),
            self.pot.to_string(),
            self.dist_mm.to_string(),
        ]
    }
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            u8::from(self.btn1),
            u8::from(self.btn2),
            self.pot,
            self.dist_mm
        )
    }
}

/// Destination for the record stream.
pub trait RecordSink {
    /// Called once before the first record (e.g. to write a header).
    fn begin(&mut self) -> crate::error::Result<()> {
        Ok(())
    }

    fn emit(&mut self, record: &TelemetryRecord) -> crate::error::Result<()>;

    fn flush(&mut self) -> crate::error::Result<()> {
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn begin(&mut self) -> crate::error::Result<()> {
        (**self).begin()
    }

    fn emit(&mut self, record: &TelemetryRecord) -> crate::error::Result<()> {
        (**self).emit(record)
    }

    fn flush(&mut self) -> crate::error::Result<()> {
        (**self).flush()
    }
}

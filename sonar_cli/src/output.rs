//! Record sinks for stdout: CSV lines or JSON lines.

use std::io::Write;

use serde_json::json;
use sonar_core::error::{Result, SonarError};
use sonar_core::{HEADER, RecordSink, TelemetryRecord};

fn output_err(e: impl std::fmt::Display) -> SonarError {
    SonarError::Output(e.to_string())
}

/// `btn1,btn2,pot,dist_mm` lines, flushed per record so consumers see each
/// tick as it happens.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    header: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W, header: bool) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(out);
        Self { writer, header }
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn begin(&mut self) -> Result<()> {
        if self.header {
            self.writer.write_record(HEADER).map_err(output_err)?;
            self.writer.flush().map_err(output_err)?;
        }
        Ok(())
    }

    fn emit(&mut self, record: &TelemetryRecord) -> Result<()> {
        self.writer
            .write_record(record.fields())
            .map_err(output_err)?;
        self.writer.flush().map_err(output_err)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(output_err)?;
        Ok(())
    }
}

/// One JSON object per tick: `{"tick":0,"btn1":0,"btn2":0,"pot":2048,"dist_mm":500}`.
pub struct JsonlSink<W: Write> {
    out: W,
    tick: u64,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, tick: 0 }
    }
}

impl<W: Write> RecordSink for JsonlSink<W> {
    fn emit(&mut self, record: &TelemetryRecord) -> Result<()> {
        let line = json!({
            "tick": self.tick,
            "btn1": u8::from(record.btn1),
            "btn2": u8::from(record.btn2),
            "pot": record.pot,
            "dist_mm": record.dist_mm,
        });
        writeln!(self.out, "{line}").map_err(output_err)?;
        self.out.flush().map_err(output_err)?;
        self.tick += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(output_err)?;
        Ok(())
    }
}

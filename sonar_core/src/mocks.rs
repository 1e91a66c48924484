//! Test and helper mocks for sonar_core

use crate::record::{RecordSink, TelemetryRecord};

/// Collects every emitted record in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub began: bool,
    pub flushed: bool,
    pub records: Vec<TelemetryRecord>,
}

impl RecordSink for VecSink {
    fn begin(&mut self) -> crate::error::Result<()> {
        self.began = true;
        Ok(())
    }

    fn emit(&mut self, record: &TelemetryRecord) -> crate::error::Result<()> {
        self.records.push(*record);
        Ok(())
    }

    fn flush(&mut self) -> crate::error::Result<()> {
        self.flushed = true;
        Ok(())
    }
}

/// An input line that always fails; useful for error-path tests.
#[derive(Debug, Default)]
pub struct FailingInput;

impl sonar_traits::DigitalInput for FailingInput {
    fn is_high(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("input line unavailable")))
    }
}

impl sonar_traits::AnalogInput for FailingInput {
    fn read_raw(&mut self) -> Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("adc unavailable")))
    }
}

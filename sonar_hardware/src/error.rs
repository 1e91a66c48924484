use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("adc channel {0} out of range (0..=7)")]
    AdcChannel(u8),
    #[error("adc short transfer: {0} of 3 bytes")]
    AdcShortTransfer(usize),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;

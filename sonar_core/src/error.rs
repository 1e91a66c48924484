use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SonarError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("output error: {0}")]
    Output(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing transducer")]
    MissingTransducer,
    #[error("missing buttons")]
    MissingButtons,
    #[error("missing potentiometer")]
    MissingPot,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

//! Maps `Box<dyn Error>` from trait boundaries to typed `SonarError`.
//!
//! The traits in `sonar_traits` use `Box<dyn Error + Send + Sync>` so any
//! platform can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `sonar_hardware::HwError`.

use crate::error::SonarError;

/// Map a trait-boundary error to a typed `SonarError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to the error's message.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> SonarError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<sonar_hardware::error::HwError>() {
            return match hw {
                sonar_hardware::error::HwError::Io(io) => SonarError::Hardware(io.to_string()),
                other => SonarError::HardwareFault(other.to_string()),
            };
        }
    }

    SonarError::Hardware(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_errors_keep_their_message() {
        let e = std::io::Error::other("bus glitch");
        match map_hw_error(&e) {
            SonarError::Hardware(msg) => assert_eq!(msg, "bus glitch"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hardware_errors_become_faults() {
        let e = sonar_hardware::error::HwError::AdcChannel(9);
        assert!(matches!(map_hw_error(&e), SonarError::HardwareFault(_)));
    }
}

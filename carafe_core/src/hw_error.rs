//! Maps `Box<dyn Error>` from trait boundaries to typed `StationError`.
//!
//! The traits in `carafe_traits` use `Box<dyn Error + Send + Sync>` for maximum
//! flexibility; this module converts those to our typed error enum, with an
//! optional feature-gated path for `carafe_hardware::HwError` downcasting.

use crate::error::StationError;

/// Map a trait-boundary error to a typed `StationError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> StationError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<carafe_hardware::error::HwError>() {
            return match hw {
                carafe_hardware::error::HwError::Timeout => StationError::Timeout,
                carafe_hardware::error::HwError::DataReadyTimeout => StationError::Timeout,
                other => StationError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        StationError::Timeout
    } else {
        StationError::Hardware(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_strings_map_to_timeout() {
        let e: Box<dyn std::error::Error + Send + Sync> = "scale read timeout".into();
        assert_eq!(map_hw_error(e.as_ref()), StationError::Timeout);
    }

    #[test]
    fn other_strings_map_to_hardware() {
        let e: Box<dyn std::error::Error + Send + Sync> = "i2c nack".into();
        assert_eq!(
            map_hw_error(e.as_ref()),
            StationError::Hardware("i2c nack".into())
        );
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_hw_errors_are_downcast() {
        use carafe_hardware::error::HwError;
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::DataReadyTimeout);
        assert_eq!(map_hw_error(e.as_ref()), StationError::Timeout);
        let e: Box<dyn std::error::Error + Send + Sync> = Box::new(HwError::I2c("nack".into()));
        assert!(matches!(map_hw_error(e.as_ref()), StationError::HardwareFault(_)));
    }
}

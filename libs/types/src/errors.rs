//! Error types for value construction
//!
//! Raised when parsing or validating the shared value types.

use thiserror::Error;

/// Errors produced by the types library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },

    #[error("Invalid commission policy: {mantissa}e-{scale} percent is not below 100%")]
    InvalidPolicy { mantissa: u64, scale: u8 },

    #[error("Arithmetic overflow in fee calculation")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_policy_display() {
        let err = TypesError::InvalidPolicy {
            mantissa: 1000,
            scale: 1,
        };
        assert!(err.to_string().contains("1000e-1"));
    }

    #[test]
    fn test_invalid_address_display() {
        let err = TypesError::InvalidAddress {
            reason: "too short".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid address: too short");
    }
}

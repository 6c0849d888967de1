//! Validation Error Types

use thiserror::Error;

/// Errors during speed sample validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite sample
    #[error("{field} value {value} is not finite")]
    NonFinite { field: &'static str, value: f64 },
}

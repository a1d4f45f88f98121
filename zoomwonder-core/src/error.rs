//! Core error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecimalError {
    #[error("Failed to parse decimal {input:?}: {reason}")]
    Parse { input: String, reason: String },

    #[error("Cannot represent non-finite value {0} as a decimal")]
    NonFinite(f64),
}

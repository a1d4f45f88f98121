//! Gesture and controller error types.

use thiserror::Error;
use zoomwonder_core::DecimalError;

use crate::target::TargetId;

#[derive(Debug, Error)]
pub enum ZoomError {
    #[error("Unknown target {0}")]
    UnknownTarget(TargetId),

    #[error("Unknown event type: {0}")]
    UnknownEvent(String),

    #[error("Invalid zoom settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error(transparent)]
    Decimal(#[from] DecimalError),
}

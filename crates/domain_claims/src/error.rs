//! Claims domain errors

use thiserror::Error;

use crate::claim::ClaimStatus;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: ClaimStatus, to: ClaimStatus },

    #[error("Unknown {kind} value: {value}")]
    UnknownEnumValue { kind: &'static str, value: String },

    #[error("Damage factor must be within [0.0, 1.0], got {0}")]
    DamageFactorOutOfRange(f64),
}

//! Error types for the Verifier.

use cryptoconditions_core::ConditionError;
use thiserror::Error;

/// Errors that can occur while publishing or verifying.
///
/// A fulfillment that parses but does not satisfy the condition is not an
/// error; [`crate::Verifier::verify`] returns `Ok(false)` for it.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Malformed input or incomplete fulfillment.
    #[error("condition error: {0}")]
    Condition(#[from] ConditionError),

    /// The condition needs a suite this verifier does not support.
    #[error("unsupported features: required {required:#x}, supported {supported:#x}")]
    UnsupportedFeatures { required: u32, supported: u32 },

    /// The fulfillment payload is larger than the configured limit.
    #[error("fulfillment too large: {size} bytes exceeds limit of {limit}")]
    FulfillmentTooLarge { size: usize, limit: usize },
}

/// Result type for Verifier operations.
pub type Result<T> = std::result::Result<T, VerifyError>;

//! Error types for crypto-condition operations.

use thiserror::Error;

/// Broad classification of a [`ConditionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed URI or binary input.
    Format,
    /// Operation invoked on an incompletely configured instance, or a tree
    /// that could not be rendered.
    State,
    /// Structurally valid tree whose contract is unmet (threshold not reached).
    Input,
}

/// Errors that can occur while building, encoding or decoding conditions
/// and fulfillments.
///
/// A failed signature or an unmet threshold during `validate` is never an
/// error; `validate` reports those as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("invalid uri: {0}")]
    InvalidUri(String),

    #[error("decoding error: {0}")]
    Decoding(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("fulfillment nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),

    #[error("unsupported fulfillment type: {0}")]
    UnsupportedType(u64),

    #[error("invalid {field} length: expected {expected}, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("non-canonical encoding: {0}")]
    NonCanonical(String),

    #[error("unsupported subcondition weight: {0}")]
    UnsupportedWeight(u64),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("threshold not reached: need {threshold}, have {available}")]
    ThresholdNotReached { threshold: u64, available: u64 },
}

impl ConditionError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConditionError::MissingField(_) | ConditionError::Encoding(_) => ErrorKind::State,
            ConditionError::ThresholdNotReached { .. } => ErrorKind::Input,
            _ => ErrorKind::Format,
        }
    }

    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}

/// Result type for crypto-condition operations.
pub type Result<T> = std::result::Result<T, ConditionError>;

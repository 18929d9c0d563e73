//! Fulfillment type registry and feature bitmasks.
//!
//! Every fulfillment variant has a stable integer type identifier which is
//! also its feature bit. A condition advertises the OR of the bits needed
//! anywhere in its tree so a verifier can reject unsupported suites before
//! parsing the fulfillment.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConditionError, Result};

/// Feature bit of the SHA-256 preimage suite.
pub const PREIMAGE_SHA256: u32 = 0x01;

/// Feature bit reserved for prefix conditions. Not implemented.
pub const PREFIX_SHA256: u32 = 0x02;

/// Feature bit of the threshold combinator.
pub const THRESHOLD_SHA256: u32 = 0x04;

/// Feature bit of the Ed25519 signature suite.
pub const ED25519: u32 = 0x08;

/// All feature bits this crate can verify.
pub const SUPPORTED_BITMASK: u32 = PREIMAGE_SHA256 | THRESHOLD_SHA256 | ED25519;

/// Discriminator for the implemented fulfillment variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum FulfillmentType {
    /// SHA-256 hash preimage.
    PreimageSha256 = PREIMAGE_SHA256,
    /// M-of-N combinator over nested conditions.
    ThresholdSha256 = THRESHOLD_SHA256,
    /// Ed25519 signature over prefix || dynamic message.
    Ed25519Sha256 = ED25519,
}

impl FulfillmentType {
    /// The wire type identifier.
    pub const fn type_id(self) -> u32 {
        self as u32
    }

    /// The feature bit contributed by this variant alone.
    pub const fn feature_bit(self) -> u32 {
        self as u32
    }

    /// Look up a variant by wire type identifier.
    pub fn from_type_id(type_id: u64) -> Result<Self> {
        match type_id {
            t if t == PREIMAGE_SHA256 as u64 => Ok(Self::PreimageSha256),
            t if t == THRESHOLD_SHA256 as u64 => Ok(Self::ThresholdSha256),
            t if t == ED25519 as u64 => Ok(Self::Ed25519Sha256),
            other => Err(ConditionError::UnsupportedType(other)),
        }
    }
}

impl fmt::Display for FulfillmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PreimageSha256 => "preimage-sha-256",
            Self::ThresholdSha256 => "threshold-sha-256",
            Self::Ed25519Sha256 => "ed25519-sha-256",
        };
        f.write_str(name)
    }
}

/// Check that every bit of `required` is present in `supported`.
pub fn is_supported(required: u32, supported: u32) -> bool {
    required & !supported == 0
}

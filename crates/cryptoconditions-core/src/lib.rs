//! # Crypto-Conditions Core
//!
//! Pure primitives for crypto-conditions: conditions, fulfillments, and their
//! canonical encoding.
//!
//! This crate contains no I/O and no logging. It is pure computation over
//! hashes and signatures.
//!
//! ## Key Types
//!
//! - [`Condition`] - Public commitment: feature bitmask, hash, max fulfillment length
//! - [`Fulfillment`] - Proof that satisfies a condition (one of the variants below)
//! - [`PreimageSha256Fulfillment`] - Reveals a SHA-256 preimage
//! - [`Ed25519Sha256Fulfillment`] - Ed25519 signature over prefix || message
//! - [`ThresholdSha256Fulfillment`] - M-of-N combinator over nested conditions
//!
//! ## Canonical Encoding
//!
//! Condition hashes are computed over canonical bytes. See the [`codec`]
//! module for the primitives and each variant module for its layout.

pub mod codec;
pub mod condition;
pub mod crypto;
pub mod ed25519;
pub mod error;
pub mod fulfillment;
pub mod json;
pub mod preimage;
pub mod threshold;
pub mod types;

pub use condition::Condition;
pub use crypto::{sha256, Keypair, PublicKey, Signature};
pub use ed25519::Ed25519Sha256Fulfillment;
pub use error::{ConditionError, ErrorKind, Result};
pub use fulfillment::{Fulfillment, FulfillmentVariant};
pub use json::JsonNode;
pub use preimage::PreimageSha256Fulfillment;
pub use threshold::{Subcondition, ThresholdSha256Fulfillment};
pub use types::{FulfillmentType, ED25519, PREIMAGE_SHA256, SUPPORTED_BITMASK, THRESHOLD_SHA256};

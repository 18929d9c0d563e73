//! # Crypto-Conditions
//!
//! The unified API for crypto-conditions: publish a condition for a
//! fulfillment tree, then verify fulfillments against it.
//!
//! ## Overview
//!
//! - **Condition**: a public commitment (feature bitmask, hash, max length)
//! - **Fulfillment**: a proof for a condition. Preimages, Ed25519 signatures
//!   and M-of-N thresholds over nested conditions
//! - **Verifier**: checks a received fulfillment against a published condition
//!
//! ## Usage
//!
//! ```rust
//! use cryptoconditions::{Fulfillment, Verifier};
//! use cryptoconditions::core::{Ed25519Sha256Fulfillment, Keypair, ThresholdSha256Fulfillment};
//!
//! let alice = Keypair::generate();
//! let bob = Keypair::generate();
//!
//! // Producer: one of two signatures over the same payment
//! let mut threshold = ThresholdSha256Fulfillment::with_threshold(1);
//! for keypair in [&alice, &bob] {
//!     let mut ed = Ed25519Sha256Fulfillment::new(keypair.public_key())
//!         .with_max_dynamic_message_length(32)
//!         .with_message("pay 10 to carol");
//!     if keypair.public_key() == alice.public_key() {
//!         ed.sign(keypair).unwrap();
//!     }
//!     threshold.add_subfulfillment(ed);
//! }
//! let fulfillment = Fulfillment::from(threshold);
//!
//! let verifier = Verifier::default();
//! let condition_uri = verifier.publish(&fulfillment).unwrap();
//!
//! // Verifier: later, with the fulfillment URI in hand
//! let fulfillment_uri = fulfillment.serialize_uri().unwrap();
//! assert!(verifier
//!     .verify_uri(&condition_uri, &fulfillment_uri, Some(b"pay 10 to carol".as_slice()))
//!     .unwrap());
//! ```
//!
//! ## Re-exports
//!
//! - `cryptoconditions::core` - Core primitives (Condition, Fulfillment, codec, etc.)

pub mod error;
pub mod verifier;

// Re-export component crates
pub use cryptoconditions_core as core;

// Re-export main types for convenience
pub use error::{Result, VerifyError};
pub use verifier::{Verifier, VerifierConfig};

// Re-export commonly used core types
pub use cryptoconditions_core::{
    Condition, ConditionError, Ed25519Sha256Fulfillment, Fulfillment, FulfillmentType, Keypair,
    PreimageSha256Fulfillment, PublicKey, Signature, ThresholdSha256Fulfillment,
};

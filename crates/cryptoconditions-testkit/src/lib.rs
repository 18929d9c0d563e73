//! # Crypto-Conditions Testkit
//!
//! Testing utilities for crypto-conditions.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known URIs with expected conditions for cross-implementation verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for building signed trees
//!
//! ## Golden Vectors
//!
//! ```rust
//! use cryptoconditions_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, condition) in verify_all_vectors() {
//!     assert!(matches, "{name}: {condition}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use cryptoconditions_testkit::generators::{threshold_from_params, ThresholdParams};
//!
//! proptest! {
//!     #[test]
//!     fn threshold_validates(params: ThresholdParams) {
//!         let threshold = threshold_from_params(&params);
//!         prop_assert!(cryptoconditions::Fulfillment::from(threshold).validate(None));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use cryptoconditions_testkit::fixtures::{m_of_n, multi_party_fixtures};
//!
//! let signers = multi_party_fixtures(3);
//! let threshold = m_of_n(2, &signers, 2, b"release escrow");
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{m_of_n, multi_party_fixtures, IlpFixture, SignerFixture};
pub use generators::{ed25519_from_params, threshold_from_params, Ed25519Params, ThresholdParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};

//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the canonical encoding: every implementation must derive
//! the same condition URI from each fulfillment URI and reproduce the
//! fulfillment URI byte for byte.

use cryptoconditions::Verifier;
use cryptoconditions_core::Fulfillment;

/// Seed of the ILP test key (hex).
pub const SEED_HEX_ILP: &str = "833fe62409237b9d62ec77587520911e9a759cec1d19755b7da901b96dca3d42";
/// Public key of the ILP test key (hex).
pub const PUBLIC_HEX_ILP: &str = "ec172b93ad5e563bf4932c70e1245034c35467ef2efd4d64ebf819683467e2bf";

/// Seed of the second ILP test key (hex).
pub const SEED_HEX_ILP_2: &str = "1a3ab1a87f000348f391613930cc49529652ecf2d2c7cadfd96e87a7f6de948a";
/// Public key of the second ILP test key (hex).
pub const PUBLIC_HEX_ILP_2: &str =
    "a614d63a28be3e8e45ea99638d22abc0430e4112a28b3f601a617f9c7f445021";

pub const CONDITION_PREIMAGE: &str = "cc:1:1:47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU:1";
pub const FULFILLMENT_PREIMAGE: &str = "cf:1:1:AA";

pub const CONDITION_ED25519_ILP: &str = "cc:1:8:qQINW2um59C4DB9JSVXH1igqAmaYGGqryllHUgCpfPU:113";
pub const FULFILLMENT_ED25519_ILP: &str = concat!(
    "cf:1:8:IOwXK5OtXlY79JMscOEkUDTDVGfvLv1NZOv4GWg0Z-K_DEhlbGxvIHdvcmxkISAVIENvbmRpdGlvbnMgYXJlIGhlcmUhQENbql531",
    "PbCJlRUvKjP56k0XKJMOrIGo2F66ueuTtRnYrJB2t2ZttdfXM4gzD_87eH1nZTpu4rTkAx81hSdpwI"
);

pub const CONDITION_ED25519_ILP_2: &str = "cc:1:8:_WzTrHvFnv4I-H0cAKWZ6Q3g3Y0Du3aW01nIsaAsio8:116";
pub const FULFILLMENT_ED25519_ILP_2: &str = concat!(
    "cf:1:8:IOwXK5OtXlY79JMscOEkUDTDVGfvLv1NZOv4GWg0Z-K_D0hlbGxvIHVuaXZlcnNlISAbIENvbmRpdGlvbnMgYXJlIGV2ZXJ5d2hlc",
    "mUhQNmD2Cvk7e3EFOo-arA2TKYTP-474Z4okhbYmKij6XxObIbRsDScjXILAJ6mV5hP7Xyqkg5fcSsZbfRYypzlsAM"
);

pub const CONDITION_THRESHOLD_ILP: &str = "cc:1:c:IZgoTeE1Weg6tfGMLWGe2JmS-waBN-CUrlbhtI9GBcQ:230";
pub const FULFILLMENT_THRESHOLD_ILP: &str = concat!(
    "cf:1:4:AgIBCCDsFyuTrV5WO_STLHDhJFA0w1Rn7y79TWTr-BloNGfivwxIZWxsbyB3b3JsZCEgFSBDb25kaXRpb25zIGFyZSBoZXJlIUBDW6",
    "ped9T2wiZUVLyoz-epNFyiTDqyBqNheurnrk7UZ2KyQdrdmbbXX1zOIMw__O3h9Z2U6buK05AMfNYUnacCAQgg7Bcrk61eVjv0kyxw4SRQNMNU",
    "Z-8u_U1k6_gZaDRn4r8MSGVsbG8gd29ybGQhIBUgQ29uZGl0aW9ucyBhcmUgaGVyZSFAQ1uqXnfU9sImVFS8qM_nqTRcokw6sgajYXrq565O",
    "1GdiskHa3Zm2119cziDMP_zt4fWdlOm7itOQDHzWFJ2nAgEBCCD9bNOse8We_gj4fRwApZnpDeDdjQO7dpbTWcixoCyKj3Q"
);

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Fulfillment URI as published by the reference producer.
    pub fulfillment_uri: &'static str,
    /// Condition URI the fulfillment must derive.
    pub condition_uri: &'static str,
    /// External message to validate against, if any.
    pub message: Option<&'static [u8]>,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "Empty preimage",
            fulfillment_uri: FULFILLMENT_PREIMAGE,
            condition_uri: CONDITION_PREIMAGE,
            message: None,
        },
        GoldenVector {
            name: "Ed25519 over 'Hello world!' prefix",
            fulfillment_uri: FULFILLMENT_ED25519_ILP,
            condition_uri: CONDITION_ED25519_ILP,
            message: Some(b" Conditions are here!".as_slice()),
        },
        GoldenVector {
            name: "Ed25519 over 'Hello universe!' prefix",
            fulfillment_uri: FULFILLMENT_ED25519_ILP_2,
            condition_uri: CONDITION_ED25519_ILP_2,
            message: None,
        },
        GoldenVector {
            name: "Threshold 2 of 3 Ed25519",
            fulfillment_uri: FULFILLMENT_THRESHOLD_ILP,
            condition_uri: CONDITION_THRESHOLD_ILP,
            message: None,
        },
    ]
}

/// Verify all golden vectors through the full parse/derive/validate path.
///
/// Returns `(name, matches, derived condition uri)` for each vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let verifier = Verifier::default();
    all_vectors()
        .iter()
        .map(|v| {
            let derived = Fulfillment::from_uri(v.fulfillment_uri)
                .and_then(|f| f.condition())
                .map(|c| c.serialize_uri())
                .unwrap_or_default();

            let matches = derived == v.condition_uri
                && matches!(
                    verifier.verify_uri(v.condition_uri, v.fulfillment_uri, v.message),
                    Ok(true)
                );

            (v.name.to_string(), matches, derived)
        })
        .collect()
}

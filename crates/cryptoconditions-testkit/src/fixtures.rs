//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use cryptoconditions_core::{
    Ed25519Sha256Fulfillment, Fulfillment, Keypair, PublicKey, ThresholdSha256Fulfillment,
};

use crate::vectors::SEED_HEX_ILP;

/// Builds the ILP reference fulfillments from the ILP test key.
pub struct IlpFixture {
    pub keypair: Keypair,
}

impl IlpFixture {
    pub const MESSAGE_PREFIX: &'static str = "Hello world!";
    pub const MESSAGE: &'static str = " Conditions are here!";
    pub const MESSAGE_PREFIX_2: &'static str = "Hello universe!";
    pub const MESSAGE_2: &'static str = " Conditions are everywhere!";
    pub const MAX_DYNAMIC_MESSAGE_LENGTH: u64 = 32;

    pub fn new() -> Self {
        let keypair = Keypair::from_seed_hex(SEED_HEX_ILP).expect("ILP seed is valid hex");
        Self { keypair }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// The Ed25519 fulfillment before signing: key, prefix and bound only.
    pub fn unsigned(&self) -> Ed25519Sha256Fulfillment {
        Ed25519Sha256Fulfillment::new(self.public_key())
            .with_message_prefix(Self::MESSAGE_PREFIX)
            .with_max_dynamic_message_length(Self::MAX_DYNAMIC_MESSAGE_LENGTH)
    }

    /// The signed reference fulfillment (`FULFILLMENT_ED25519_ILP`).
    pub fn signed(&self) -> Fulfillment {
        self.sign_with(Self::MESSAGE_PREFIX, Self::MESSAGE)
    }

    /// The second signed reference fulfillment (`FULFILLMENT_ED25519_ILP_2`).
    pub fn signed_2(&self) -> Fulfillment {
        self.sign_with(Self::MESSAGE_PREFIX_2, Self::MESSAGE_2)
    }

    /// The 2-of-3 reference threshold (`FULFILLMENT_THRESHOLD_ILP`).
    pub fn threshold_two_of_three(&self) -> Fulfillment {
        let mut threshold = ThresholdSha256Fulfillment::with_threshold(2);
        threshold.add_subfulfillment(self.signed_2());
        threshold.add_subfulfillment(self.signed());
        threshold.add_subfulfillment(self.signed());
        threshold.into()
    }

    fn sign_with(&self, prefix: &str, message: &str) -> Fulfillment {
        let mut ed = Ed25519Sha256Fulfillment::new(self.public_key())
            .with_message_prefix(prefix)
            .with_max_dynamic_message_length(Self::MAX_DYNAMIC_MESSAGE_LENGTH)
            .with_message(message);
        ed.sign(&self.keypair).expect("key and message are set");
        ed.into()
    }
}

impl Default for IlpFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A signer with a deterministic keypair.
pub struct SignerFixture {
    pub keypair: Keypair,
}

impl SignerFixture {
    /// Create with a random keypair.
    pub fn new() -> Self {
        Self {
            keypair: Keypair::generate(),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// An unsigned Ed25519 fulfillment bounding the message to `max_len`.
    pub fn unsigned(&self, max_len: u64) -> Ed25519Sha256Fulfillment {
        Ed25519Sha256Fulfillment::new(self.public_key()).with_max_dynamic_message_length(max_len)
    }

    /// An Ed25519 fulfillment signing `message` with no prefix.
    pub fn sign(&self, message: &[u8]) -> Ed25519Sha256Fulfillment {
        let mut ed = self.unsigned(message.len() as u64).with_message(message);
        ed.sign(&self.keypair).expect("key and message are set");
        ed
    }
}

impl Default for SignerFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple signers for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<SignerFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = (i >> 8) as u8;
            SignerFixture::with_seed(seed)
        })
        .collect()
}

/// An M-of-N threshold where only the first `signed` signers have signed
/// `message`. The rest take part unsigned.
pub fn m_of_n(
    threshold: u64,
    signers: &[SignerFixture],
    signed: usize,
    message: &[u8],
) -> ThresholdSha256Fulfillment {
    let mut node = ThresholdSha256Fulfillment::with_threshold(threshold);
    for (i, signer) in signers.iter().enumerate() {
        if i < signed {
            node.add_subfulfillment(signer.sign(message));
        } else {
            node.add_subfulfillment(signer.unsigned(message.len() as u64));
        }
    }
    node
}

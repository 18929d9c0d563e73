//! Proptest generators for property-based testing.

use proptest::prelude::*;

use cryptoconditions_core::{
    Ed25519Sha256Fulfillment, Fulfillment, Keypair, PreimageSha256Fulfillment, PublicKey,
    ThresholdSha256Fulfillment,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random public key.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate message bytes of specified max length.
pub fn message(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a preimage fulfillment.
pub fn preimage(max_len: usize) -> impl Strategy<Value = Fulfillment> {
    message(max_len).prop_map(|p| PreimageSha256Fulfillment::with_preimage(p).into())
}

/// Parameters for generating a signed Ed25519 fulfillment.
#[derive(Debug, Clone)]
pub struct Ed25519Params {
    pub keypair: Keypair,
    pub prefix: Vec<u8>,
    pub message: Vec<u8>,
    /// Never smaller than `message.len()`.
    pub max_dynamic_message_length: u64,
}

impl Arbitrary for Ed25519Params {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // seed
            message(64),       // prefix
            message(64),
            0u64..=64, // slack above the message length
        )
            .prop_map(|(seed, prefix, message, slack)| Ed25519Params {
                keypair: Keypair::from_seed(&seed),
                max_dynamic_message_length: message.len() as u64 + slack,
                prefix,
                message,
            })
            .boxed()
    }
}

/// Build and sign an Ed25519 fulfillment from parameters.
pub fn ed25519_from_params(params: &Ed25519Params) -> Ed25519Sha256Fulfillment {
    let mut ed = Ed25519Sha256Fulfillment::new(params.keypair.public_key())
        .with_message_prefix(params.prefix.clone())
        .with_max_dynamic_message_length(params.max_dynamic_message_length)
        .with_message(params.message.clone());
    ed.sign(&params.keypair).expect("key and message are set");
    ed
}

/// Parameters for a flat threshold over preimage children.
#[derive(Debug, Clone)]
pub struct ThresholdParams {
    pub preimages: Vec<Vec<u8>>,
    /// Never larger than `preimages.len()`.
    pub threshold: u64,
}

impl Arbitrary for ThresholdParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::collection::vec(message(48), 1..=12)
            .prop_flat_map(|preimages| {
                let n = preimages.len() as u64;
                (Just(preimages), 1..=n)
            })
            .prop_map(|(preimages, threshold)| ThresholdParams {
                preimages,
                threshold,
            })
            .boxed()
    }
}

/// Build a threshold fulfillment from parameters, children in given order.
pub fn threshold_from_params(params: &ThresholdParams) -> ThresholdSha256Fulfillment {
    let mut node = ThresholdSha256Fulfillment::with_threshold(params.threshold);
    for preimage in &params.preimages {
        node.add_subfulfillment(PreimageSha256Fulfillment::with_preimage(preimage.clone()));
    }
    node
}

/// Generate threshold parameters together with a permutation of the children.
pub fn threshold_and_shuffle() -> impl Strategy<Value = (ThresholdParams, ThresholdParams)> {
    any::<ThresholdParams>().prop_flat_map(|params| {
        let shuffled = Just(params.preimages.clone()).prop_shuffle();
        let threshold = params.threshold;
        (
            Just(params),
            shuffled.prop_map(move |preimages| ThresholdParams {
                preimages,
                threshold,
            }),
        )
    })
}

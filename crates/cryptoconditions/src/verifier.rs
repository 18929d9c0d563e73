//! The Verifier: both ends of the publish/verify data flow.
//!
//! A producer derives a condition from a fulfillment tree and publishes its
//! URI. Later the verifier receives the fulfillment, checks it is allowed to
//! look at it at all, recomputes its condition and validates the proofs.

use cryptoconditions_core::fulfillment::split_uri;
use cryptoconditions_core::types::is_supported;
use cryptoconditions_core::{Condition, Fulfillment, SUPPORTED_BITMASK};

use crate::error::{Result, VerifyError};

/// Configuration for the Verifier.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Feature bits this verifier accepts in a condition.
    pub supported_bitmask: u32,
    /// Largest fulfillment payload, in bytes, that will be parsed.
    pub max_fulfillment_bytes: usize,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            supported_bitmask: SUPPORTED_BITMASK,
            max_fulfillment_bytes: 64 * 1024,
        }
    }
}

/// Checks fulfillments against published conditions.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    /// Create a new verifier.
    pub fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Publish
    // ─────────────────────────────────────────────────────────────────────────

    /// Derive the condition URI to publish for a fulfillment tree.
    ///
    /// Fails if the tree needs a suite this verifier could not check later.
    pub fn publish(&self, fulfillment: &Fulfillment) -> Result<String> {
        let condition = fulfillment.condition()?;
        self.check_features(&condition)?;
        Ok(condition.serialize_uri())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verify
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify a fulfillment URI against a published condition URI.
    pub fn verify_uri(
        &self,
        condition_uri: &str,
        fulfillment_uri: &str,
        message: Option<&[u8]>,
    ) -> Result<bool> {
        let condition = Condition::from_uri(condition_uri).map_err(|e| {
            tracing::warn!(condition = condition_uri, error = %e, "unparseable published condition");
            e
        })?;
        self.verify(&condition, fulfillment_uri, message)
    }

    /// Verify a fulfillment URI against a published condition.
    ///
    /// Returns `Ok(false)` when the fulfillment is well formed but belongs to
    /// a different condition or its proofs do not hold.
    pub fn verify(
        &self,
        condition: &Condition,
        fulfillment_uri: &str,
        message: Option<&[u8]>,
    ) -> Result<bool> {
        self.check_features(condition)?;

        // Bound the payload before decoding it.
        let encoded = fulfillment_uri.rsplit(':').next().unwrap_or_default();
        self.check_size(encoded.trim_end_matches('=').len() * 3 / 4)?;

        let (ty, payload) = split_uri(fulfillment_uri)?;
        self.check_size(payload.len())?;

        let fulfillment = Fulfillment::from_payload(ty, &payload)?;
        self.check(condition, &fulfillment, message)
    }

    /// Verify a binary fulfillment against a published condition.
    pub fn verify_binary(
        &self,
        condition: &Condition,
        fulfillment: &[u8],
        message: Option<&[u8]>,
    ) -> Result<bool> {
        self.check_features(condition)?;
        self.check_size(fulfillment.len())?;
        let fulfillment = Fulfillment::from_binary(fulfillment)?;
        self.check(condition, &fulfillment, message)
    }

    fn check(
        &self,
        condition: &Condition,
        fulfillment: &Fulfillment,
        message: Option<&[u8]>,
    ) -> Result<bool> {
        let derived = fulfillment.condition()?;
        if derived != *condition {
            tracing::debug!(
                expected = %condition,
                derived = %derived,
                "fulfillment does not match condition"
            );
            return Ok(false);
        }

        if !fulfillment.validate(message) {
            tracing::debug!(
                condition = %condition,
                fulfillment_type = %fulfillment.fulfillment_type(),
                "fulfillment proof failed"
            );
            return Ok(false);
        }

        Ok(true)
    }

    fn check_features(&self, condition: &Condition) -> Result<()> {
        let supported = self.config.supported_bitmask;
        if !is_supported(condition.bitmask(), supported) {
            tracing::debug!(
                required = condition.bitmask(),
                supported,
                "condition requires unsupported features"
            );
            return Err(VerifyError::UnsupportedFeatures {
                required: condition.bitmask(),
                supported,
            });
        }
        Ok(())
    }

    fn check_size(&self, size: usize) -> Result<()> {
        let limit = self.config.max_fulfillment_bytes;
        if size > limit {
            tracing::debug!(size, limit, "fulfillment exceeds size limit");
            return Err(VerifyError::FulfillmentTooLarge { size, limit });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptoconditions_core::codec::{base64url_encode, Writer};
    use cryptoconditions_core::{
        ConditionError, Keypair, PreimageSha256Fulfillment, ThresholdSha256Fulfillment,
        PREIMAGE_SHA256, THRESHOLD_SHA256,
    };

    fn preimage(bytes: &[u8]) -> Fulfillment {
        PreimageSha256Fulfillment::with_preimage(bytes).into()
    }

    #[test]
    fn test_publish_then_verify() {
        let verifier = Verifier::default();
        let fulfillment = preimage(b"secret");

        let condition_uri = verifier.publish(&fulfillment).unwrap();
        let fulfillment_uri = fulfillment.serialize_uri().unwrap();
        assert!(verifier
            .verify_uri(&condition_uri, &fulfillment_uri, None)
            .unwrap());
    }

    #[test]
    fn test_wrong_fulfillment_is_false() {
        let verifier = Verifier::default();
        let condition = preimage(b"secret").condition().unwrap();
        let other = preimage(b"guess").serialize_uri().unwrap();
        assert!(!verifier.verify(&condition, &other, None).unwrap());
    }

    #[test]
    fn test_unsupported_features_rejected() {
        let verifier = Verifier::new(VerifierConfig {
            supported_bitmask: PREIMAGE_SHA256,
            ..Default::default()
        });

        let mut threshold = ThresholdSha256Fulfillment::new();
        threshold.add_subfulfillment(preimage(b"a"));
        let fulfillment = Fulfillment::from(threshold);

        let err = verifier.publish(&fulfillment).unwrap_err();
        assert!(matches!(
            err,
            VerifyError::UnsupportedFeatures {
                required,
                supported: PREIMAGE_SHA256,
            } if required == THRESHOLD_SHA256 | PREIMAGE_SHA256
        ));

        let condition = fulfillment.condition().unwrap();
        let uri = fulfillment.serialize_uri().unwrap();
        assert!(matches!(
            verifier.verify(&condition, &uri, None),
            Err(VerifyError::UnsupportedFeatures { .. })
        ));
    }

    #[test]
    fn test_oversize_rejected_before_parse() {
        let verifier = Verifier::new(VerifierConfig {
            max_fulfillment_bytes: 16,
            ..Default::default()
        });
        let fulfillment = preimage(&[0x42; 64]);
        let condition = fulfillment.condition().unwrap();
        let uri = fulfillment.serialize_uri().unwrap();

        assert!(matches!(
            verifier.verify(&condition, &uri, None),
            Err(VerifyError::FulfillmentTooLarge { limit: 16, .. })
        ));
        assert!(matches!(
            verifier.verify_binary(&condition, &fulfillment.serialize_binary().unwrap(), None),
            Err(VerifyError::FulfillmentTooLarge { size: 66, limit: 16 })
        ));
    }

    #[test]
    fn test_malformed_inputs_are_errors() {
        let verifier = Verifier::default();
        assert!(matches!(
            verifier.verify_uri("cc:1:1:not-a-hash:1", "cf:1:1:AA", None),
            Err(VerifyError::Condition(_))
        ));

        let condition = preimage(b"").condition().unwrap();
        assert!(matches!(
            verifier.verify(&condition, "cf:1:1:AAA", None),
            Err(VerifyError::Condition(ConditionError::TrailingBytes(1)))
        ));
    }

    #[test]
    fn test_publish_incomplete_fulfillment() {
        let verifier = Verifier::default();
        let fulfillment = Fulfillment::from(PreimageSha256Fulfillment::new());
        assert!(matches!(
            verifier.publish(&fulfillment),
            Err(VerifyError::Condition(ConditionError::MissingField("preimage")))
        ));
    }

    #[test]
    fn test_signature_checked_against_message() {
        let keypair = Keypair::from_seed(&[7; 32]);
        let mut ed = cryptoconditions_core::Ed25519Sha256Fulfillment::new(keypair.public_key())
            .with_max_dynamic_message_length(16)
            .with_message("pay alice");
        ed.sign(&keypair).unwrap();
        let fulfillment = Fulfillment::from(ed);

        let verifier = Verifier::default();
        let condition = fulfillment.condition().unwrap();
        let uri = fulfillment.serialize_uri().unwrap();
        assert!(verifier.verify(&condition, &uri, Some(b"pay alice".as_slice())).unwrap());
        assert!(!verifier.verify(&condition, &uri, Some(b"pay mallory".as_slice())).unwrap());
    }

    #[test]
    fn test_deeply_nested_input_fails_closed() {
        // 12 000 nested 1-of-1 thresholds fit well under the default size cap
        let levels = 12_000;
        let mut payload = Vec::new();
        payload.extend_from_slice(&[0x01, 0x01, 0x01]);
        for _ in 1..levels {
            payload.extend_from_slice(&[0x04, 0x01, 0x01, 0x01]);
        }
        payload.extend_from_slice(&[0x01, 0x00]);
        payload.extend(std::iter::repeat(0x00).take(levels));

        let uri = format!("cf:1:4:{}", base64url_encode(&payload));
        let condition = preimage(b"").condition().unwrap();
        assert!(matches!(
            Verifier::default().verify(&condition, &uri, None),
            Err(VerifyError::Condition(ConditionError::NestingTooDeep { .. }))
        ));
    }

    #[test]
    fn test_unbounded_ed25519_length_is_not_a_crash() {
        let mut writer = Writer::new();
        writer.write_var_bytes(Keypair::from_seed(&[3; 32]).public_key().as_bytes());
        writer.write_var_bytes(b"");
        writer.write_var_uint(u64::MAX);
        writer.write_var_bytes(b"");
        writer.write_var_bytes(b"");
        let uri = format!("cf:1:8:{}", base64url_encode(&writer.into_bytes()));

        let fulfillment = Fulfillment::from_uri(&uri).unwrap();
        let condition = fulfillment.condition().unwrap();
        assert!(!Verifier::default().verify(&condition, &uri, None).unwrap());
    }

    proptest::proptest! {
        #[test]
        fn prop_published_preimage_verifies(
            secret in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..256),
            guess in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..256),
        ) {
            let verifier = Verifier::default();
            let fulfillment = preimage(&secret);
            let condition_uri = verifier.publish(&fulfillment).unwrap();

            let uri = fulfillment.serialize_uri().unwrap();
            proptest::prop_assert!(verifier.verify_uri(&condition_uri, &uri, None).unwrap());

            let other = preimage(&guess).serialize_uri().unwrap();
            proptest::prop_assert_eq!(
                verifier.verify_uri(&condition_uri, &other, None).unwrap(),
                secret == guess
            );
        }
    }
}

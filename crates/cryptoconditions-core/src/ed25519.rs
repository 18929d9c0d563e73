//! Ed25519 signature fulfillment over a fixed prefix and a bounded suffix.
//!
//! The condition commits to `(public_key, message_prefix,
//! max_dynamic_message_length)` only. The dynamic message is chosen when
//! fulfilling, and the signature covers `message_prefix || message`.
//!
//! Payload layout:
//!
//! ```txt
//! varbytes(public_key) varbytes(message_prefix) varuint(max_dynamic_message_length)
//! varbytes(message) varbytes(signature)
//! ```
//!
//! An unsigned instance writes an empty message and an empty signature so the
//! payload stays self-delimiting inside a threshold.

use crate::codec::{Reader, Writer};
use crate::condition::Condition;
use crate::crypto::{sha256, Keypair, PublicKey, Signature, SIGNATURE_LENGTH};
use crate::error::{ConditionError, Result};
use crate::fulfillment::FulfillmentVariant;
use crate::types::FulfillmentType;

/// Constant term of the advertised maximum fulfillment length, which is
/// `FULFILLMENT_OVERHEAD + len(prefix) + max_dynamic_message_length`.
pub const FULFILLMENT_OVERHEAD: u64 = 5 + SIGNATURE_LENGTH as u64;

/// An Ed25519 fulfillment, built incrementally by the producer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ed25519Sha256Fulfillment {
    public_key: Option<PublicKey>,
    message_prefix: Vec<u8>,
    max_dynamic_message_length: u64,
    message: Option<Vec<u8>>,
    signature: Option<Signature>,
}

impl Ed25519Sha256Fulfillment {
    /// Create a fulfillment for `public_key` with an empty prefix and no
    /// dynamic message allowed.
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key: Some(public_key),
            ..Self::default()
        }
    }

    /// Set the fixed message prefix.
    pub fn with_message_prefix(mut self, prefix: impl Into<Vec<u8>>) -> Self {
        self.message_prefix = prefix.into();
        self
    }

    /// Set the maximum length of the dynamic message suffix.
    pub fn with_max_dynamic_message_length(mut self, len: u64) -> Self {
        self.max_dynamic_message_length = len;
        self
    }

    /// Set the dynamic message suffix.
    pub fn with_message(mut self, message: impl Into<Vec<u8>>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn set_public_key(&mut self, public_key: PublicKey) {
        self.public_key = Some(public_key);
    }

    pub fn set_message_prefix(&mut self, prefix: impl Into<Vec<u8>>) {
        self.message_prefix = prefix.into();
    }

    pub fn set_max_dynamic_message_length(&mut self, len: u64) {
        self.max_dynamic_message_length = len;
    }

    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) {
        self.message = Some(message.into());
    }

    /// Attach a signature produced elsewhere.
    pub fn set_signature(&mut self, signature: Signature) {
        self.signature = Some(signature);
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public_key.as_ref()
    }

    pub fn message_prefix(&self) -> &[u8] {
        &self.message_prefix
    }

    pub fn max_dynamic_message_length(&self) -> u64 {
        self.max_dynamic_message_length
    }

    pub fn message(&self) -> Option<&[u8]> {
        self.message.as_deref()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Sign `message_prefix || message` with `keypair`.
    ///
    /// The keypair is not checked against the public key; signing with the
    /// wrong key yields a fulfillment that fails `validate`.
    pub fn sign(&mut self, keypair: &Keypair) -> Result<()> {
        self.require_public_key()?;
        let message = self
            .message
            .as_deref()
            .ok_or(ConditionError::MissingField("message"))?;
        let signature = keypair.sign(&self.signed_message(message));
        self.signature = Some(signature);
        Ok(())
    }

    fn signed_message(&self, message: &[u8]) -> Vec<u8> {
        let mut signed = Vec::with_capacity(self.message_prefix.len() + message.len());
        signed.extend_from_slice(&self.message_prefix);
        signed.extend_from_slice(message);
        signed
    }

    fn require_public_key(&self) -> Result<&PublicKey> {
        self.public_key
            .as_ref()
            .ok_or(ConditionError::MissingField("public_key"))
    }

    fn write_common_header(&self, writer: &mut Writer) -> Result<()> {
        writer.write_var_bytes(self.require_public_key()?.as_bytes());
        writer.write_var_bytes(&self.message_prefix);
        writer.write_var_uint(self.max_dynamic_message_length);
        Ok(())
    }
}

impl FulfillmentVariant for Ed25519Sha256Fulfillment {
    const TYPE: FulfillmentType = FulfillmentType::Ed25519Sha256;

    fn bitmask(&self) -> u32 {
        Self::TYPE.feature_bit()
    }

    fn condition(&self) -> Result<Condition> {
        let mut hasher = Writer::new();
        hasher.write_var_uint(Self::TYPE.type_id() as u64);
        self.write_common_header(&mut hasher)?;

        // both lengths can come straight off the wire
        let max_fulfillment_length = FULFILLMENT_OVERHEAD
            .saturating_add(self.message_prefix.len() as u64)
            .saturating_add(self.max_dynamic_message_length);

        Ok(Condition::new(
            self.bitmask(),
            sha256(&hasher.into_bytes()),
            max_fulfillment_length,
        ))
    }

    fn validate(&self, message: Option<&[u8]>) -> bool {
        let (Some(public_key), Some(signature)) = (&self.public_key, &self.signature) else {
            return false;
        };
        let Some(message) = message.or(self.message.as_deref()) else {
            return false;
        };
        if message.len() as u64 > self.max_dynamic_message_length {
            return false;
        }
        public_key.verify(&self.signed_message(message), signature)
    }

    fn write_payload(&self, writer: &mut Writer) -> Result<()> {
        self.write_common_header(writer)?;
        writer.write_var_bytes(self.message.as_deref().unwrap_or_default());
        match &self.signature {
            Some(signature) => writer.write_var_bytes(signature.as_bytes()),
            None => writer.write_var_bytes(&[]),
        }
        Ok(())
    }

    fn read_payload(reader: &mut Reader<'_>) -> Result<Self> {
        let public_key = PublicKey::try_from(reader.read_var_bytes()?)?;
        let message_prefix = reader.read_var_bytes()?.to_vec();
        let max_dynamic_message_length = reader.read_var_uint()?;
        let message = reader.read_var_bytes()?;
        let signature = match reader.read_var_bytes()? {
            [] => None,
            bytes => Some(Signature::try_from(bytes)?),
        };

        // An unsigned payload carries no message; a signed one always does,
        // even when it is empty.
        let message = match (&signature, message) {
            (None, []) => None,
            (_, m) => Some(m.to_vec()),
        };

        Ok(Self {
            public_key: Some(public_key),
            message_prefix,
            max_dynamic_message_length,
            message,
            signature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulfillment::Fulfillment;

    const PUBLIC_HEX: &str = "ec172b93ad5e563bf4932c70e1245034c35467ef2efd4d64ebf819683467e2bf";
    const SEED_HEX: &str = "833fe62409237b9d62ec77587520911e9a759cec1d19755b7da901b96dca3d42";
    const CONDITION_URI: &str = "cc:1:8:qQINW2um59C4DB9JSVXH1igqAmaYGGqryllHUgCpfPU:113";
    const HASH_HEX: &str = "a9020d5b6ba6e7d0b80c1f494955c7d6282a026698186aabca59475200a97cf5";
    const FULFILLMENT_URI: &str = concat!(
        "cf:1:8:IOwXK5OtXlY79JMscOEkUDTDVGfvLv1NZOv4GWg0Z-K_DEhlbGxvIHdvcmxkISAVIENvbmRpdGlvbnMgYXJlIGhlcmUhQENbql531",
        "PbCJlRUvKjP56k0XKJMOrIGo2F66ueuTtRnYrJB2t2ZttdfXM4gzD_87eH1nZTpu4rTkAx81hSdpwI"
    );

    fn unsigned() -> Ed25519Sha256Fulfillment {
        Ed25519Sha256Fulfillment::new(PublicKey::from_hex(PUBLIC_HEX).unwrap())
            .with_message_prefix("Hello world!")
            .with_max_dynamic_message_length(32)
    }

    fn keypair() -> Keypair {
        Keypair::from_seed_hex(SEED_HEX).unwrap()
    }

    #[test]
    fn test_condition_vector() {
        let condition = unsigned().condition().unwrap();
        assert_eq!(condition.serialize_uri(), CONDITION_URI);
        assert_eq!(condition.hash_hex(), HASH_HEX);
    }

    #[test]
    fn test_sign_then_validate() {
        let mut fulfillment = unsigned().with_message(" Conditions are here!");
        assert!(!fulfillment.validate(None));

        fulfillment.sign(&keypair()).unwrap();
        assert!(fulfillment.validate(None));
        assert!(fulfillment.validate(Some(b" Conditions are here!".as_slice())));
        assert_eq!(
            Fulfillment::from(fulfillment).serialize_uri().unwrap(),
            FULFILLMENT_URI
        );
    }

    #[test]
    fn test_condition_ignores_dynamic_message() {
        let before = unsigned().condition().unwrap();
        let mut signed = unsigned().with_message("anything at all");
        signed.sign(&keypair()).unwrap();
        assert_eq!(signed.condition().unwrap(), before);
    }

    #[test]
    fn test_external_message_mismatch() {
        let mut fulfillment = unsigned().with_message(" Conditions are here!");
        fulfillment.sign(&keypair()).unwrap();
        assert!(!fulfillment.validate(Some(b" Conditions are there".as_slice())));
    }

    #[test]
    fn test_message_longer_than_max_fails() {
        let mut fulfillment = Ed25519Sha256Fulfillment::new(keypair().public_key())
            .with_max_dynamic_message_length(4)
            .with_message("12345");
        fulfillment.sign(&keypair()).unwrap();
        assert!(!fulfillment.validate(None));

        fulfillment.set_max_dynamic_message_length(5);
        assert!(fulfillment.validate(None));
    }

    #[test]
    fn test_sign_requires_public_key_and_message() {
        let mut no_key = Ed25519Sha256Fulfillment::default().with_message("m");
        assert_eq!(
            no_key.sign(&keypair()),
            Err(ConditionError::MissingField("public_key"))
        );

        let mut no_message = unsigned();
        assert_eq!(
            no_message.sign(&keypair()),
            Err(ConditionError::MissingField("message"))
        );
    }

    #[test]
    fn test_wrong_keypair_fails_validation() {
        let mut fulfillment = unsigned().with_message(" Conditions are here!");
        fulfillment.sign(&Keypair::from_seed(&[9; 32])).unwrap();
        assert!(fulfillment.is_signed());
        assert!(!fulfillment.validate(None));
    }

    #[test]
    fn test_unsigned_payload_roundtrip() {
        let fulfillment = Fulfillment::from(unsigned());
        let uri = fulfillment.serialize_uri().unwrap();
        let parsed = Fulfillment::from_uri(&uri).unwrap();
        assert_eq!(parsed, fulfillment);
        assert!(!parsed.validate(None));
        assert_eq!(parsed.condition().unwrap().serialize_uri(), CONDITION_URI);
    }

    #[test]
    fn test_signed_empty_message_roundtrip() {
        let mut fulfillment = Ed25519Sha256Fulfillment::new(keypair().public_key())
            .with_message_prefix("prefix only")
            .with_message("");
        fulfillment.sign(&keypair()).unwrap();

        let parsed = Fulfillment::from_uri(
            &Fulfillment::from(fulfillment.clone()).serialize_uri().unwrap(),
        )
        .unwrap();
        assert_eq!(parsed, Fulfillment::from(fulfillment));
        assert!(parsed.validate(None));
    }

    #[test]
    fn test_flipped_bytes_fail() {
        let fulfillment = Fulfillment::from_uri(FULFILLMENT_URI).unwrap();
        let Fulfillment::Ed25519(ed) = fulfillment else {
            panic!("expected ed25519");
        };

        let mut sig = *ed.signature().unwrap().as_bytes();
        sig[10] ^= 0x01;
        let mut tampered_sig = ed.clone();
        tampered_sig.set_signature(Signature::from_bytes(sig));
        assert!(!tampered_sig.validate(None));

        let mut message = ed.message().unwrap().to_vec();
        message[0] ^= 0x01;
        assert!(!ed.validate(Some(message.as_slice())));
    }

    #[test]
    fn test_huge_max_dynamic_length_saturates() {
        let mut writer = Writer::new();
        writer.write_var_bytes(&[0x11; 32]);
        writer.write_var_bytes(b"");
        writer.write_var_uint(u64::MAX);
        writer.write_var_bytes(b"");
        writer.write_var_bytes(b"");

        let fulfillment =
            Fulfillment::from_payload(FulfillmentType::Ed25519Sha256, &writer.into_bytes()).unwrap();
        let condition = fulfillment.condition().unwrap();
        assert_eq!(condition.max_fulfillment_length(), u64::MAX);
        assert!(!fulfillment.validate(Some(b"anything".as_slice())));
    }

    #[test]
    fn test_rejects_bad_signature_length() {
        let mut writer = Writer::new();
        writer.write_var_bytes(&[0x11; 32]);
        writer.write_var_bytes(b"");
        writer.write_var_uint(0);
        writer.write_var_bytes(b"");
        writer.write_var_bytes(&[0x22; 63]);
        let bytes = writer.into_bytes();

        let err = Ed25519Sha256Fulfillment::read_payload(&mut Reader::new(&bytes)).unwrap_err();
        assert!(matches!(
            err,
            ConditionError::InvalidLength {
                field: "signature",
                ..
            }
        ));
    }
}

//! SHA-256 preimage fulfillment.
//!
//! The condition hash is `SHA256(preimage)`; revealing the preimage fulfills
//! it. The message passed to `validate` is ignored.

use crate::codec::{varbytes_len, Reader, Writer};
use crate::condition::Condition;
use crate::crypto::sha256;
use crate::error::{ConditionError, Result};
use crate::fulfillment::FulfillmentVariant;
use crate::types::FulfillmentType;

/// A hash preimage fulfillment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreimageSha256Fulfillment {
    preimage: Option<Vec<u8>>,
}

impl PreimageSha256Fulfillment {
    /// Create an empty fulfillment. The preimage must be set before use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fulfillment revealing `preimage`.
    pub fn with_preimage(preimage: impl Into<Vec<u8>>) -> Self {
        Self {
            preimage: Some(preimage.into()),
        }
    }

    pub fn set_preimage(&mut self, preimage: impl Into<Vec<u8>>) {
        self.preimage = Some(preimage.into());
    }

    pub fn preimage(&self) -> Option<&[u8]> {
        self.preimage.as_deref()
    }

    fn require_preimage(&self) -> Result<&[u8]> {
        self.preimage
            .as_deref()
            .ok_or(ConditionError::MissingField("preimage"))
    }
}

impl FulfillmentVariant for PreimageSha256Fulfillment {
    const TYPE: FulfillmentType = FulfillmentType::PreimageSha256;

    fn bitmask(&self) -> u32 {
        Self::TYPE.feature_bit()
    }

    fn condition(&self) -> Result<Condition> {
        let preimage = self.require_preimage()?;
        Ok(Condition::new(
            self.bitmask(),
            sha256(preimage),
            varbytes_len(preimage.len()) as u64,
        ))
    }

    fn validate(&self, _message: Option<&[u8]>) -> bool {
        self.preimage.is_some()
    }

    fn write_payload(&self, writer: &mut Writer) -> Result<()> {
        writer.write_var_bytes(self.require_preimage()?);
        Ok(())
    }

    fn read_payload(reader: &mut Reader<'_>) -> Result<Self> {
        Ok(Self::with_preimage(reader.read_var_bytes()?))
    }
}

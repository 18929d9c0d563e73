//! Fulfillment: the closed set of variants and their shared envelope.
//!
//! Binary form: `varuint(type_id) payload`.
//! Text form: `cf:1:<type_id hex>:<base64url payload>`.
//!
//! The payload itself carries no type tag; [`Fulfillment`] adds it.

use std::fmt;
use std::str::FromStr;

use crate::codec::{base64url_decode, base64url_encode, parse_uri_number, Reader, Writer};
use crate::condition::{Condition, URI_VERSION};
use crate::ed25519::Ed25519Sha256Fulfillment;
use crate::error::{ConditionError, Result};
use crate::preimage::PreimageSha256Fulfillment;
use crate::threshold::ThresholdSha256Fulfillment;
use crate::types::FulfillmentType;

/// URI scheme prefix for fulfillments.
pub const FULFILLMENT_URI_PREFIX: &str = "cf";

/// Behavior every fulfillment variant provides.
pub trait FulfillmentVariant {
    /// Wire type of this variant.
    const TYPE: FulfillmentType;

    /// OR of the feature bits needed to verify this subtree.
    fn bitmask(&self) -> u32;

    /// Derive the condition this fulfillment satisfies.
    ///
    /// Fails with a state error if a field the condition commits to is unset.
    fn condition(&self) -> Result<Condition>;

    /// Check the fulfillment against `message`. Never errors.
    fn validate(&self, message: Option<&[u8]>) -> bool;

    /// Write the type-specific payload.
    fn write_payload(&self, writer: &mut Writer) -> Result<()>;

    /// Read the type-specific payload.
    fn read_payload(reader: &mut Reader<'_>) -> Result<Self>
    where
        Self: Sized;
}

/// Any supported fulfillment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fulfillment {
    Preimage(PreimageSha256Fulfillment),
    Ed25519(Ed25519Sha256Fulfillment),
    Threshold(ThresholdSha256Fulfillment),
}

macro_rules! dispatch {
    ($self:expr, $f:ident => $body:expr) => {
        match $self {
            Fulfillment::Preimage($f) => $body,
            Fulfillment::Ed25519($f) => $body,
            Fulfillment::Threshold($f) => $body,
        }
    };
}

impl Fulfillment {
    pub fn fulfillment_type(&self) -> FulfillmentType {
        match self {
            Fulfillment::Preimage(_) => FulfillmentType::PreimageSha256,
            Fulfillment::Ed25519(_) => FulfillmentType::Ed25519Sha256,
            Fulfillment::Threshold(_) => FulfillmentType::ThresholdSha256,
        }
    }

    pub fn type_id(&self) -> u32 {
        self.fulfillment_type().type_id()
    }

    /// Feature bits required by this fulfillment and everything below it.
    pub fn bitmask(&self) -> u32 {
        dispatch!(self, f => f.bitmask())
    }

    /// Derive the condition this fulfillment satisfies.
    pub fn condition(&self) -> Result<Condition> {
        dispatch!(self, f => f.condition())
    }

    /// Validate against an optional external message.
    pub fn validate(&self, message: Option<&[u8]>) -> bool {
        dispatch!(self, f => f.validate(message))
    }

    /// Write `varuint(type_id) payload`.
    pub fn write_to(&self, writer: &mut Writer) -> Result<()> {
        writer.write_var_uint(self.type_id() as u64);
        dispatch!(self, f => f.write_payload(writer))
    }

    /// The payload without the type tag.
    pub fn serialize_payload(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new();
        dispatch!(self, f => f.write_payload(&mut writer))?;
        Ok(writer.into_bytes())
    }

    /// Serialize to the canonical binary form.
    pub fn serialize_binary(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new();
        self.write_to(&mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Serialize to the canonical URI form.
    pub fn serialize_uri(&self) -> Result<String> {
        Ok(format!(
            "{FULFILLMENT_URI_PREFIX}:{URI_VERSION}:{:x}:{}",
            self.type_id(),
            base64url_encode(&self.serialize_payload()?)
        ))
    }

    /// Read one fulfillment (type tag and payload) from a reader.
    pub fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        let ty = FulfillmentType::from_type_id(reader.read_var_uint()?)?;
        Self::read_payload(ty, reader)
    }

    fn read_payload(ty: FulfillmentType, reader: &mut Reader<'_>) -> Result<Self> {
        Ok(match ty {
            FulfillmentType::PreimageSha256 => {
                Fulfillment::Preimage(PreimageSha256Fulfillment::read_payload(reader)?)
            }
            FulfillmentType::Ed25519Sha256 => {
                Fulfillment::Ed25519(Ed25519Sha256Fulfillment::read_payload(reader)?)
            }
            FulfillmentType::ThresholdSha256 => {
                Fulfillment::Threshold(ThresholdSha256Fulfillment::read_payload(reader)?)
            }
        })
    }

    /// Parse a complete binary fulfillment.
    pub fn from_binary(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let fulfillment = Self::read_from(&mut reader)?;
        reader.finish()?;
        Ok(fulfillment)
    }

    /// Parse a complete untagged payload of a known type.
    pub fn from_payload(ty: FulfillmentType, payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        let fulfillment = Self::read_payload(ty, &mut reader)?;
        reader.finish()?;
        Ok(fulfillment)
    }

    /// Parse a fulfillment URI.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let (ty, payload) = split_uri(uri)?;
        Self::from_payload(ty, &payload)
    }

    pub fn as_preimage(&self) -> Option<&PreimageSha256Fulfillment> {
        match self {
            Fulfillment::Preimage(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_ed25519(&self) -> Option<&Ed25519Sha256Fulfillment> {
        match self {
            Fulfillment::Ed25519(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_threshold(&self) -> Option<&ThresholdSha256Fulfillment> {
        match self {
            Fulfillment::Threshold(f) => Some(f),
            _ => None,
        }
    }
}

/// Split a fulfillment URI into its type and decoded payload.
///
/// Exposed so a verifier can bound the payload size before parsing it.
pub fn split_uri(uri: &str) -> Result<(FulfillmentType, Vec<u8>)> {
    let parts: Vec<&str> = uri.split(':').collect();
    if parts.len() != 4 {
        return Err(ConditionError::InvalidUri(format!(
            "expected 4 fields, got {}",
            parts.len()
        )));
    }
    if parts[0] != FULFILLMENT_URI_PREFIX {
        return Err(ConditionError::InvalidUri(format!(
            "expected prefix '{FULFILLMENT_URI_PREFIX}', got '{}'",
            parts[0]
        )));
    }
    if parts[1] != URI_VERSION {
        return Err(ConditionError::InvalidUri(format!(
            "unsupported version '{}'",
            parts[1]
        )));
    }
    let type_id = parse_uri_number("type", parts[2], 16)?;
    let ty = FulfillmentType::from_type_id(type_id)?;
    Ok((ty, base64url_decode(parts[3])?))
}

impl From<PreimageSha256Fulfillment> for Fulfillment {
    fn from(f: PreimageSha256Fulfillment) -> Self {
        Fulfillment::Preimage(f)
    }
}

impl From<Ed25519Sha256Fulfillment> for Fulfillment {
    fn from(f: Ed25519Sha256Fulfillment) -> Self {
        Fulfillment::Ed25519(f)
    }
}

impl From<ThresholdSha256Fulfillment> for Fulfillment {
    fn from(f: ThresholdSha256Fulfillment) -> Self {
        Fulfillment::Threshold(f)
    }
}

impl fmt::Display for Fulfillment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.serialize_uri() {
            Ok(uri) => f.write_str(&uri),
            Err(_) => write!(f, "{}(incomplete)", self.fulfillment_type()),
        }
    }
}

impl FromStr for Fulfillment {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_uri(s)
    }
}

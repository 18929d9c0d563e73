//! Condition: the public commitment a fulfillment satisfies.
//!
//! A condition is `(bitmask, hash, max_fulfillment_length)`. It is compared
//! as an opaque tuple; only the variant that produced the hash knows what it
//! commits to.
//!
//! Text form: `cc:1:<bitmask hex>:<base64url hash>:<max_fulfillment_length>`.

use std::fmt;
use std::str::FromStr;

use crate::codec::{
    base64url_decode, base64url_encode, parse_uri_number, varbytes_len, varuint_len, Reader,
    Writer,
};
use crate::error::{ConditionError, Result};

/// URI scheme prefix for conditions.
pub const CONDITION_URI_PREFIX: &str = "cc";

/// Envelope version written into every URI.
pub const URI_VERSION: &str = "1";

/// Length of a condition hash in bytes.
pub const HASH_LENGTH: usize = 32;

/// A crypto-condition.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    bitmask: u32,
    hash: [u8; HASH_LENGTH],
    max_fulfillment_length: u64,
}

impl Condition {
    /// Create a condition from its three fields.
    pub const fn new(bitmask: u32, hash: [u8; HASH_LENGTH], max_fulfillment_length: u64) -> Self {
        Self {
            bitmask,
            hash,
            max_fulfillment_length,
        }
    }

    /// Feature bits needed to verify any fulfillment of this condition.
    pub const fn bitmask(&self) -> u32 {
        self.bitmask
    }

    pub const fn hash(&self) -> &[u8; HASH_LENGTH] {
        &self.hash
    }

    /// Upper bound on the size of a fulfillment for this condition.
    pub const fn max_fulfillment_length(&self) -> u64 {
        self.max_fulfillment_length
    }

    /// Hash as a hex string.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// Parse a condition URI.
    pub fn from_uri(uri: &str) -> Result<Self> {
        let parts: Vec<&str> = uri.split(':').collect();
        if parts.len() != 5 {
            return Err(ConditionError::InvalidUri(format!(
                "expected 5 fields, got {}",
                parts.len()
            )));
        }
        if parts[0] != CONDITION_URI_PREFIX {
            return Err(ConditionError::InvalidUri(format!(
                "expected prefix '{CONDITION_URI_PREFIX}', got '{}'",
                parts[0]
            )));
        }
        if parts[1] != URI_VERSION {
            return Err(ConditionError::InvalidUri(format!(
                "unsupported version '{}'",
                parts[1]
            )));
        }

        let bitmask = parse_uri_number("bitmask", parts[2], 16)?;
        let bitmask = u32::try_from(bitmask).map_err(|_| {
            ConditionError::InvalidUri(format!("bitmask '{}' exceeds 32 bits", parts[2]))
        })?;
        let hash = hash_from_slice(&base64url_decode(parts[3])?)?;
        let max_fulfillment_length = parse_uri_number("max fulfillment length", parts[4], 10)?;

        Ok(Self::new(bitmask, hash, max_fulfillment_length))
    }

    /// Serialize to the canonical URI form.
    pub fn serialize_uri(&self) -> String {
        format!(
            "{CONDITION_URI_PREFIX}:{URI_VERSION}:{:x}:{}:{}",
            self.bitmask,
            base64url_encode(&self.hash),
            self.max_fulfillment_length
        )
    }

    /// Write the canonical binary form.
    pub fn write_to(&self, writer: &mut Writer) {
        writer.write_var_uint(self.bitmask as u64);
        writer.write_var_bytes(&self.hash);
        writer.write_var_uint(self.max_fulfillment_length);
    }

    /// Serialize to the canonical binary form.
    pub fn serialize_binary(&self) -> Vec<u8> {
        let mut writer = Writer::new();
        self.write_to(&mut writer);
        writer.into_bytes()
    }

    /// Size of the binary form in bytes.
    pub fn binary_len(&self) -> usize {
        varuint_len(self.bitmask as u64)
            + varbytes_len(HASH_LENGTH)
            + varuint_len(self.max_fulfillment_length)
    }

    /// Read one condition from a reader.
    pub fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        let bitmask = reader.read_var_uint()?;
        let bitmask = u32::try_from(bitmask)
            .map_err(|_| ConditionError::Decoding(format!("bitmask {bitmask} exceeds 32 bits")))?;
        let hash = hash_from_slice(reader.read_var_bytes()?)?;
        let max_fulfillment_length = reader.read_var_uint()?;
        Ok(Self::new(bitmask, hash, max_fulfillment_length))
    }

    /// Parse a complete binary condition.
    pub fn from_binary(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let condition = Self::read_from(&mut reader)?;
        reader.finish()?;
        Ok(condition)
    }
}

fn hash_from_slice(bytes: &[u8]) -> Result<[u8; HASH_LENGTH]> {
    bytes.try_into().map_err(|_| ConditionError::InvalidLength {
        field: "hash",
        expected: HASH_LENGTH,
        actual: bytes.len(),
    })
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Condition({:x}, {}..., {})",
            self.bitmask,
            &self.hash_hex()[..16],
            self.max_fulfillment_length
        )
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize_uri())
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_uri(s)
    }
}

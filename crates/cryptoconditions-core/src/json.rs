//! JSON view of a fulfillment tree.
//!
//! Meant for inspection and hand-built fixtures, not for hashing. Byte fields
//! are hex; a threshold lists every child in insertion order, proven
//! children as `"type": "fulfillment"` and the rest as `"type": "condition"`.
//!
//! ```json
//! {
//!   "type": "fulfillment",
//!   "type_id": 4,
//!   "bitmask": 12,
//!   "threshold": 1,
//!   "subfulfillments": [
//!     { "type": "fulfillment", "type_id": 1, "bitmask": 1, "weight": 1, "preimage": "" },
//!     { "type": "condition", "bitmask": 8, "weight": 1, "hash": "a902...", "max_fulfillment_length": 113 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, HASH_LENGTH};
use crate::crypto::{PublicKey, Signature};
use crate::ed25519::Ed25519Sha256Fulfillment;
use crate::error::{ConditionError, Result};
use crate::fulfillment::Fulfillment;
use crate::preimage::PreimageSha256Fulfillment;
use crate::threshold::{Subcondition, ThresholdSha256Fulfillment, ENTRY_WEIGHT};
use crate::types::FulfillmentType;

/// One node of the JSON tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonNode {
    Fulfillment(JsonFulfillment),
    Condition(JsonCondition),
}

/// A fulfillment node. Only the fields of its own variant are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonFulfillment {
    pub type_id: u32,
    pub bitmask: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preimage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_dynamic_message_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subfulfillments: Option<Vec<JsonNode>>,
}

/// A condition-only node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonCondition {
    pub bitmask: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u64>,
    pub hash: String,
    pub max_fulfillment_length: u64,
}

impl From<&Condition> for JsonCondition {
    fn from(condition: &Condition) -> Self {
        Self {
            bitmask: condition.bitmask(),
            weight: None,
            hash: condition.hash_hex(),
            max_fulfillment_length: condition.max_fulfillment_length(),
        }
    }
}

impl TryFrom<&JsonCondition> for Condition {
    type Error = ConditionError;

    fn try_from(node: &JsonCondition) -> Result<Self> {
        let bytes = decode_hex(&node.hash)?;
        let hash = bytes
            .as_slice()
            .try_into()
            .map_err(|_| ConditionError::InvalidLength {
                field: "hash",
                expected: HASH_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(Condition::new(node.bitmask, hash, node.max_fulfillment_length))
    }
}

impl From<&Fulfillment> for JsonFulfillment {
    fn from(fulfillment: &Fulfillment) -> Self {
        let mut node = JsonFulfillment {
            type_id: fulfillment.type_id(),
            bitmask: fulfillment.bitmask(),
            ..Default::default()
        };
        match fulfillment {
            Fulfillment::Preimage(p) => {
                node.preimage = p.preimage().map(hex::encode);
            }
            Fulfillment::Ed25519(ed) => {
                node.public_key = ed.public_key().map(PublicKey::to_hex);
                node.message_prefix = Some(hex::encode(ed.message_prefix()));
                node.max_dynamic_message_length = Some(ed.max_dynamic_message_length());
                node.message = ed.message().map(hex::encode);
                node.signature = ed.signature().map(Signature::to_hex);
            }
            Fulfillment::Threshold(t) => {
                node.threshold = Some(t.threshold());
                node.subfulfillments = Some(t.subconditions().iter().map(child_node).collect());
            }
        }
        node
    }
}

fn child_node(child: &Subcondition) -> JsonNode {
    match child {
        Subcondition::Fulfillment(f) => JsonNode::Fulfillment(JsonFulfillment {
            weight: Some(ENTRY_WEIGHT),
            ..JsonFulfillment::from(f)
        }),
        Subcondition::Condition(c) => JsonNode::Condition(JsonCondition {
            weight: Some(ENTRY_WEIGHT),
            ..JsonCondition::from(c)
        }),
    }
}

impl TryFrom<&JsonFulfillment> for Fulfillment {
    type Error = ConditionError;

    fn try_from(node: &JsonFulfillment) -> Result<Self> {
        check_weight(node.weight)?;
        match FulfillmentType::from_type_id(node.type_id as u64)? {
            FulfillmentType::PreimageSha256 => {
                let mut preimage = PreimageSha256Fulfillment::new();
                if let Some(hex) = &node.preimage {
                    preimage.set_preimage(decode_hex(hex)?);
                }
                Ok(preimage.into())
            }
            FulfillmentType::Ed25519Sha256 => {
                let mut ed = Ed25519Sha256Fulfillment::default();
                if let Some(hex) = &node.public_key {
                    ed.set_public_key(PublicKey::from_hex(hex)?);
                }
                if let Some(hex) = &node.message_prefix {
                    ed.set_message_prefix(decode_hex(hex)?);
                }
                ed.set_max_dynamic_message_length(node.max_dynamic_message_length.unwrap_or(0));
                if let Some(hex) = &node.message {
                    ed.set_message(decode_hex(hex)?);
                }
                if let Some(hex) = &node.signature {
                    ed.set_signature(Signature::from_hex(hex)?);
                }
                Ok(ed.into())
            }
            FulfillmentType::ThresholdSha256 => {
                let mut threshold = ThresholdSha256Fulfillment::new();
                if let Some(t) = node.threshold {
                    threshold.set_threshold(t);
                }
                for child in node.subfulfillments.iter().flatten() {
                    match child {
                        JsonNode::Fulfillment(f) => {
                            threshold.add_subfulfillment(Fulfillment::try_from(f)?)
                        }
                        JsonNode::Condition(c) => {
                            check_weight(c.weight)?;
                            threshold.add_subcondition(Condition::try_from(c)?)
                        }
                    }
                }
                Ok(threshold.into())
            }
        }
    }
}

fn check_weight(weight: Option<u64>) -> Result<()> {
    match weight {
        None | Some(ENTRY_WEIGHT) => Ok(()),
        Some(other) => Err(ConditionError::UnsupportedWeight(other)),
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    hex::decode(s).map_err(|e| ConditionError::Decoding(e.to_string()))
}

impl Fulfillment {
    /// Render the tree as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&JsonNode::Fulfillment(JsonFulfillment::from(self)))
            .map_err(|e| ConditionError::Encoding(e.to_string()))
    }

    /// Rebuild a tree from its JSON view.
    ///
    /// The root must be a fulfillment node. Bitmasks of fulfillment nodes are
    /// informational and recomputed from the tree.
    pub fn from_json(json: &str) -> Result<Self> {
        let node: JsonNode =
            serde_json::from_str(json).map_err(|e| ConditionError::Decoding(e.to_string()))?;
        match node {
            JsonNode::Fulfillment(f) => Fulfillment::try_from(&f),
            JsonNode::Condition(_) => Err(ConditionError::Decoding(
                "root must be a fulfillment".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    const ED25519_ILP: &str = concat!(
        "cf:1:8:IOwXK5OtXlY79JMscOEkUDTDVGfvLv1NZOv4GWg0Z-K_DEhlbGxvIHdvcmxkISAVIENvbmRpdGlvbnMgYXJlIGhlcmUhQENbql531",
        "PbCJlRUvKjP56k0XKJMOrIGo2F66ueuTtRnYrJB2t2ZttdfXM4gzD_87eH1nZTpu4rTkAx81hSdpwI"
    );

    #[test]
    fn test_preimage_json() {
        let fulfillment = Fulfillment::from_uri("cf:1:1:AA").unwrap();
        let value: serde_json::Value = serde_json::from_str(&fulfillment.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "fulfillment", "type_id": 1, "bitmask": 1, "preimage": ""})
        );

        let parsed = Fulfillment::from_json(&fulfillment.to_json().unwrap()).unwrap();
        assert_eq!(parsed, fulfillment);
    }

    #[test]
    fn test_signed_ed25519_json() {
        let fulfillment = Fulfillment::from_uri(ED25519_ILP).unwrap();
        let json = fulfillment.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type_id"], 8);
        assert_eq!(
            value["public_key"],
            "ec172b93ad5e563bf4932c70e1245034c35467ef2efd4d64ebf819683467e2bf"
        );
        assert_eq!(value["message_prefix"], hex::encode("Hello world!"));
        assert_eq!(value["max_dynamic_message_length"], 32);

        let parsed = Fulfillment::from_json(&json).unwrap();
        assert_eq!(parsed.serialize_uri().unwrap(), ED25519_ILP);
        assert!(parsed.validate(None));
    }

    #[test]
    fn test_unsigned_ed25519_json() {
        let keypair = Keypair::from_seed(&[5; 32]);
        let fulfillment = Fulfillment::from(Ed25519Sha256Fulfillment::new(keypair.public_key()));
        let json = fulfillment.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("signature").is_none());

        let parsed = Fulfillment::from_json(&json).unwrap();
        assert_eq!(parsed.condition().unwrap(), fulfillment.condition().unwrap());
        assert_eq!(parsed.to_json().unwrap(), json);
    }

    #[test]
    fn test_threshold_json_keeps_condition_children() {
        let mut threshold = ThresholdSha256Fulfillment::with_threshold(1);
        threshold.add_subfulfillment(PreimageSha256Fulfillment::with_preimage("a"));
        threshold.add_subcondition(Fulfillment::from_uri(ED25519_ILP).unwrap().condition().unwrap());
        let fulfillment = Fulfillment::from(threshold);

        let json = fulfillment.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["threshold"], 1);
        assert_eq!(value["bitmask"], 0x04 | 0x01 | 0x08);
        assert_eq!(value["subfulfillments"][0]["type"], "fulfillment");
        assert_eq!(value["subfulfillments"][0]["weight"], 1);
        assert_eq!(value["subfulfillments"][1]["type"], "condition");
        assert_eq!(value["subfulfillments"][1]["max_fulfillment_length"], 113);

        let parsed = Fulfillment::from_json(&json).unwrap();
        assert_eq!(parsed, fulfillment);
        assert_eq!(parsed.condition().unwrap(), fulfillment.condition().unwrap());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            Fulfillment::from_json("not json"),
            Err(ConditionError::Decoding(_))
        ));
        assert_eq!(
            Fulfillment::from_json(r#"{"type":"fulfillment","type_id":2,"bitmask":2}"#),
            Err(ConditionError::UnsupportedType(2))
        );
        assert!(Fulfillment::from_json(
            r#"{"type":"condition","bitmask":1,"hash":"00","max_fulfillment_length":1}"#
        )
        .is_err());

        let weighted = r#"{"type":"fulfillment","type_id":4,"bitmask":5,"threshold":1,
            "subfulfillments":[{"type":"fulfillment","type_id":1,"bitmask":1,"weight":2,"preimage":""}]}"#;
        assert_eq!(
            Fulfillment::from_json(weighted),
            Err(ConditionError::UnsupportedWeight(2))
        );
    }
}

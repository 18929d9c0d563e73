//! M-of-N threshold combinator.
//!
//! The condition commits to the threshold, the child count and every child
//! condition in canonical order, so it does not depend on insertion order or
//! on which children end up proven.
//!
//! Payload layout:
//!
//! ```txt
//! varuint(threshold)
//! varuint(F) F x (varuint(weight = 1) fulfillment_binary)
//! varuint(C) C x (varuint(weight = 1) condition_binary)
//! ```
//!
//! Serializing picks the `threshold` smallest provable children as full
//! fulfillments and writes every other child as a bare condition.

use crate::codec::{canonical_cmp, sort_canonical, Reader, Writer};
use crate::condition::Condition;
use crate::crypto::{sha256, PublicKey};
use crate::ed25519::Ed25519Sha256Fulfillment;
use crate::error::{ConditionError, Result};
use crate::fulfillment::{Fulfillment, FulfillmentVariant};
use crate::types::FulfillmentType;

/// Weight of every entry. Weighted thresholds are not supported.
pub const ENTRY_WEIGHT: u64 = 1;

/// Framing added to a child's own maximum length when it is embedded: one
/// byte of weight and one byte of type id.
pub const ENTRY_OVERHEAD: u64 = 2;

/// A child of a threshold node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subcondition {
    /// A child that can be proven.
    Fulfillment(Fulfillment),
    /// A child known only by its condition.
    Condition(Condition),
}

impl Subcondition {
    /// The condition of this child.
    pub fn condition(&self) -> Result<Condition> {
        match self {
            Subcondition::Fulfillment(f) => f.condition(),
            Subcondition::Condition(c) => Ok(*c),
        }
    }

    pub fn bitmask(&self) -> u32 {
        match self {
            Subcondition::Fulfillment(f) => f.bitmask(),
            Subcondition::Condition(c) => c.bitmask(),
        }
    }

    pub fn as_fulfillment(&self) -> Option<&Fulfillment> {
        match self {
            Subcondition::Fulfillment(f) => Some(f),
            Subcondition::Condition(_) => None,
        }
    }
}

/// A threshold fulfillment under construction or parsed from the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdSha256Fulfillment {
    threshold: Option<u64>,
    subconditions: Vec<Subcondition>,
}

/// A child chosen to be embedded in full.
struct Candidate<'a> {
    fulfillment: &'a Fulfillment,
    encoded: Vec<u8>,
    condition: Vec<u8>,
}

/// Outcome of the selection algorithm, both lists in canonical order.
struct Selection<'a> {
    fulfillments: Vec<Candidate<'a>>,
    conditions: Vec<Vec<u8>>,
}

impl ThresholdSha256Fulfillment {
    /// Create an empty node whose threshold defaults to the child count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty node with an explicit threshold.
    pub fn with_threshold(threshold: u64) -> Self {
        Self {
            threshold: Some(threshold),
            subconditions: Vec::new(),
        }
    }

    pub fn set_threshold(&mut self, threshold: u64) {
        self.threshold = Some(threshold);
    }

    /// The effective threshold: the explicit value, or the child count.
    pub fn threshold(&self) -> u64 {
        self.threshold.unwrap_or(self.subconditions.len() as u64)
    }

    /// Add a child that can be proven.
    pub fn add_subfulfillment(&mut self, fulfillment: impl Into<Fulfillment>) {
        self.subconditions.push(Subcondition::Fulfillment(fulfillment.into()));
    }

    /// Add a child that is known only by its condition.
    pub fn add_subcondition(&mut self, condition: Condition) {
        self.subconditions.push(Subcondition::Condition(condition));
    }

    /// Every child in insertion (or parse) order.
    pub fn subconditions(&self) -> &[Subcondition] {
        &self.subconditions
    }

    /// The children currently carried as full fulfillments.
    pub fn subfulfillments(&self) -> Vec<&Fulfillment> {
        self.subconditions
            .iter()
            .filter_map(Subcondition::as_fulfillment)
            .collect()
    }

    /// The condition of every child, full or condition-only.
    pub fn all_subconditions(&self) -> Result<Vec<Condition>> {
        self.subconditions
            .iter()
            .map(Subcondition::condition)
            .collect()
    }

    /// Every Ed25519 fulfillment in this subtree bound to `public_key`.
    pub fn subfulfillments_for_public_key(
        &self,
        public_key: &PublicKey,
    ) -> Vec<&Ed25519Sha256Fulfillment> {
        let mut found = Vec::new();
        self.collect_for_public_key(public_key, &mut found);
        found
    }

    fn collect_for_public_key<'a>(
        &'a self,
        public_key: &PublicKey,
        found: &mut Vec<&'a Ed25519Sha256Fulfillment>,
    ) {
        for fulfillment in self.subconditions.iter().filter_map(Subcondition::as_fulfillment) {
            match fulfillment {
                Fulfillment::Ed25519(ed) if ed.public_key() == Some(public_key) => found.push(ed),
                Fulfillment::Threshold(nested) => nested.collect_for_public_key(public_key, found),
                _ => {}
            }
        }
    }

    /// Choose which children to embed in full.
    ///
    /// Children that carry no proof, and nested thresholds that cannot reach
    /// their own threshold, are demoted to condition-only entries. Among the
    /// rest the smallest encodings win, ties broken by canonical condition
    /// order.
    fn select(&self) -> Result<Selection<'_>> {
        let threshold = self.threshold();
        let mut candidates = Vec::new();
        let mut conditions = Vec::new();

        for child in &self.subconditions {
            let fulfillment = match child {
                Subcondition::Condition(c) => {
                    conditions.push(c.serialize_binary());
                    continue;
                }
                Subcondition::Fulfillment(f) => f,
            };

            let condition = fulfillment.condition()?.serialize_binary();
            if !carries_proof(fulfillment) {
                conditions.push(condition);
                continue;
            }
            match fulfillment.serialize_binary() {
                Ok(encoded) => candidates.push(Candidate {
                    fulfillment,
                    encoded,
                    condition,
                }),
                Err(ConditionError::ThresholdNotReached { .. }) => conditions.push(condition),
                Err(e) => return Err(e),
            }
        }

        let available = candidates.len() as u64;
        if available < threshold {
            return Err(ConditionError::ThresholdNotReached {
                threshold,
                available,
            });
        }

        candidates.sort_by(|a, b| {
            a.encoded
                .len()
                .cmp(&b.encoded.len())
                .then_with(|| canonical_cmp(&a.condition, &b.condition))
        });
        // available >= threshold, so this fits in usize
        let rest = candidates.split_off(threshold as usize);
        conditions.extend(rest.into_iter().map(|c| c.condition));

        candidates.sort_by(|a, b| canonical_cmp(&a.encoded, &b.encoded));
        sort_canonical(&mut conditions);

        Ok(Selection {
            fulfillments: candidates,
            conditions,
        })
    }
}

/// Whether a child has anything to prove with. Nested thresholds are
/// checked by serializing them.
fn carries_proof(fulfillment: &Fulfillment) -> bool {
    match fulfillment {
        Fulfillment::Preimage(p) => p.preimage().is_some(),
        Fulfillment::Ed25519(ed) => ed.is_signed(),
        Fulfillment::Threshold(_) => true,
    }
}

fn read_weight(reader: &mut Reader<'_>) -> Result<()> {
    match reader.read_var_uint()? {
        ENTRY_WEIGHT => Ok(()),
        other => Err(ConditionError::UnsupportedWeight(other)),
    }
}

impl FulfillmentVariant for ThresholdSha256Fulfillment {
    const TYPE: FulfillmentType = FulfillmentType::ThresholdSha256;

    fn bitmask(&self) -> u32 {
        self.subconditions
            .iter()
            .fold(Self::TYPE.feature_bit(), |mask, child| mask | child.bitmask())
    }

    fn condition(&self) -> Result<Condition> {
        let threshold = self.threshold();
        let conditions = self.all_subconditions()?;

        let mut encoded: Vec<Vec<u8>> = conditions.iter().map(Condition::serialize_binary).collect();
        sort_canonical(&mut encoded);

        let mut hasher = Writer::new();
        hasher.write_var_uint(Self::TYPE.type_id() as u64);
        hasher.write_var_uint(threshold);
        hasher.write_var_uint(conditions.len() as u64);
        for entry in &encoded {
            hasher.write(entry);
        }

        let mut lengths: Vec<u64> = conditions
            .iter()
            .map(Condition::max_fulfillment_length)
            .collect();
        lengths.sort_unstable();
        let take = usize::try_from(threshold).unwrap_or(usize::MAX);
        let max_fulfillment_length = lengths
            .iter()
            .take(take)
            .fold(0u64, |sum, len| sum.saturating_add(len.saturating_add(ENTRY_OVERHEAD)));

        Ok(Condition::new(
            self.bitmask(),
            sha256(&hasher.into_bytes()),
            max_fulfillment_length,
        ))
    }

    fn validate(&self, message: Option<&[u8]>) -> bool {
        let Ok(selection) = self.select() else {
            return false;
        };
        selection
            .fulfillments
            .iter()
            .all(|c| c.fulfillment.validate(message))
    }

    fn write_payload(&self, writer: &mut Writer) -> Result<()> {
        let selection = self.select()?;

        writer.write_var_uint(self.threshold());
        writer.write_var_uint(selection.fulfillments.len() as u64);
        for candidate in &selection.fulfillments {
            writer.write_var_uint(ENTRY_WEIGHT);
            writer.write(&candidate.encoded);
        }
        writer.write_var_uint(selection.conditions.len() as u64);
        for condition in &selection.conditions {
            writer.write_var_uint(ENTRY_WEIGHT);
            writer.write(condition);
        }
        Ok(())
    }

    fn read_payload(reader: &mut Reader<'_>) -> Result<Self> {
        reader.descend()?;
        let node = Self::read_entries(reader);
        reader.ascend();
        node
    }
}

impl ThresholdSha256Fulfillment {
    fn read_entries(reader: &mut Reader<'_>) -> Result<Self> {
        let mut node = Self::with_threshold(reader.read_var_uint()?);

        let fulfillments = reader.read_var_uint()?;
        for _ in 0..fulfillments {
            read_weight(reader)?;
            node.add_subfulfillment(Fulfillment::read_from(reader)?);
        }

        let conditions = reader.read_var_uint()?;
        for _ in 0..conditions {
            read_weight(reader)?;
            node.add_subcondition(Condition::read_from(reader)?);
        }

        Ok(node)
    }
}

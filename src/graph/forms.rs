//! Pairing form keys with their values.
//!
//! A form field arrives as two KEY_VALUE_SET blocks: the KEY side points at
//! the VALUE side through a VALUE relationship, and both point at their words
//! through CHILD relationships.
//!
//! Key texts are not unique within a document. When two fields resolve to
//! the same key text the pair produced later wins. Pairs are produced in key
//! block arrival order, then VALUE target order, so the surviving value is
//! always the one belonging to the last such field in the result.

use super::{resolve_text, BlockGraph};
use crate::model::{Block, RelationshipType};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// A resolved form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    /// Text of the KEY side
    pub key: String,
    /// Text of the VALUE side
    pub value: String,
}

impl KeyValuePair {
    /// Create a pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Form fields keyed by key text.
///
/// Lookups do not depend on insertion order. Use [`KeyValuePairs::sorted`]
/// for presentation; serialization is sorted by key as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValuePairs {
    entries: HashMap<String, String>,
}

impl KeyValuePairs {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Get the value for a key text.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no pairs were extracted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs sorted by key text.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(b.0));
        pairs
    }

    /// Iterate in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<KeyValuePair> for KeyValuePairs {
    fn from_iter<I: IntoIterator<Item = KeyValuePair>>(iter: I) -> Self {
        let mut pairs = Self::new();
        for pair in iter {
            if let Some(previous) = pairs.insert(pair.key.clone(), pair.value) {
                log::debug!(
                    "Key {:?} appears more than once, replacing value {:?}",
                    pair.key,
                    previous
                );
            }
        }
        pairs
    }
}

impl Serialize for KeyValuePairs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted = self.sorted();
        let mut map = serializer.serialize_map(Some(sorted.len()))?;
        for (key, value) in sorted {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Resolve every form field in production order, duplicates included.
///
/// A key block without a VALUE relationship yields nothing. A VALUE target
/// that does not resolve to a VALUE block yields nothing for that edge.
pub fn extract_pair_list(graph: &BlockGraph) -> Vec<KeyValuePair> {
    let mut keys: Vec<&Block> = Vec::new();
    let mut values: HashMap<&str, &Block> = HashMap::new();

    for block in graph.blocks() {
        if block.is_key() {
            keys.push(block);
        } else if block.is_value() {
            if let Some(id) = block.id() {
                values.entry(id).or_insert(block);
            }
        }
    }

    let mut pairs = Vec::new();
    for key_block in keys {
        let mut key_text: Option<String> = None;

        for value_id in key_block.related_ids(RelationshipType::Value) {
            let Some(value_block) = values.get(value_id) else {
                log::debug!(
                    "Key {:?} points at unresolved value {}",
                    key_block.id(),
                    value_id
                );
                continue;
            };

            let key = key_text
                .get_or_insert_with(|| resolve_text(graph, key_block))
                .clone();
            let value = resolve_text(graph, value_block);
            pairs.push(KeyValuePair { key, value });
        }
    }

    pairs
}

/// Resolve form fields into a mapping; a repeated key text keeps the value
/// produced last.
pub fn extract_pairs(graph: &BlockGraph) -> KeyValuePairs {
    extract_pair_list(graph).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(key_id: &str, key_word: &str, value_id: &str, value_word: &str) -> Vec<Block> {
        let kw = format!("{}-w", key_id);
        let vw = format!("{}-w", value_id);
        vec![
            Block::key(key_id)
                .with_values([value_id])
                .with_children([kw.as_str()]),
            Block::value(value_id).with_children([vw.as_str()]),
            Block::word(kw.as_str(), key_word),
            Block::word(vw.as_str(), value_word),
        ]
    }

    #[test]
    fn test_single_pair() {
        let graph = BlockGraph::from_blocks(field("k1", "Name", "v1", "Acme"));
        let pairs = extract_pairs(&graph);

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs.get("Name"), Some("Acme"));
    }

    #[test]
    fn test_key_without_value_relationship_is_dropped() {
        let graph = BlockGraph::from_blocks(vec![
            Block::key("k1").with_children(["w1"]),
            Block::word("w1", "Orphan"),
        ]);

        assert!(extract_pairs(&graph).is_empty());
    }

    #[test]
    fn test_unresolved_value_is_dropped() {
        let graph = BlockGraph::from_blocks(vec![
            Block::key("k1").with_values(["gone"]).with_children(["w1"]),
            Block::word("w1", "Date"),
        ]);

        assert!(extract_pair_list(&graph).is_empty());
    }

    #[test]
    fn test_value_edge_to_non_value_block_is_dropped() {
        let graph = BlockGraph::from_blocks(vec![
            Block::key("k1").with_values(["w2"]).with_children(["w1"]),
            Block::word("w1", "Date"),
            Block::word("w2", "not a value container"),
        ]);

        assert!(extract_pairs(&graph).is_empty());
    }

    #[test]
    fn test_empty_value_text_is_kept() {
        let graph = BlockGraph::from_blocks(vec![
            Block::key("k1").with_values(["v1"]).with_children(["w1"]),
            Block::value("v1"),
            Block::word("w1", "Signature"),
        ]);

        assert_eq!(extract_pairs(&graph).get("Signature"), Some(""));
    }

    #[test]
    fn test_duplicate_key_text_last_wins() {
        let mut blocks = field("k1", "Phone", "v1", "555-0100");
        blocks.extend(field("k2", "Phone", "v2", "555-0199"));
        let graph = BlockGraph::from_blocks(blocks);

        let list = extract_pair_list(&graph);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].value, "555-0100");

        let pairs = extract_pairs(&graph);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs.get("Phone"), Some("555-0199"));
    }

    #[test]
    fn test_sorted_and_serialized_by_key() {
        let mut blocks = field("k1", "Zip", "v1", "12345");
        blocks.extend(field("k2", "City", "v2", "Springfield"));
        let pairs = extract_pairs(&BlockGraph::from_blocks(blocks));

        assert_eq!(pairs.sorted(), vec![("City", "Springfield"), ("Zip", "12345")]);
        assert_eq!(
            serde_json::to_string(&pairs).unwrap(),
            r#"{"City":"Springfield","Zip":"12345"}"#
        );
    }
}

//! Result fragments and the typed edges between them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a result fragment.
///
/// Values the service may add later are kept verbatim in [`BlockType::Other`]
/// so that a raw result survives a deserialize/serialize round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    /// A whole page
    Page,
    /// A line of text
    Line,
    /// A single word
    Word,
    /// A key or value container of a form field
    KeyValueSet,
    /// A table
    Table,
    /// A table cell
    Cell,
    /// A merged table cell
    MergedCell,
    /// A checkbox or radio button
    SelectionElement,
    /// Any other block type
    Other(String),
}

impl BlockType {
    /// Wire name of the block type.
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Page => "PAGE",
            BlockType::Line => "LINE",
            BlockType::Word => "WORD",
            BlockType::KeyValueSet => "KEY_VALUE_SET",
            BlockType::Table => "TABLE",
            BlockType::Cell => "CELL",
            BlockType::MergedCell => "MERGED_CELL",
            BlockType::SelectionElement => "SELECTION_ELEMENT",
            BlockType::Other(name) => name,
        }
    }
}

impl From<String> for BlockType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "PAGE" => BlockType::Page,
            "LINE" => BlockType::Line,
            "WORD" => BlockType::Word,
            "KEY_VALUE_SET" => BlockType::KeyValueSet,
            "TABLE" => BlockType::Table,
            "CELL" => BlockType::Cell,
            "MERGED_CELL" => BlockType::MergedCell,
            "SELECTION_ELEMENT" => BlockType::SelectionElement,
            _ => BlockType::Other(name),
        }
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a relationship edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipType {
    /// Points at the fragments that make up this block
    Child,
    /// Points from a KEY container to its VALUE container
    Value,
    /// Any other relationship type
    Other(String),
}

impl RelationshipType {
    /// Wire name of the relationship type.
    pub fn as_str(&self) -> &str {
        match self {
            RelationshipType::Child => "CHILD",
            RelationshipType::Value => "VALUE",
            RelationshipType::Other(name) => name,
        }
    }
}

impl From<String> for RelationshipType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "CHILD" => RelationshipType::Child,
            "VALUE" => RelationshipType::Value,
            _ => RelationshipType::Other(name),
        }
    }
}

impl From<RelationshipType> for String {
    fn from(kind: RelationshipType) -> Self {
        match kind {
            RelationshipType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Role of a KEY_VALUE_SET block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    /// The label side of a form field
    Key,
    /// The filled-in side of a form field
    Value,
    /// Any other entity type
    Other(String),
}

impl EntityType {
    /// Wire name of the entity type.
    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Key => "KEY",
            EntityType::Value => "VALUE",
            EntityType::Other(name) => name,
        }
    }
}

impl From<String> for EntityType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "KEY" => EntityType::Key,
            "VALUE" => EntityType::Value,
            _ => EntityType::Other(name),
        }
    }
}

impl From<EntityType> for String {
    fn from(entity: EntityType) -> Self {
        match entity {
            EntityType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// A typed edge from one block to an ordered list of other blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Edge kind
    #[serde(rename = "Type")]
    pub kind: RelationshipType,

    /// Target block ids, in declaration order
    #[serde(rename = "Ids", default)]
    pub ids: Vec<String>,
}

impl Relationship {
    /// Create a relationship of the given kind.
    pub fn new<I, T>(kind: RelationshipType, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            kind,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single fragment of a recognized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    /// Identifier, unique within one job's result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Fragment kind
    pub block_type: BlockType,

    /// Recognized text (lines and words)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// KEY / VALUE markers for form containers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_types: Vec<EntityType>,

    /// Outgoing edges, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,

    /// Recognition confidence (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Page number (1-indexed) for multi-page jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// PRINTED or HANDWRITING for words
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_type: Option<String>,

    /// SELECTED or NOT_SELECTED for selection elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_status: Option<String>,

    /// Bounding box and polygon, kept as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<serde_json::Value>,
}

impl Block {
    /// Create a block with an id and a type.
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: Some(id.into()),
            block_type,
            text: None,
            entity_types: Vec::new(),
            relationships: Vec::new(),
            confidence: None,
            page: None,
            text_type: None,
            selection_status: None,
            geometry: None,
        }
    }

    /// Create a LINE block.
    pub fn line(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, BlockType::Line).with_text(text)
    }

    /// Create a WORD block.
    pub fn word(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, BlockType::Word).with_text(text)
    }

    /// Create a KEY_VALUE_SET block marked as KEY.
    pub fn key(id: impl Into<String>) -> Self {
        Self::new(id, BlockType::KeyValueSet).with_entity_type(EntityType::Key)
    }

    /// Create a KEY_VALUE_SET block marked as VALUE.
    pub fn value(id: impl Into<String>) -> Self {
        Self::new(id, BlockType::KeyValueSet).with_entity_type(EntityType::Value)
    }

    /// Set the text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add an entity type.
    pub fn with_entity_type(mut self, entity: EntityType) -> Self {
        self.entity_types.push(entity);
        self
    }

    /// Append a relationship.
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Append a CHILD relationship.
    pub fn with_children<I, T>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.with_relationship(Relationship::new(RelationshipType::Child, ids))
    }

    /// Append a VALUE relationship.
    pub fn with_values<I, T>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.with_relationship(Relationship::new(RelationshipType::Value, ids))
    }

    /// Set the page number.
    pub fn on_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Get the block id, if present.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Check the block type.
    pub fn is_type(&self, block_type: &BlockType) -> bool {
        &self.block_type == block_type
    }

    /// Check if the block is a LINE.
    pub fn is_line(&self) -> bool {
        self.block_type == BlockType::Line
    }

    /// Check if the block carries the given entity type.
    pub fn has_entity_type(&self, entity: &EntityType) -> bool {
        self.entity_types.iter().any(|e| e == entity)
    }

    /// Check if the block is the KEY side of a form field.
    pub fn is_key(&self) -> bool {
        self.block_type == BlockType::KeyValueSet && self.has_entity_type(&EntityType::Key)
    }

    /// Check if the block is the VALUE side of a form field.
    pub fn is_value(&self) -> bool {
        self.block_type == BlockType::KeyValueSet && self.has_entity_type(&EntityType::Value)
    }

    /// Target ids of every relationship of `kind`, in declaration order.
    pub fn related_ids(&self, kind: RelationshipType) -> impl Iterator<Item = &str> + '_ {
        self.relationships
            .iter()
            .filter(move |rel| rel.kind == kind)
            .flat_map(|rel| rel.ids.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_type_wire_names() {
        assert_eq!(BlockType::from("KEY_VALUE_SET".to_string()), BlockType::KeyValueSet);
        assert_eq!(BlockType::Line.as_str(), "LINE");
        assert_eq!(
            BlockType::from("SIGNATURE".to_string()),
            BlockType::Other("SIGNATURE".to_string())
        );
        assert_eq!(String::from(BlockType::Other("QUERY".into())), "QUERY");
    }

    #[test]
    fn test_block_deserialize() {
        let json = r#"{
            "Id": "k1",
            "BlockType": "KEY_VALUE_SET",
            "EntityTypes": ["KEY"],
            "Confidence": 91.5,
            "Relationships": [
                {"Type": "VALUE", "Ids": ["v1"]},
                {"Type": "CHILD", "Ids": ["w1", "w2"]}
            ]
        }"#;

        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.id(), Some("k1"));
        assert!(block.is_key());
        assert!(!block.is_value());
        assert_eq!(
            block.related_ids(RelationshipType::Child).collect::<Vec<_>>(),
            vec!["w1", "w2"]
        );
        assert_eq!(
            block.related_ids(RelationshipType::Value).collect::<Vec<_>>(),
            vec!["v1"]
        );
    }

    #[test]
    fn test_block_missing_id_still_deserializes() {
        let block: Block = serde_json::from_str(r#"{"BlockType": "LINE", "Text": "x"}"#).unwrap();
        assert_eq!(block.id(), None);
        assert!(block.is_line());
    }

    #[test]
    fn test_unknown_values_round_trip() {
        let json = r#"{"Id":"t1","BlockType":"TABLE_TITLE","EntityTypes":["COLUMN_HEADER"],"Relationships":[{"Type":"TITLE","Ids":["x"]}]}"#;
        let block: Block = serde_json::from_str(json).unwrap();
        let out = serde_json::to_string(&block).unwrap();
        assert!(out.contains("\"BlockType\":\"TABLE_TITLE\""));
        assert!(out.contains("\"COLUMN_HEADER\""));
        assert!(out.contains("\"Type\":\"TITLE\""));
    }

    #[test]
    fn test_confidence_keeps_service_digits() {
        let json = r#"{"Id":"w1","BlockType":"WORD","Text":"Acme","Confidence":99.87654113769531}"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert_eq!(block.confidence, Some(99.87654113769531));

        let out = serde_json::to_string(&block).unwrap();
        assert!(out.contains("\"Confidence\":99.87654113769531"), "{}", out);
    }

    #[test]
    fn test_related_ids_preserve_declaration_order() {
        let block = Block::new("l1", BlockType::Line)
            .with_children(["b", "a"])
            .with_values(["z"])
            .with_children(["c"]);

        let ids: Vec<_> = block.related_ids(RelationshipType::Child).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}

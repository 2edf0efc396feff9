//! Serde models for the persisted schema document.
//!
//! The wire shape is JSON with two top-level keys: `schemas` (ordered list,
//! first element is the root schema) and `schema_types` (enum catalog).
//! Attribute maps carry extra frontend bookkeeping fields (`_index`,
//! `is_leaf`, a redundant `name`); those are ignored on input and never
//! written back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full, flat schema document as persisted/exchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaCatalog {
    #[serde(default)]
    pub schemas: Vec<SchemaDefinition>,
    #[serde(default)]
    pub schema_types: Vec<EnumType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// One named schema: an ordered attribute list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    /// Declared attribute order. Older catalogs omit this; attribute-map key
    /// order is the fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<String>>,
    #[serde(default)]
    pub schema: BTreeMap<String, SchemaAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<String>,
}

impl SchemaDefinition {
    /// Attribute names in declaration order.
    pub fn ordered_names(&self) -> Vec<String> {
        match &self.orders {
            Some(orders) => orders.clone(),
            None => self.schema.keys().cloned().collect(),
        }
    }
}

/// A leaf field declaration inside a named schema.
///
/// `type` is either a basic type label (`文本`/`日期`/`数字`), an enum-type
/// label, or another schema's name (making the attribute a group reference).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaAttribute {
    #[serde(rename = "type")]
    pub attr_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "multi")]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<String>,
}

/// A user-defined enum type from the `schema_types` catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumType {
    pub label: String,
    #[serde(default)]
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    #[serde(default, rename = "isDefault")]
    pub is_default: bool,
}

//! Redline schema catalog (flat wire shape → typed tree)
//!
//! A schema catalog is the flat, order-indexed document exchanged with the
//! annotation frontend: an ordered `schemas` list (first element is the root
//! schema, the rest are reusable "normal" schemas) plus a `schema_types` enum
//! catalog. This crate normalizes that document into an indexed entity graph
//! and expands it into a rooted tree where every node carries its resolved
//! type classification and ancestry path.
//!
//! Pipeline: [`catalog::SchemaCatalog`] → [`entity::build_entity`] →
//! [`tree::build_tree`] → [`tree::annotate`] → path-based lookup via
//! [`tree::find_by_path`].
//!
//! The tree is built fresh per call and owned exclusively by the caller;
//! nothing here retains state across calls (schema/attribute indices come
//! from a counter scoped to one `build_entity` call).

pub mod catalog;
pub mod entity;
pub mod tree;
pub mod types;

use thiserror::Error;

/// Errors raised while normalizing or expanding a schema catalog.
///
/// Both variants are fatal for the whole translation call that triggered
/// the build.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema catalog has no schemas")]
    EmptyCatalog,
    #[error("schema type chain does not terminate (more than {limit} tree nodes)")]
    Cycle { limit: usize },
}

pub use catalog::{EnumType, EnumValue, SchemaAttribute, SchemaCatalog, SchemaDefinition};
pub use entity::{build_entity, Entity, EntityAttr, EntitySchema};
pub use tree::{
    annotate, build_tree, find_by_path, preorder, TreeNode, MAX_TREE_NODES, NODE_INDEX_FLOOR,
};
pub use types::{ResolvedType, TypeCatalog, TypeKind, BASIC_TYPE_LABELS};

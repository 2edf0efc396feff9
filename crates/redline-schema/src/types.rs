//! Type classification for schema attributes.
//!
//! An attribute's `type` string resolves against three namespaces, checked
//! in order: builtin basic types (case-insensitive), user-defined enum types
//! (exact), and normal-schema names (exact, making the attribute a group
//! reference). An unresolved type is not an error — legacy catalogs may
//! reference retired types — the node just stays an unclassified leaf.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Builtin basic type labels: text, date, number.
pub const BASIC_TYPE_LABELS: [&str; 3] = ["文本", "日期", "数字"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Basic,
    Enum,
    Group,
}

/// A resolved type: the catalog label it matched plus its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedType {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: TypeKind,
}

/// All types visible from one entity: basics, its enum types, and its
/// normal-schema names.
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    types: Vec<ResolvedType>,
}

impl TypeCatalog {
    pub fn from_entity(entity: &Entity) -> Self {
        let mut types: Vec<ResolvedType> = BASIC_TYPE_LABELS
            .iter()
            .map(|label| ResolvedType {
                label: (*label).to_string(),
                kind: TypeKind::Basic,
            })
            .collect();
        types.extend(entity.enum_types.iter().map(|e| ResolvedType {
            label: e.label.clone(),
            kind: TypeKind::Enum,
        }));
        types.extend(entity.normals.iter().map(|n| ResolvedType {
            label: n.name.clone(),
            kind: TypeKind::Group,
        }));
        Self { types }
    }

    /// Resolve a type name, or `None` when it matches nothing.
    pub fn classify(&self, type_name: &str) -> Option<&ResolvedType> {
        let folded = type_name.to_uppercase();
        for kind in [TypeKind::Basic, TypeKind::Enum, TypeKind::Group] {
            let hit = self.types.iter().filter(|t| t.kind == kind).find(|t| {
                if kind == TypeKind::Basic {
                    t.label.to_uppercase() == folded
                } else {
                    t.label == type_name
                }
            });
            if hit.is_some() {
                return hit;
            }
        }
        None
    }
}

//! Normalized in-memory form of a schema catalog.
//!
//! `build_entity` splits the flat catalog into the root ("top") schema and
//! the referenceable "normal" schemas, tagging every schema and attribute
//! with a monotonically increasing index. The counter is scoped to one call,
//! so indices are deterministic and independent calls never observe each
//! other.

use crate::catalog::{EnumType, SchemaCatalog, SchemaDefinition};
use crate::SchemaError;

/// Entity graph: top schema + normal schemas + enum-type catalog.
#[derive(Debug, Clone)]
pub struct Entity {
    pub top: EntitySchema,
    pub normals: Vec<EntitySchema>,
    pub enum_types: Vec<EnumType>,
}

#[derive(Debug, Clone)]
pub struct EntitySchema {
    /// Process-unique within one build call.
    pub index: u32,
    pub name: String,
    pub words: Option<String>,
    pub attrs: Vec<EntityAttr>,
}

#[derive(Debug, Clone)]
pub struct EntityAttr {
    pub index: u32,
    pub name: String,
    pub attr_type: String,
    pub required: bool,
    pub multiple: bool,
    pub words: String,
}

#[derive(Debug, Default)]
struct IndexCounter(u32);

impl IndexCounter {
    fn next(&mut self) -> u32 {
        self.0 += 1;
        self.0
    }
}

/// Normalize a catalog into an [`Entity`].
///
/// Fails with [`SchemaError::EmptyCatalog`] when the catalog declares no
/// schemas at all.
pub fn build_entity(catalog: &SchemaCatalog) -> Result<Entity, SchemaError> {
    let Some((top, normals)) = catalog.schemas.split_first() else {
        return Err(SchemaError::EmptyCatalog);
    };
    let mut counter = IndexCounter::default();
    let top = build_schema(top, &mut counter);
    let normals = normals
        .iter()
        .map(|def| build_schema(def, &mut counter))
        .collect();
    Ok(Entity {
        top,
        normals,
        enum_types: catalog.schema_types.clone(),
    })
}

fn build_schema(def: &SchemaDefinition, counter: &mut IndexCounter) -> EntitySchema {
    let index = counter.next();
    let attrs = def
        .ordered_names()
        .into_iter()
        .filter_map(|name| {
            def.schema.get(&name).map(|attr| EntityAttr {
                index: counter.next(),
                name: name.clone(),
                attr_type: attr.attr_type.clone(),
                required: attr.required,
                multiple: attr.multiple,
                words: attr.words.clone().unwrap_or_default(),
            })
        })
        .collect();
    EntitySchema {
        index,
        name: def.name.clone(),
        words: def.words.clone(),
        attrs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(raw: serde_json::Value) -> SchemaCatalog {
        serde_json::from_value(raw).expect("catalog deserializes")
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = build_entity(&SchemaCatalog::default()).expect_err("must fail");
        assert!(matches!(err, SchemaError::EmptyCatalog));
    }

    #[test]
    fn indices_are_monotonic_and_per_call() {
        let cat = catalog(serde_json::json!({
            "schemas": [
                {"name": "Top", "orders": ["a", "b"], "schema": {
                    "a": {"type": "文本"},
                    "b": {"type": "Sub"}
                }},
                {"name": "Sub", "orders": ["c"], "schema": {
                    "c": {"type": "文本"}
                }}
            ],
            "schema_types": []
        }));
        let entity = build_entity(&cat).expect("entity builds");
        assert_eq!(entity.top.index, 1);
        assert_eq!(entity.top.attrs[0].index, 2);
        assert_eq!(entity.top.attrs[1].index, 3);
        assert_eq!(entity.normals[0].index, 4);
        assert_eq!(entity.normals[0].attrs[0].index, 5);

        // A second build starts from scratch: output is reproducible.
        let again = build_entity(&cat).expect("entity builds");
        assert_eq!(again.top.index, 1);
        assert_eq!(again.normals[0].attrs[0].index, 5);
    }

    #[test]
    fn orders_win_over_map_key_order() {
        let cat = catalog(serde_json::json!({
            "schemas": [
                {"name": "Top", "orders": ["z", "a"], "schema": {
                    "a": {"type": "文本"},
                    "z": {"type": "文本"}
                }}
            ],
            "schema_types": []
        }));
        let entity = build_entity(&cat).expect("entity builds");
        let names: Vec<&str> = entity.top.attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}

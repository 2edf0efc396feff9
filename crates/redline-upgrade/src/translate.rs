//! v1.0 → v2.2 answer translation.
//!
//! Walks the legacy answer map, resolves each entry against a freshly built
//! schema tree, and re-encodes the drawn boxes / enum selections as v2.2
//! items. The tree is built, annotated, and discarded inside one call.

use tracing::trace;

use redline_schema::{annotate, build_entity, build_tree, find_by_path, SchemaCatalog, TreeNode};

use crate::answer_v1::{LegacyAnswerMap, LegacyComponent, LegacyEntry, LegacyField, LegacyItem};
use crate::answer_v2::{
    AnswerItemV2, AnswerKey, AnswerSetV2, BoxGroup, NodeSummary, SchemaSummary, V2Component,
    HANDLE_TYPE_WIREFRAME,
};
use crate::boxes::to_rect;
use crate::UpgradeError;

/// Separator the frontend used when one field label covers several repeated
/// occurrences.
pub const SPLIT_SYMBOL: &str = "|_|_|";

/// Translate a legacy answer map into the canonical v2.2 answer set.
///
/// Entries with no actual answer content are skipped. An entry whose path
/// has no matching tree node fails the whole call with
/// [`UpgradeError::UnresolvedPath`] — the caller decides whether to roll
/// back the row; a schema is never fabricated here.
pub fn translate(
    answers: &LegacyAnswerMap,
    catalog: &SchemaCatalog,
) -> Result<AnswerSetV2, UpgradeError> {
    let entity = build_entity(catalog)?;
    let mut tree = build_tree(&entity)?;
    annotate(&mut tree);
    let root_label = tree.label.clone();

    let mut items = Vec::new();
    for entry in answers.values() {
        if !has_answer(entry) {
            trace!(label = %entry.label, "entry has no answer content, skipping");
            continue;
        }
        let path = vec![root_label.clone(), entry.label.clone()];
        let node = find_by_path(&tree, &path).ok_or_else(|| UpgradeError::UnresolvedPath {
            path: path.clone(),
        })?;
        if node.children.is_empty() {
            translate_leaf(entry, node, &path, &mut items)?;
        } else {
            translate_group(entry, &tree, &path, &mut items)?;
        }
    }
    Ok(AnswerSetV2::new(items))
}

/// True iff the entry carries at least one enum selection or drawn box.
pub fn has_answer(entry: &LegacyEntry) -> bool {
    if entry.label.is_empty() || entry.items.is_empty() {
        return false;
    }
    entry.items.iter().any(|item| {
        non_empty_label(&item.enum_label)
            || item
                .fields
                .iter()
                .any(|f| !f.components.is_empty() || non_empty_label(&f.enum_label))
    })
}

fn non_empty_label(label: &Option<String>) -> bool {
    label.as_deref().is_some_and(|s| !s.is_empty())
}

/// One logical answer reassembled from incremental saves.
#[derive(Debug, Default)]
pub struct MergedItem {
    pub fields: Vec<LegacyField>,
    pub enum_label: String,
}

/// Merge the split item records of one entry.
///
/// The frontend persisted incrementally, so "boxes drawn" and "enum picked"
/// may live in separate items. Fields concatenate earliest-first; the last
/// present `enumLabel` wins (an empty string still overwrites). This merge
/// is order-dependent on purpose.
pub fn merge_answer_items(items: &[LegacyItem]) -> MergedItem {
    let mut merged = MergedItem::default();
    for item in items {
        if !item.fields.is_empty() {
            merged.fields.extend(item.fields.iter().cloned());
        }
        if let Some(label) = &item.enum_label {
            merged.enum_label = label.clone();
        }
    }
    merged
}

fn translate_leaf(
    entry: &LegacyEntry,
    node: &TreeNode,
    path: &[String],
    out: &mut Vec<AnswerItemV2>,
) -> Result<(), UpgradeError> {
    let merged = merge_answer_items(&entry.items);
    let key = encode_leaf_key(path)?;
    let value = (!merged.enum_label.is_empty()).then(|| merged.enum_label.clone());
    let data = if merged.fields.is_empty() {
        // Enum-only answer: no box groups at all.
        Vec::new()
    } else {
        merged
            .fields
            .iter()
            .map(field_group)
            .collect::<Result<_, _>>()?
    };
    out.push(answer_item(key, node, value, data));
    Ok(())
}

fn translate_group(
    entry: &LegacyEntry,
    tree: &TreeNode,
    path: &[String],
    out: &mut Vec<AnswerItemV2>,
) -> Result<(), UpgradeError> {
    for (occurrence, item) in entry.items.iter().enumerate() {
        for field in &item.fields {
            if field.components.is_empty() && !non_empty_label(&field.enum_label) {
                continue;
            }
            let mut field_path = path.to_vec();
            field_path.push(field.name.clone());
            let node =
                find_by_path(tree, &field_path).ok_or_else(|| UpgradeError::UnresolvedPath {
                    path: field_path.clone(),
                })?;
            let key = encode_group_key(&field_path, occurrence)?;
            let value = field.enum_label.clone().filter(|s| !s.is_empty());
            let data = if field.components.is_empty() {
                // Enum-only field.
                Vec::new()
            } else if !field.label.contains(SPLIT_SYMBOL) {
                vec![field_group(field)?]
            } else {
                let labels: Vec<&str> = field.label.split(SPLIT_SYMBOL).collect();
                split_labels(&labels, &field.components)
                    .into_iter()
                    .map(component_group)
                    .collect::<Result<_, _>>()?
            };
            out.push(answer_item(key, node, value, data));
        }
    }
    Ok(())
}

/// Partition `components` into one contiguous run per expected label.
///
/// Greedy shortest-prefix-first, left-to-right, no backtracking: for each
/// label, scan forward from the cursor for the shortest prefix whose
/// concatenated text equals the label; assign it and advance. A label with
/// no matching prefix gets an empty group and the cursor stays put, so later
/// labels retry from the same unconsumed position.
pub fn split_labels<'a>(
    labels: &[&str],
    components: &'a [LegacyComponent],
) -> Vec<&'a [LegacyComponent]> {
    let mut groups: Vec<&'a [LegacyComponent]> = vec![&components[0..0]; labels.len()];
    let mut cursor = 0;
    for (i, label) in labels.iter().enumerate() {
        let mut concatenated = String::new();
        for end in cursor..components.len() {
            concatenated.push_str(&components[end].text);
            if concatenated == *label {
                groups[i] = &components[cursor..=end];
                cursor = end + 1;
                break;
            }
        }
    }
    groups
}

/// `["a","b"]` → `'["a:0","b:0"]'`.
pub fn encode_leaf_key(path: &[String]) -> Result<String, UpgradeError> {
    let segments: Vec<String> = path.iter().map(|seg| format!("{seg}:0")).collect();
    Ok(serde_json::to_string(&segments)?)
}

/// `["a","b","c"]` at occurrence `n` → `'["a:0","b:n","c:0"]'`.
///
/// The suffix is appended unconditionally — a segment that already looks
/// indexed comes out doubled (`"x:0"` → `"x:0:0"`). Legacy data contains
/// such keys; do not "fix" them.
pub fn encode_group_key(path: &[String], occurrence: usize) -> Result<String, UpgradeError> {
    let segments: Vec<String> = path
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            if i == 1 {
                format!("{seg}:{occurrence}")
            } else {
                format!("{seg}:0")
            }
        })
        .collect();
    Ok(serde_json::to_string(&segments)?)
}

fn answer_item(
    key: String,
    node: &TreeNode,
    value: Option<String>,
    data: Vec<BoxGroup>,
) -> AnswerItemV2 {
    AnswerItemV2 {
        key: AnswerKey::Encoded(key),
        schema: SchemaSummary {
            data: NodeSummary::from_node(node),
        },
        // Explicit null when nothing was selected.
        value: Some(value),
        data,
    }
}

fn field_group(field: &LegacyField) -> Result<BoxGroup, UpgradeError> {
    component_group(&field.components)
}

fn component_group(components: &[LegacyComponent]) -> Result<BoxGroup, UpgradeError> {
    Ok(BoxGroup {
        boxes: components
            .iter()
            .map(component_to_v2)
            .collect::<Result<_, _>>()?,
        value: None,
        handle_type: HANDLE_TYPE_WIREFRAME.to_string(),
    })
}

fn component_to_v2(component: &LegacyComponent) -> Result<V2Component, UpgradeError> {
    Ok(V2Component {
        rect: to_rect(&component.frame_data)?,
        page: component.frame_data.page,
        text: component.text.clone(),
    })
}

//! Canonical (v2.x) answer shapes.

use serde::{Deserialize, Serialize};

use redline_schema::TreeNode;

use crate::UpgradeError;

/// Canonical answer version emitted by this crate.
pub const ANSWER_VERSION_2_2: &str = "2.2";

/// The only handle type the migration ever emits.
pub const HANDLE_TYPE_WIREFRAME: &str = "wireframe";

/// The canonical answer set: `{items, version: "2.2"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSetV2 {
    pub items: Vec<AnswerItemV2>,
    pub version: String,
}

impl AnswerSetV2 {
    pub fn new(items: Vec<AnswerItemV2>) -> Self {
        Self {
            items,
            version: ANSWER_VERSION_2_2.to_string(),
        }
    }
}

/// An answer key: a JSON-encoded array of `label:index` segments. The v2.0
/// wire sometimes stored the array directly instead of its encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
    Encoded(String),
    Parts(Vec<String>),
}

impl AnswerKey {
    /// Decode into path segments, whichever wire form the key arrived in.
    pub fn segments(&self) -> Result<Vec<String>, UpgradeError> {
        match self {
            AnswerKey::Encoded(raw) => Ok(serde_json::from_str(raw)?),
            AnswerKey::Parts(parts) => Ok(parts.clone()),
        }
    }

    pub fn encode(segments: &[String]) -> Result<Self, UpgradeError> {
        Ok(AnswerKey::Encoded(serde_json::to_string(segments)?))
    }
}

/// One canonical answer item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerItemV2 {
    pub key: AnswerKey,
    pub schema: SchemaSummary,
    /// Selected enum value. `None` means the field was absent on the wire
    /// (pre-2.2 shape); `Some(None)` is an explicit null. The normalizer
    /// only hoists into an *absent* value.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Option<String>>,
    #[serde(default)]
    pub data: Vec<BoxGroup>,
}

/// Schema summary attached to an answer item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSummary {
    pub data: NodeSummary,
}

/// The tree-node fields an answer item retains.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSummary {
    pub label: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "multi")]
    pub multiple: bool,
    #[serde(default)]
    pub words: String,
}

impl NodeSummary {
    pub fn from_node(node: &TreeNode) -> Self {
        Self {
            label: node.label.clone(),
            type_name: node.attr_type.clone(),
            required: node.required,
            multiple: node.multiple,
            words: node.words.clone(),
        }
    }
}

/// One group of drawn boxes (one repeated occurrence of a field).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxGroup {
    #[serde(default)]
    pub boxes: Vec<V2Component>,
    /// Per-group enum value, only present in v2.0 data (hoisted by the
    /// normalizer, but never cleared here).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "handleType", default = "wireframe")]
    pub handle_type: String,
}

fn wireframe() -> String {
    HANDLE_TYPE_WIREFRAME.to_string()
}

// A bare `Option<Option<T>>` collapses a present-but-null field into the
// outer `None`; routing through the inner option keeps the two apart.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// A drawn box with its page and recognized text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct V2Component {
    #[serde(rename = "box")]
    pub rect: crate::boxes::RectBox,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_decodes_both_wire_forms() {
        let encoded = AnswerKey::Encoded(r#"["LRs:0","A1:0"]"#.to_string());
        assert_eq!(encoded.segments().expect("decodes"), vec!["LRs:0", "A1:0"]);

        let parts = AnswerKey::Parts(vec!["LRs".to_string(), "A1".to_string()]);
        assert_eq!(parts.segments().expect("decodes"), vec!["LRs", "A1"]);
    }

    #[test]
    fn key_rejects_non_array_encoding() {
        let bad = AnswerKey::Encoded("not json".to_string());
        assert!(bad.segments().is_err());
    }

    #[test]
    fn absent_null_and_set_values_deserialize_distinctly() {
        let absent: AnswerItemV2 = serde_json::from_value(serde_json::json!({
            "key": "[\"a:0\"]", "schema": {"data": {"label": "a", "type": "文本"}}, "data": []
        }))
        .expect("item deserializes");
        assert!(absent.value.is_none());

        let null: AnswerItemV2 = serde_json::from_value(serde_json::json!({
            "key": "[\"a:0\"]", "schema": {"data": {"label": "a", "type": "文本"}},
            "value": null, "data": []
        }))
        .expect("item deserializes");
        assert_eq!(null.value, Some(None));

        let set: AnswerItemV2 = serde_json::from_value(serde_json::json!({
            "key": "[\"a:0\"]", "schema": {"data": {"label": "a", "type": "文本"}},
            "value": "yes", "data": []
        }))
        .expect("item deserializes");
        assert_eq!(set.value, Some(Some("yes".to_string())));
    }

    #[test]
    fn box_group_defaults_to_wireframe_handle() {
        let group: BoxGroup =
            serde_json::from_value(serde_json::json!({"boxes": []})).expect("group deserializes");
        assert_eq!(group.handle_type, HANDLE_TYPE_WIREFRAME);
    }
}

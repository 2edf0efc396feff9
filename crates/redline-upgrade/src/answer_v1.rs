//! Legacy (v1.0) answer wire shapes.
//!
//! A v1 answer document is a JSON object keyed by an opaque content hash;
//! each entry carries the schema path it answers, plus one item per save —
//! the frontend persisted incrementally, so one logical answer may be split
//! across several items (see `translate::merge_answer_items`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::boxes::FrameBox;

/// Opaque content-hash key → answer entry. Entries are processed in sorted
/// key order.
pub type LegacyAnswerMap = BTreeMap<String, LegacyEntry>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyEntry {
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub type_name: String,
    #[serde(default, rename = "schemaPath")]
    pub schema_path: Vec<String>,
    #[serde(default)]
    pub items: Vec<LegacyItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyItem {
    #[serde(default)]
    pub fields: Vec<LegacyField>,
    /// Absent and empty are distinct: an empty string still overwrites the
    /// merged enum label.
    #[serde(default, rename = "enumLabel", skip_serializing_if = "Option::is_none")]
    pub enum_label: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyField {
    #[serde(default)]
    pub name: String,
    /// Concatenated text of the drawn boxes; repeated occurrences are
    /// joined with the repeat separator (`translate::SPLIT_SYMBOL`).
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub components: Vec<LegacyComponent>,
    #[serde(default, rename = "enumLabel", skip_serializing_if = "Option::is_none")]
    pub enum_label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyComponent {
    #[serde(rename = "frameData")]
    pub frame_data: FrameBox,
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_production_shaped_entry() {
        let raw = serde_json::json!({
            "57ffc1ea": {
                "label": "test2",
                "type": "文本",
                "schemaPath": ["Wml", "test2"],
                "md5": "57ffc1ea",
                "items": [{
                    "fields": [{
                        "components": [{
                            "frameData": {
                                "height": "23.017", "left": "123.022", "top": "353.194",
                                "width": "376.211", "page": 1, "id": "page2:1543930402400",
                                "topleft": ["353.194", "123.022"], "type": "test2"
                            },
                            "text": "but the path of the just"
                        }],
                        "name": "test2",
                        "label": "but the path of the just"
                    }],
                    "schemaMD5": "57ffc1ea",
                    "enumLabel": ""
                }]
            }
        });
        let map: LegacyAnswerMap = serde_json::from_value(raw).expect("map deserializes");
        let entry = &map["57ffc1ea"];
        assert_eq!(entry.label, "test2");
        assert_eq!(entry.schema_path, vec!["Wml", "test2"]);
        assert_eq!(entry.items[0].enum_label.as_deref(), Some(""));
        assert_eq!(entry.items[0].fields[0].components[0].text, "but the path of the just");
    }
}

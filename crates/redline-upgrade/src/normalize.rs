//! v2.0 → v2.2 answer normalization.
//!
//! A much smaller compatibility pass than the v1 translation: canonicalize
//! answer keys to their indexed form, hoist the enum value to the top level
//! of each item, and drop box groups that lost all their boxes.

use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

use crate::answer_v2::{AnswerItemV2, AnswerKey};
use crate::UpgradeError;

fn indexed_segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".+:\d+$").expect("segment pattern compiles"))
}

/// Canonicalize v2.0 answer items in place.
///
/// Per item, in this order:
/// 1. If not every key segment already ends in `:index`, append `:0` to
///    *every* segment (even ones that were indexed) and re-encode.
/// 2. If the top-level `value` is absent, hoist the first non-empty
///    `data[].value`. The per-group values are left in place — the source
///    data carries that inconsistency and downstream consumers tolerate it.
/// 3. Drop `data` groups whose `boxes` are empty, preserving the order of
///    the rest.
pub fn normalize(items: &mut [AnswerItemV2]) -> Result<(), UpgradeError> {
    for item in items.iter_mut() {
        let segments = item.key.segments()?;
        if !segments.iter().all(|seg| indexed_segment_re().is_match(seg)) {
            let suffixed: Vec<String> = segments.iter().map(|seg| format!("{seg}:0")).collect();
            trace!(from = ?segments, to = ?suffixed, "re-indexing answer key");
            item.key = AnswerKey::encode(&suffixed)?;
        }

        if item.value.is_none() {
            let hoisted = item
                .data
                .iter()
                .find_map(|group| group.value.clone().filter(|v| !v.is_empty()));
            if let Some(value) = hoisted {
                item.value = Some(Some(value));
            }
        }

        item.data.retain(|group| !group.boxes.is_empty());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(raw: serde_json::Value) -> Vec<AnswerItemV2> {
        serde_json::from_value(raw).expect("items deserialize")
    }

    fn key_of(item: &AnswerItemV2) -> &str {
        match &item.key {
            AnswerKey::Encoded(raw) => raw,
            AnswerKey::Parts(_) => panic!("expected encoded key"),
        }
    }

    #[test]
    fn unindexed_key_gets_zero_suffix_on_every_segment() {
        let mut answers = items(serde_json::json!([{
            "key": "[\"LRs\",\"A2\"]",
            "schema": {"data": {"label": "A2", "type": "Rating"}},
            "data": []
        }]));
        normalize(&mut answers).expect("normalizes");
        assert_eq!(key_of(&answers[0]), r#"["LRs:0","A2:0"]"#);
    }

    #[test]
    fn partially_indexed_key_doubles_the_indexed_segment() {
        let mut answers = items(serde_json::json!([{
            "key": "[\"LRs:0\",\"A2\"]",
            "schema": {"data": {"label": "A2", "type": "Rating"}},
            "data": []
        }]));
        normalize(&mut answers).expect("normalizes");
        assert_eq!(key_of(&answers[0]), r#"["LRs:0:0","A2:0"]"#);
    }

    #[test]
    fn fully_indexed_key_is_untouched() {
        let mut answers = items(serde_json::json!([{
            "key": "[\"LRs:0\",\"A2:3\"]",
            "schema": {"data": {"label": "A2", "type": "Rating"}},
            "data": []
        }]));
        normalize(&mut answers).expect("normalizes");
        assert_eq!(key_of(&answers[0]), r#"["LRs:0","A2:3"]"#);
    }

    #[test]
    fn array_key_is_reencoded_when_unindexed() {
        let mut answers = items(serde_json::json!([{
            "key": ["LRs", "A2"],
            "schema": {"data": {"label": "A2", "type": "Rating"}},
            "data": []
        }]));
        normalize(&mut answers).expect("normalizes");
        assert_eq!(key_of(&answers[0]), r#"["LRs:0","A2:0"]"#);
    }

    #[test]
    fn first_non_empty_group_value_is_hoisted() {
        let mut answers = items(serde_json::json!([{
            "key": "[\"LRs:0\",\"A2:0\"]",
            "schema": {"data": {"label": "A2", "type": "Rating"}},
            "data": [
                {"boxes": [], "value": ""},
                {"boxes": [{"box": {"box_left": 1.0, "box_top": 2.0, "box_right": 3.0, "box_bottom": 4.0}, "page": 0, "text": "x"}], "value": "AAA"},
                {"boxes": [], "value": "AA"}
            ]
        }]));
        normalize(&mut answers).expect("normalizes");
        let item = &answers[0];
        assert_eq!(item.value, Some(Some("AAA".to_string())));
        // Empty-box groups are pruned after the hoist, order preserved.
        assert_eq!(item.data.len(), 1);
        // The hoisted value stays on its group too.
        assert_eq!(item.data[0].value.as_deref(), Some("AAA"));
    }

    #[test]
    fn explicit_null_value_is_not_overwritten() {
        let mut answers = items(serde_json::json!([{
            "key": "[\"LRs:0\",\"A2:0\"]",
            "schema": {"data": {"label": "A2", "type": "Rating"}},
            "value": null,
            "data": [
                {"boxes": [{"box": {"box_left": 1.0, "box_top": 2.0, "box_right": 3.0, "box_bottom": 4.0}, "page": 0, "text": "x"}], "value": "AAA"}
            ]
        }]));
        normalize(&mut answers).expect("normalizes");
        assert_eq!(answers[0].value, Some(None), "null is defined, no hoist");
    }

    #[test]
    fn malformed_key_fails() {
        let mut answers = items(serde_json::json!([{
            "key": "not a json array",
            "schema": {"data": {"label": "A2", "type": "Rating"}},
            "data": []
        }]));
        assert!(normalize(&mut answers).is_err());
    }
}

//! Redline answer migration (v1.0/v2.0 → canonical v2.2)
//!
//! One-shot/batch rewrite of stored answer documents into the canonical
//! v2.2 representation, driven by the separately stored schema catalog:
//!
//! - [`translate::translate`] — the v1.0 path: resolve each legacy entry
//!   against the schema tree and re-encode boxes/enum selections.
//! - [`normalize::normalize`] — the v2.0 path: canonicalize keys, hoist the
//!   enum value, prune empty box groups.
//! - [`upgrade_answer`] — the per-row boundary the external batch driver
//!   calls. Pure, synchronous, no I/O; errors propagate to the driver,
//!   which owns logging, per-row transactions, and skipping.

pub mod answer_v1;
pub mod answer_v2;
pub mod boxes;
pub mod normalize;
pub mod translate;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use redline_schema::{SchemaCatalog, SchemaError};

use crate::answer_v2::ANSWER_VERSION_2_2;

pub use crate::answer_v1::{LegacyAnswerMap, LegacyEntry, LegacyField, LegacyItem};
pub use crate::answer_v2::{
    AnswerItemV2, AnswerKey, AnswerSetV2, BoxGroup, NodeSummary, SchemaSummary, V2Component,
};
pub use crate::boxes::{to_frame, to_rect, FrameBox, RectBox};
pub use crate::normalize::normalize;
pub use crate::translate::{merge_answer_items, split_labels, translate, SPLIT_SYMBOL};

/// Errors raised while upgrading one answer document.
///
/// The core never catches these itself; the batch driver decides whether to
/// roll back and skip the row.
#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("answer path {path:?} has no matching schema node")]
    UnresolvedPath { path: Vec<String> },
    #[error("box field `{field}` is not numeric: `{value}`")]
    NonNumericBox { field: &'static str, value: String },
    #[error("malformed answer document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A legacy answer payload, discriminated once at the boundary by the
/// presence of an `items` field (v1.0 documents are keyed maps, v2.0
/// documents carry an item list).
#[derive(Debug)]
pub enum LegacyAnswer {
    V1(LegacyAnswerMap),
    V2(Vec<AnswerItemV2>),
}

impl LegacyAnswer {
    pub fn from_value(user_answer: &Value) -> Result<Self, UpgradeError> {
        match user_answer.get("items") {
            Some(items) => Ok(LegacyAnswer::V2(serde_json::from_value(items.clone())?)),
            None => Ok(LegacyAnswer::V1(serde_json::from_value(
                user_answer.clone(),
            )?)),
        }
    }
}

/// Upgrade one stored answer document.
///
/// Returns `Ok(None)` — no change needed — when the document is null, has
/// no `userAnswer`, or is already at version 2.2. Otherwise returns the
/// rewritten document `{userAnswer, schema}` with `schema` passed through
/// unchanged.
pub fn upgrade_answer(document: &Value) -> Result<Option<Value>, UpgradeError> {
    if document.is_null() {
        debug!("answer document is null, nothing to upgrade");
        return Ok(None);
    }
    let Some(user_answer) = document.get("userAnswer").filter(|v| !v.is_null()) else {
        debug!("document has no user answer, nothing to upgrade");
        return Ok(None);
    };
    if user_answer.get("version").and_then(Value::as_str) == Some(ANSWER_VERSION_2_2) {
        debug!("answer already at version 2.2, nothing to upgrade");
        return Ok(None);
    }

    let upgraded = match LegacyAnswer::from_value(user_answer)? {
        LegacyAnswer::V1(map) => {
            debug!(entries = map.len(), "translating v1.0 answer document");
            let catalog: SchemaCatalog = document
                .get("schema")
                .filter(|v| !v.is_null())
                .map(|v| serde_json::from_value(v.clone()))
                .transpose()?
                .unwrap_or_default();
            translate(&map, &catalog)?
        }
        LegacyAnswer::V2(mut items) => {
            debug!(items = items.len(), "normalizing v2.0 answer document");
            normalize(&mut items)?;
            AnswerSetV2::new(items)
        }
    };

    Ok(Some(serde_json::json!({
        "userAnswer": upgraded,
        "schema": document.get("schema").cloned().unwrap_or(Value::Null),
    })))
}

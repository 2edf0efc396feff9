//! Box codec: v1 frame rectangles ⟷ v2 (left, top, right, bottom) boxes.
//!
//! The legacy frontend stored geometry as strings (`left`/`top`/`width`/
//! `height`); v2 stores absolute edges as numbers. Conversion is lossless up
//! to floating rounding of the derived width/height.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::UpgradeError;

/// A numeric field that may arrive as a JSON number or a stringified number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn as_f64(&self, field: &'static str) -> Result<f64, UpgradeError> {
        match self {
            Scalar::Number(n) => Ok(*n),
            Scalar::Text(s) => s.trim().parse::<f64>().map_err(|_| UpgradeError::NonNumericBox {
                field,
                value: s.clone(),
            }),
        }
    }
}

/// v1 highlighted region: absolute corner plus width/height, page-relative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameBox {
    pub left: Scalar,
    pub top: Scalar,
    pub width: Scalar,
    pub height: Scalar,
    #[serde(default)]
    pub page: i64,
    /// Opaque to consumers; synthesized on the way back from v2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topleft: Option<[String; 2]>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub box_type: Option<String>,
}

/// v2 region edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectBox {
    pub box_left: f64,
    pub box_top: f64,
    pub box_right: f64,
    pub box_bottom: f64,
}

/// Convert a frame rectangle to v2 edges.
///
/// Fails with [`UpgradeError::NonNumericBox`] when any geometry field does
/// not parse as a number.
pub fn to_rect(frame: &FrameBox) -> Result<RectBox, UpgradeError> {
    let left = frame.left.as_f64("left")?;
    let top = frame.top.as_f64("top")?;
    let width = frame.width.as_f64("width")?;
    let height = frame.height.as_f64("height")?;
    Ok(RectBox {
        box_left: left,
        box_top: top,
        box_right: left + width,
        box_bottom: top + height,
    })
}

/// Convert v2 edges back to a v1 frame rectangle.
///
/// The synthesized `id` embeds the wall clock (`"page{n+1}:{millis}"`), so
/// it is non-deterministic; legacy consumers treat it as opaque.
pub fn to_frame(rect: &RectBox, page: i64, label: &str) -> FrameBox {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    FrameBox {
        left: Scalar::Text(fmt_num(rect.box_left)),
        top: Scalar::Text(fmt_num(rect.box_top)),
        width: Scalar::Text(fmt_num(rect.box_right - rect.box_left)),
        height: Scalar::Text(fmt_num(rect.box_bottom - rect.box_top)),
        page,
        id: Some(format!("page{}:{}", page + 1, millis)),
        topleft: Some([fmt_num(rect.box_top), fmt_num(rect.box_left)]),
        box_type: Some(label.to_string()),
    }
}

fn fmt_num(v: f64) -> String {
    // Shortest round-trip representation, matching how the legacy store
    // stringified its numbers.
    format!("{v}")
}

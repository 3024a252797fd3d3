use serde::Serialize;
use serde_json::{Map, Value};

/// Keys owned by the canonical result; raw fields with these names never
/// reach the passthrough bag.
pub const CANONICAL_KEYS: [&str; 3] = ["imageWidth", "imageHeight", "boxes"];

/// Result of normalizing one detection payload.
///
/// Built fresh by every normalization call and never edited afterwards.
/// Display-space views are derived from it as separate values.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Original image width in pixels; `0` when the server did not say.
    pub image_width: f64,
    /// Original image height in pixels; `0` when the server did not say.
    pub image_height: f64,
    /// Boxes in the order the server sent them.
    pub boxes: Vec<DetectionBox>,
    /// Every other top-level raw field, kept for diagnostics only.
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}

impl DetectionResult {
    pub fn has_detections(&self) -> bool {
        !self.boxes.is_empty()
    }

    pub fn total(&self) -> usize {
        self.boxes.len()
    }

    pub fn passthrough_field(&self, key: &str) -> Option<&Value> {
        self.passthrough.get(key)
    }
}

/// One detection in original-image pixel space.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DetectionBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    pub score: f64,
}

impl DetectionBox {
    /// Box from opposite corners. Extents are not clamped.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            ..Self::default()
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

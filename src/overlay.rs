//! Original-image to display-space mapping for box overlays.
//!
//! Images are shown with uniform scaling, so a single ratio is applied to
//! both axes. Mapping always produces new values; the canonical
//! `DetectionResult` is left untouched and can be re-mapped on every resize.

use serde::Serialize;

use crate::detect::{DetectionBox, DetectionResult};

/// Height used when the display height cannot be derived.
pub const PLACEHOLDER_DISPLAY_HEIGHT: f64 = 220.0;

/// Minimum score drawn by default.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.25;

/// Detection box in display coordinates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisplayBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
    pub score: f64,
}

impl DisplayBox {
    /// Overlay text, e.g. `person 93.4%`.
    pub fn caption(&self) -> String {
        format!("{} {:.1}%", self.label, self.score * 100.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScaledOverlay {
    /// `None` when either original dimension or the display width is unknown.
    pub display_height: Option<f64>,
    pub boxes: Vec<DisplayBox>,
}

impl ScaledOverlay {
    pub fn height_or(&self, placeholder: f64) -> f64 {
        self.display_height.unwrap_or(placeholder)
    }

    /// Boxes whose score reaches `threshold`.
    pub fn visible(&self, threshold: f64) -> impl Iterator<Item = &DisplayBox> + '_ {
        self.boxes.iter().filter(move |b| b.score >= threshold)
    }
}

/// Scale factor from original to display space, `1` when either width is
/// not positive.
pub fn scale_ratio(original_width: f64, display_width: f64) -> f64 {
    if original_width > 0.0 && display_width > 0.0 {
        display_width / original_width
    } else {
        1.0
    }
}

pub fn display_height(original_width: f64, original_height: f64, display_width: f64) -> Option<f64> {
    (original_width > 0.0 && original_height > 0.0 && display_width > 0.0)
        .then(|| display_width * original_height / original_width)
}

pub fn map_boxes(
    boxes: &[DetectionBox],
    original_width: f64,
    original_height: f64,
    display_width: f64,
) -> ScaledOverlay {
    let ratio = scale_ratio(original_width, display_width);
    ScaledOverlay {
        display_height: display_height(original_width, original_height, display_width),
        boxes: boxes.iter().map(|b| scale_box(b, ratio)).collect(),
    }
}

fn scale_box(b: &DetectionBox, ratio: f64) -> DisplayBox {
    DisplayBox {
        x: b.x * ratio,
        y: b.y * ratio,
        width: b.width * ratio,
        height: b.height * ratio,
        label: b.label.clone(),
        score: b.score,
    }
}

/// Original size to map from: the server-reported size when both dimensions
/// are positive, else the locally measured size, else `(0, 0)`.
pub fn resolve_original_size(result: &DetectionResult, local: Option<(u32, u32)>) -> (f64, f64) {
    if result.image_width > 0.0 && result.image_height > 0.0 {
        return (result.image_width, result.image_height);
    }
    local
        .map(|(w, h)| (f64::from(w), f64::from(h)))
        .unwrap_or((0.0, 0.0))
}

/// Resolve the original size and map every box for `display_width`.
pub fn map_result(
    result: &DetectionResult,
    local: Option<(u32, u32)>,
    display_width: f64,
) -> ScaledOverlay {
    let (width, height) = resolve_original_size(result, local);
    map_boxes(&result.boxes, width, height, display_width)
}

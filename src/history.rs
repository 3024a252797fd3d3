//! Past submissions as listed by the detections route.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::detect::{normalize, DetectionResult};

/// One stored submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: Option<String>,
    pub filename: Option<String>,
    pub annotated_image: Option<String>,
    pub annotated_image_url: Option<String>,
    pub timestamp: Option<String>,
    pub result: DetectionResult,
}

impl HistoryEntry {
    fn from_row(row: &Map<String, Value>) -> Self {
        Self {
            id: scalar_text(row.get("id")),
            filename: scalar_text(row.get("filename")),
            annotated_image: scalar_text(row.get("annotated_image")),
            annotated_image_url: scalar_text(row.get("annotated_image_url")),
            timestamp: scalar_text(row.get("timestamp")),
            result: normalize(&Value::Object(row.clone())),
        }
    }

    /// Where the annotated image can be fetched from.
    ///
    /// An absolute `annotated_image_url` wins; otherwise the stored path is
    /// resolved against `base` with Windows separators flipped.
    pub fn annotated_url(&self, base: &str) -> Option<String> {
        if let Some(url) = &self.annotated_image_url {
            return Some(url.clone());
        }
        let path = self.annotated_image.as_deref()?.replace('\\', "/");
        Some(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

/// Rows of a history payload, newest first.
///
/// The server lists rows oldest first. Anything other than an array yields
/// an empty history and non-object rows are skipped.
pub fn parse_history(raw: &Value) -> Vec<HistoryEntry> {
    let Some(rows) = raw.as_array() else {
        return Vec::new();
    };
    rows.iter()
        .rev()
        .filter_map(Value::as_object)
        .map(HistoryEntry::from_row)
        .collect()
}

fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

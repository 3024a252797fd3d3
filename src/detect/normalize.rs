use serde_json::{Map, Value};

use super::result::{DetectionBox, DetectionResult, CANONICAL_KEYS};

const LIST_KEYS: [&str; 3] = ["detections", "boxes", "predictions"];
const SCORE_KEYS: [&str; 2] = ["confidence", "score"];
const WIDTH_KEYS: [&str; 2] = ["imageWidth", "width"];
const HEIGHT_KEYS: [&str; 2] = ["imageHeight", "height"];
const DEFAULT_LABEL: &str = "object";

/// Normalize a raw detection payload into the canonical result.
///
/// The upstream schema is not fixed, so every field is probed by name in a
/// fixed precedence and anything missing or mistyped falls back to zero or
/// empty. This never fails.
pub fn normalize(raw: &Value) -> DetectionResult {
    let Some(obj) = raw.as_object() else {
        return DetectionResult::default();
    };

    let boxes = match first_present(obj, &LIST_KEYS) {
        Some(Value::Array(items)) => items.iter().map(normalize_item).collect(),
        _ => Vec::new(),
    };

    let image_width = first_present(obj, &WIDTH_KEYS)
        .and_then(coerce_number)
        .unwrap_or(0.0);
    let image_height = first_present(obj, &HEIGHT_KEYS)
        .and_then(coerce_number)
        .unwrap_or(0.0);

    let passthrough: Map<String, Value> = obj
        .iter()
        .filter(|(key, _)| !CANONICAL_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    DetectionResult {
        image_width,
        image_height,
        boxes,
        passthrough,
    }
}

/// Malformed items become zero boxes instead of being dropped, so the output
/// always has one box per raw item.
fn normalize_item(item: &Value) -> DetectionBox {
    let geometry = item
        .get("box")
        .and_then(corner_pair)
        .map(|[x1, y1, x2, y2]| DetectionBox::from_corners(x1, y1, x2, y2))
        .unwrap_or_default();

    DetectionBox {
        label: label_of(item),
        score: item
            .as_object()
            .and_then(|obj| first_present(obj, &SCORE_KEYS))
            .and_then(coerce_number)
            .unwrap_or(0.0),
        ..geometry
    }
}

fn corner_pair(value: &Value) -> Option<[f64; 4]> {
    let arr = value.as_array()?;
    if arr.len() != 4 {
        return None;
    }
    Some([
        coerce_number(&arr[0])?,
        coerce_number(&arr[1])?,
        coerce_number(&arr[2])?,
        coerce_number(&arr[3])?,
    ])
}

fn label_of(item: &Value) -> String {
    match item.get("label") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => DEFAULT_LABEL.to_string(),
    }
}

/// First key holding a non-null value.
fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn corner_pair_becomes_origin_and_extent() {
        let raw = json!({
            "detections": [{"label": "person", "confidence": 0.91, "box": [10, 20, 110, 70]}]
        });
        let result = normalize(&raw);
        let b = &result.boxes[0];
        assert_eq!((b.x, b.y, b.width, b.height), (10.0, 20.0, 100.0, 50.0));
        assert_eq!(b.label, "person");
        assert_eq!(b.score, 0.91);
    }

    #[test]
    fn empty_object_yields_empty_result() {
        let result = normalize(&json!({}));
        assert_eq!(result.image_width, 0.0);
        assert_eq!(result.image_height, 0.0);
        assert!(result.boxes.is_empty());
        assert!(result.passthrough.is_empty());
    }

    #[test]
    fn non_object_payload_degrades_to_empty() {
        assert_eq!(normalize(&json!([1, 2, 3])), DetectionResult::default());
        assert_eq!(normalize(&Value::Null), DetectionResult::default());
    }

    #[test]
    fn list_key_precedence() {
        let raw = json!({
            "boxes": [{"box": [0, 0, 1, 1]}],
            "predictions": [{}, {}]
        });
        assert_eq!(normalize(&raw).boxes.len(), 1);

        let raw = json!({"detections": null, "predictions": [{}, {}]});
        assert_eq!(normalize(&raw).boxes.len(), 2);
    }

    #[test]
    fn winning_list_key_that_is_not_an_array_is_empty() {
        let raw = json!({"detections": "pending", "boxes": [{}]});
        assert!(normalize(&raw).boxes.is_empty());
    }

    #[test]
    fn malformed_items_keep_their_slot() {
        let raw = json!({
            "detections": [
                {"label": "a", "box": [1, 2, 3]},
                {"label": "b", "box": [1, "x", 3, 4]},
                {"label": "c"},
                42,
                {"label": "e", "box": ["5", "6", "15", "26"]}
            ]
        });
        let result = normalize(&raw);
        assert_eq!(result.boxes.len(), 5);
        for b in &result.boxes[..4] {
            assert_eq!((b.x, b.y, b.width, b.height), (0.0, 0.0, 0.0, 0.0));
        }
        assert_eq!(result.boxes[3].label, "object");
        let last = &result.boxes[4];
        assert_eq!((last.x, last.y, last.width, last.height), (5.0, 6.0, 10.0, 20.0));
    }

    #[test]
    fn label_and_score_fallbacks() {
        let raw = json!({
            "detections": [
                {"score": 0.4},
                {"label": "", "confidence": "0.7"},
                {"label": 7, "confidence": null, "score": 0.2},
                {"label": {"nested": true}, "confidence": "high"}
            ]
        });
        let result = normalize(&raw);
        let labels: Vec<_> = result.boxes.iter().map(|b| b.label.as_str()).collect();
        let scores: Vec<_> = result.boxes.iter().map(|b| b.score).collect();
        assert_eq!(labels, ["object", "object", "7", "object"]);
        assert_eq!(scores, [0.4, 0.7, 0.2, 0.0]);
    }

    #[test]
    fn dimensions_prefer_image_keys() {
        let raw = json!({"imageWidth": 800, "width": 10, "height": "600"});
        let result = normalize(&raw);
        assert_eq!(result.image_width, 800.0);
        assert_eq!(result.image_height, 600.0);
    }

    #[test]
    fn passthrough_excludes_canonical_names() {
        let raw = json!({
            "imageWidth": 320,
            "boxes": [{"box": [0, 0, 4, 4]}],
            "filename": "dog.png",
            "result_path": "out/dog.png",
            "detections": []
        });
        let result = normalize(&raw);
        assert!(result.passthrough_field("imageWidth").is_none());
        assert!(result.passthrough_field("boxes").is_none());
        assert_eq!(result.passthrough_field("filename"), Some(&json!("dog.png")));
        assert_eq!(result.passthrough_field("detections"), Some(&json!([])));
        // "detections" wins the list lookup even though it is empty
        assert!(result.boxes.is_empty());
    }

    #[test]
    fn coercion_rules() {
        assert_eq!(coerce_number(&json!(3)), Some(3.0));
        assert_eq!(coerce_number(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!(true)), Some(1.0));
        assert_eq!(coerce_number(&json!([1])), None);
        assert_eq!(coerce_number(&json!("inf")), None);
    }
}

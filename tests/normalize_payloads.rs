//! Normalization against payload shapes seen from detection backends.

use serde_json::{json, Value};

use detection_pipeline::{map_boxes, normalize, DetectionResult};

/// Upload response of a backend that detects synchronously.
const YOLO_UPLOAD_RESPONSE: &str = r#"{
    "id": 12,
    "filename": "20240501101500_street.jpg",
    "detections": [
        {"label": "person", "confidence": 0.91, "box": [34, 50, 120, 310]},
        {"label": "car", "confidence": 0.78, "box": [200, 180, 460, 330]},
        {"label": "traffic light", "confidence": 0.33, "box": [400, 10, 420, 60]}
    ],
    "result_path": "results/20240501101500_street.jpg"
}"#;

/// Response of a backend using `predictions` and explicit image size.
const PREDICTIONS_RESPONSE: &str = r#"{
    "width": 1280,
    "height": 720,
    "predictions": [
        {"label": "dog", "score": "0.66", "box": ["10", "20", "110", "220"]},
        {"box": [1, 2, 3]}
    ]
}"#;

#[test]
fn synchronous_upload_response() {
    let raw: Value = serde_json::from_str(YOLO_UPLOAD_RESPONSE).unwrap();
    let result = normalize(&raw);

    assert_eq!(result.total(), 3);
    assert_eq!(result.image_width, 0.0);
    assert_eq!(result.image_height, 0.0);
    let person = &result.boxes[0];
    assert_eq!((person.x, person.y, person.width, person.height), (34.0, 50.0, 86.0, 260.0));
    let labels: Vec<_> = result.boxes.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, ["person", "car", "traffic light"]);
    assert_eq!(result.passthrough_field("id"), Some(&json!(12)));
    assert_eq!(
        result.passthrough_field("result_path"),
        Some(&json!("results/20240501101500_street.jpg"))
    );
}

#[test]
fn predictions_with_string_numbers() {
    let raw: Value = serde_json::from_str(PREDICTIONS_RESPONSE).unwrap();
    let result = normalize(&raw);

    assert_eq!(result.image_width, 1280.0);
    assert_eq!(result.image_height, 720.0);
    assert_eq!(result.total(), 2);
    let dog = &result.boxes[0];
    assert_eq!((dog.x, dog.y, dog.width, dog.height), (10.0, 20.0, 100.0, 200.0));
    assert_eq!(dog.score, 0.66);
    let broken = &result.boxes[1];
    assert_eq!(broken.label, "object");
    assert!(broken.is_degenerate());
    // "width"/"height" are not canonical names, so they stay visible
    assert_eq!(result.passthrough_field("width"), Some(&json!(1280)));
}

#[test]
fn box_count_matches_raw_list_length() {
    let items = vec![
        json!({"box": [0, 0, 10, 10]}),
        json!({"box": null}),
        json!({"box": [0, 0, 10]}),
        json!({"box": [0, 0, 10, 10, 10]}),
        json!("not an object"),
        json!(null),
        json!({"box": [true, false, "3", 4.5]}),
    ];
    for n in 0..=items.len() {
        let raw = json!({ "detections": items[..n].to_vec() });
        assert_eq!(normalize(&raw).total(), n);
    }
}

#[test]
fn canonical_fields_are_not_shadowed() {
    let raw = json!({
        "imageWidth": "640",
        "imageHeight": 480,
        "boxes": {"note": "not a list"},
        "detections": [{"label": "cup", "box": [1, 1, 2, 2]}]
    });
    let result = normalize(&raw);
    let serialized = serde_json::to_value(&result).unwrap();

    assert_eq!(serialized["imageWidth"], 640.0);
    assert_eq!(serialized["imageHeight"], 480.0);
    assert_eq!(serialized["boxes"][0]["label"], "cup");
    assert_eq!(serialized["detections"][0]["label"], "cup");
}

#[test]
fn normalizing_twice_gives_equal_results() {
    let raw: Value = serde_json::from_str(YOLO_UPLOAD_RESPONSE).unwrap();
    let first = normalize(&raw);
    let second = normalize(&raw);
    assert_eq!(first, second);
    assert_eq!(normalize(&json!({})), DetectionResult::default());
}

#[test]
fn normalized_boxes_feed_the_mapper() {
    let raw: Value = serde_json::from_str(PREDICTIONS_RESPONSE).unwrap();
    let result = normalize(&raw);
    let overlay = map_boxes(&result.boxes, result.image_width, result.image_height, 640.0);

    assert_eq!(overlay.display_height, Some(360.0));
    assert_eq!(overlay.boxes.len(), result.total());
    let dog = &overlay.boxes[0];
    assert_eq!((dog.x, dog.y, dog.width, dog.height), (5.0, 10.0, 50.0, 100.0));
}

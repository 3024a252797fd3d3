use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use tempfile::Builder;

use detection_pipeline::{PipelineConfig, PipelineError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "DETECT_CONFIG",
        "DETECT_API_BASE_URL",
        "DETECT_UPLOAD_ROUTE",
        "DETECT_DETECTIONS_ROUTE",
        "DETECT_HTTP_TIMEOUT_SECS",
        "DETECT_POLL_ATTEMPTS",
        "DETECT_POLL_INTERVAL_MS",
        "DETECT_SCORE_THRESHOLD",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_json_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = Builder::new().suffix(".json").tempfile().expect("temp config");
    let json = r#"{
        "api": {
            "base_url": "http://detector.lan:8000/",
            "upload_route": "upload-image/",
            "detections_route": "/detections/",
            "timeout_secs": 5
        },
        "polling": { "max_attempts": 8, "interval_ms": 500 },
        "overlay": { "score_threshold": 0.4 }
    }"#;
    file.write_all(json.as_bytes()).expect("write config");

    std::env::set_var("DETECT_CONFIG", file.path());
    std::env::set_var("DETECT_POLL_ATTEMPTS", "12");
    std::env::set_var("DETECT_SCORE_THRESHOLD", "  ");

    let cfg = PipelineConfig::load().expect("load config");

    assert_eq!(cfg.api.base_url.as_deref(), Some("http://detector.lan:8000/"));
    assert_eq!(cfg.api.timeout, Duration::from_secs(5));
    assert_eq!(cfg.polling.max_attempts, 12);
    assert_eq!(cfg.polling.interval, Duration::from_millis(500));
    assert_eq!(cfg.overlay.score_threshold, 0.4);
    assert_eq!(
        cfg.api.endpoints().upload_url().unwrap(),
        "http://detector.lan:8000/upload-image/"
    );
    assert_eq!(
        cfg.api.endpoints().detections_url().unwrap(),
        "http://detector.lan:8000/detections/"
    );

    clear_env();
}

#[test]
fn loads_toml_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = Builder::new().suffix(".toml").tempfile().expect("temp config");
    file.write_all(
        b"[api]\nbase_url = \"https://detect.example\"\n\n[polling]\ninterval_ms = 250\n",
    )
    .expect("write config");
    std::env::set_var("DETECT_CONFIG", file.path());

    let cfg = PipelineConfig::load().expect("load config");
    assert_eq!(cfg.api.base_url.as_deref(), Some("https://detect.example"));
    assert_eq!(cfg.api.upload_route, "/upload");
    assert_eq!(cfg.polling.max_attempts, 10);
    assert_eq!(cfg.polling.interval, Duration::from_millis(250));

    clear_env();
}

#[test]
fn missing_base_url_is_reported_at_call_time() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = PipelineConfig::load().expect("config without base url still loads");
    assert!(cfg.api.base_url.is_none());
    match cfg.api.endpoints().upload_url() {
        Err(PipelineError::Configuration(msg)) => assert!(msg.contains("base URL")),
        other => panic!("expected configuration error, got {:?}", other),
    }

    clear_env();
}

#[test]
fn rejects_bad_numeric_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("DETECT_POLL_INTERVAL_MS", "soon");
    assert!(PipelineConfig::load().is_err());
    clear_env();

    std::env::set_var("DETECT_POLL_ATTEMPTS", "0");
    assert!(PipelineConfig::load().is_err());
    clear_env();

    std::env::set_var("DETECT_SCORE_THRESHOLD", "2");
    assert!(PipelineConfig::load().is_err());
    clear_env();
}

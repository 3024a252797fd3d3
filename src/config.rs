use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::overlay::{DEFAULT_SCORE_THRESHOLD, PLACEHOLDER_DISPLAY_HEIGHT};
use crate::poll::{PollPolicy, DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};
use crate::transport::{Endpoints, HttpDetectionService};

const DEFAULT_UPLOAD_ROUTE: &str = "/upload";
const DEFAULT_DETECTIONS_ROUTE: &str = "/detections";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
struct PipelineConfigFile {
    api: Option<ApiConfigFile>,
    polling: Option<PollingConfigFile>,
    overlay: Option<OverlayConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ApiConfigFile {
    base_url: Option<String>,
    upload_route: Option<String>,
    detections_route: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct PollingConfigFile {
    max_attempts: Option<u32>,
    interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct OverlayConfigFile {
    score_threshold: Option<f64>,
    placeholder_height: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api: ApiSettings,
    pub polling: PollPolicy,
    pub overlay: OverlaySettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Not required at load time; requests fail with a configuration error
    /// while it is missing.
    pub base_url: Option<String>,
    pub upload_route: String,
    pub detections_route: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct OverlaySettings {
    pub score_threshold: f64,
    pub placeholder_height: f64,
}

impl ApiSettings {
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            base_url: self.base_url.clone(),
            upload_route: self.upload_route.clone(),
            detections_route: self.detections_route.clone(),
        }
    }

    pub fn service(&self) -> HttpDetectionService {
        HttpDetectionService::new(self.endpoints(), self.timeout)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_file(PipelineConfigFile::default())
    }
}

impl PipelineConfig {
    /// File named by `DETECT_CONFIG` (if any), then `DETECT_*` overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("DETECT_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) if !path.trim().is_empty() => Some(read_config_file(Path::new(path))?),
            _ => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: PipelineConfigFile) -> Self {
        let api = file.api.unwrap_or_default();
        let polling = file.polling.unwrap_or_default();
        let overlay = file.overlay.unwrap_or_default();
        Self {
            api: ApiSettings {
                base_url: api.base_url.filter(|url| !url.trim().is_empty()),
                upload_route: api
                    .upload_route
                    .unwrap_or_else(|| DEFAULT_UPLOAD_ROUTE.to_string()),
                detections_route: api
                    .detections_route
                    .unwrap_or_else(|| DEFAULT_DETECTIONS_ROUTE.to_string()),
                timeout: Duration::from_secs(api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            },
            polling: PollPolicy {
                max_attempts: polling.max_attempts.unwrap_or(DEFAULT_POLL_ATTEMPTS),
                interval: Duration::from_millis(
                    polling.interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
                ),
            },
            overlay: OverlaySettings {
                score_threshold: overlay.score_threshold.unwrap_or(DEFAULT_SCORE_THRESHOLD),
                placeholder_height: overlay
                    .placeholder_height
                    .unwrap_or(PLACEHOLDER_DISPLAY_HEIGHT),
            },
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(url) = env_value("DETECT_API_BASE_URL") {
            self.api.base_url = Some(url);
        }
        if let Some(route) = env_value("DETECT_UPLOAD_ROUTE") {
            self.api.upload_route = route;
        }
        if let Some(route) = env_value("DETECT_DETECTIONS_ROUTE") {
            self.api.detections_route = route;
        }
        if let Some(secs) = env_value("DETECT_HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                anyhow!("DETECT_HTTP_TIMEOUT_SECS must be an integer number of seconds")
            })?;
            self.api.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = env_value("DETECT_POLL_ATTEMPTS") {
            self.polling.max_attempts = attempts
                .parse()
                .map_err(|_| anyhow!("DETECT_POLL_ATTEMPTS must be a positive integer"))?;
        }
        if let Some(interval) = env_value("DETECT_POLL_INTERVAL_MS") {
            let ms: u64 = interval.parse().map_err(|_| {
                anyhow!("DETECT_POLL_INTERVAL_MS must be an integer number of milliseconds")
            })?;
            self.polling.interval = Duration::from_millis(ms);
        }
        if let Some(threshold) = env_value("DETECT_SCORE_THRESHOLD") {
            self.overlay.score_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("DETECT_SCORE_THRESHOLD must be a number in [0, 1]"))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.polling.max_attempts == 0 {
            return Err(anyhow!("polling max_attempts must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.overlay.score_threshold) {
            return Err(anyhow!(
                "overlay score_threshold must be within [0, 1], got {}",
                self.overlay.score_threshold
            ));
        }
        if self.api.timeout.is_zero() {
            return Err(anyhow!("api timeout must be greater than zero"));
        }
        if !(self.overlay.placeholder_height > 0.0) {
            return Err(anyhow!("overlay placeholder_height must be positive"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<PipelineConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(path, &raw)
}

fn parse_config(path: &Path, raw: &str) -> Result<PipelineConfigFile> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))
    } else {
        serde_json::from_str(raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

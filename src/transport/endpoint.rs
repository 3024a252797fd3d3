use url::Url;

use crate::error::{PipelineError, Result};

/// Base URL plus the two routes of the detection service.
///
/// A missing base URL is reported when a request is about to be made, not
/// when configuration is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub base_url: Option<String>,
    pub upload_route: String,
    pub detections_route: String,
}

impl Endpoints {
    pub fn upload_url(&self) -> Result<String> {
        join_url(self.base_url.as_deref(), &self.upload_route)
    }

    pub fn detections_url(&self) -> Result<String> {
        join_url(self.base_url.as_deref(), &self.detections_route)
    }

    /// Validated base URL with trailing slashes removed.
    pub fn base(&self) -> Result<String> {
        validated_base(self.base_url.as_deref())
    }
}

pub fn join_url(base: Option<&str>, route: &str) -> Result<String> {
    let base = validated_base(base)?;
    let route = route.trim();
    if route.is_empty() {
        return Err(PipelineError::Configuration("route path is missing".into()));
    }
    if route.starts_with('/') {
        Ok(format!("{}{}", base, route))
    } else {
        Ok(format!("{}/{}", base, route))
    }
}

fn validated_base(base: Option<&str>) -> Result<String> {
    let base = base
        .map(str::trim)
        .filter(|base| !base.is_empty())
        .ok_or_else(|| PipelineError::Configuration("API base URL is missing".into()))?;
    let parsed = Url::parse(base).map_err(|e| {
        PipelineError::Configuration(format!("API base URL '{}' is invalid: {}", base, e))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(base.trim_end_matches('/').to_string()),
        other => Err(PipelineError::Configuration(format!(
            "unsupported API base URL scheme '{}'; expected http(s)",
            other
        ))),
    }
}

use anyhow::Context;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use super::endpoint::Endpoints;
use super::multipart;
use crate::error::{Operation, PipelineError, Result};

/// Multipart field name the upload route expects.
pub const UPLOAD_FIELD: &str = "file";

/// Encoded image ready for submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read an image file, guessing the content type from its extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read image {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string());
        let content_type = image::ImageFormat::from_path(path)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");
        Ok(Self::new(file_name, content_type, bytes))
    }
}

/// Remote detection service.
///
/// Every call returns the raw JSON payload; shaping it is the normalizer's
/// job.
pub trait DetectionService {
    /// Submit an image for detection.
    fn upload(&self, image: &ImageUpload) -> Result<Value>;

    /// Detections for a submission, or the most recent ones when
    /// `submission_id` is `None`.
    fn fetch_detections(&self, submission_id: Option<&str>) -> Result<Value>;

    /// All stored submissions.
    fn fetch_history(&self) -> Result<Value>;
}

/// `DetectionService` over blocking HTTP.
pub struct HttpDetectionService {
    agent: ureq::Agent,
    endpoints: Endpoints,
}

impl HttpDetectionService {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn get_json(&self, operation: Operation, submission_id: Option<&str>) -> Result<Value> {
        let url = self.endpoints.detections_url()?;
        let mut request = self.agent.get(&url);
        if let Some(id) = submission_id {
            request = request.query("id", id);
        }
        log::debug!("{}: GET {} (id={:?})", operation, url, submission_id);
        let response = request
            .call()
            .map_err(|e| PipelineError::from_ureq(operation, e))?;
        read_json(operation, response)
    }
}

impl DetectionService for HttpDetectionService {
    fn upload(&self, image: &ImageUpload) -> Result<Value> {
        let url = self.endpoints.upload_url()?;
        let body = multipart::encode_file(UPLOAD_FIELD, image);
        log::info!(
            "uploading {} ({} bytes, {}) to {}",
            image.file_name,
            image.bytes.len(),
            image.content_type,
            url
        );
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", &body.content_type())
            .send_bytes(&body.bytes)
            .map_err(|e| PipelineError::from_ureq(Operation::Upload, e))?;
        read_json(Operation::Upload, response)
    }

    fn fetch_detections(&self, submission_id: Option<&str>) -> Result<Value> {
        self.get_json(Operation::FetchDetections, submission_id)
    }

    fn fetch_history(&self) -> Result<Value> {
        self.get_json(Operation::FetchHistory, None)
    }
}

fn read_json(operation: Operation, response: ureq::Response) -> Result<Value> {
    let body = response
        .into_string()
        .map_err(|e| PipelineError::Transport {
            operation,
            message: format!("read response body: {}", e),
        })?;
    serde_json::from_str(&body).map_err(|e| PipelineError::Decode {
        operation,
        message: e.to_string(),
    })
}

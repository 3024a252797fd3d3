//! HTTP access to the remote detection service.
//!
//! Builds the upload and detections URLs, encodes the multipart upload and
//! maps transport, status and JSON failures onto `PipelineError`.

mod endpoint;
mod http;
mod multipart;

pub use endpoint::{join_url, Endpoints};
pub use http::{DetectionService, HttpDetectionService, ImageUpload, UPLOAD_FIELD};

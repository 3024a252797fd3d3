//! Detection Response Pipeline
//!
//! Client-side core for a remote object-detection service: submit an image,
//! wait for its detections, and map the boxes onto a display surface.
//!
//! # Data flow
//!
//! ```text
//! raw JSON -> normalize -> DetectionResult -> map_boxes -> ScaledOverlay -> renderer
//! ```
//!
//! 1. **Normalization** (`detect`): the service's schema is loose, so every
//!    payload is decoded field by field with fixed fallbacks and never fails.
//! 2. **Polling** (`poll`): when an upload has no detections yet, the
//!    detections route is fetched until boxes appear or the attempt budget is
//!    spent. Empty after the budget is a valid outcome; transport and decode
//!    errors end the loop at once.
//! 3. **Overlay mapping** (`overlay`): one uniform ratio from original pixels
//!    to display pixels, recomputed for every display width.
//!
//! `orchestrator::DetectionClient` ties the three together over a
//! `transport::DetectionService`. Rendering is left to the caller.

pub mod config;
pub mod detect;
pub mod error;
pub mod history;
pub mod image_size;
pub mod orchestrator;
pub mod overlay;
pub mod poll;
pub mod transport;

pub use config::PipelineConfig;
pub use detect::{normalize, DetectionBox, DetectionResult};
pub use error::{Operation, PipelineError};
pub use history::{parse_history, HistoryEntry};
pub use orchestrator::{submission_id, DetectionClient};
pub use overlay::{map_boxes, map_result, resolve_original_size, DisplayBox, ScaledOverlay};
pub use poll::{poll, CancelToken, PollPolicy, Sleeper, ThreadSleeper};
pub use transport::{DetectionService, Endpoints, HttpDetectionService, ImageUpload};

//! Upload, short-circuit or poll.
//!
//! Each `submit_and_detect` call owns its submission identifier and its poll
//! loop, so independent uploads can run on separate threads against the same
//! client.

use serde_json::Value;

use crate::detect::{normalize, DetectionResult};
use crate::error::Result;
use crate::history::{parse_history, HistoryEntry};
use crate::poll::{poll, CancelToken, PollPolicy, Sleeper, ThreadSleeper};
use crate::transport::{DetectionService, ImageUpload};

/// Response keys that may carry the submission identifier, in precedence
/// order.
pub const SUBMISSION_ID_KEYS: [&str; 5] = ["id", "imageId", "image_id", "uuid", "filename"];

pub struct DetectionClient<S, Z = ThreadSleeper> {
    service: S,
    policy: PollPolicy,
    sleeper: Z,
    cancel: Option<CancelToken>,
}

impl<S: DetectionService> DetectionClient<S> {
    pub fn new(service: S, policy: PollPolicy) -> Self {
        Self::with_sleeper(service, policy, ThreadSleeper)
    }
}

impl<S: DetectionService, Z: Sleeper> DetectionClient<S, Z> {
    pub fn with_sleeper(service: S, policy: PollPolicy, sleeper: Z) -> Self {
        Self {
            service,
            policy,
            sleeper,
            cancel: None,
        }
    }

    /// Stop polling early when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Submit `image` and return its detections.
    ///
    /// A response that already carries boxes is final. Otherwise the
    /// detections route is polled, scoped to the submission identifier when
    /// the upload response names one. An empty result after the poll budget
    /// is returned as-is.
    pub fn submit_and_detect(&self, image: &ImageUpload) -> Result<DetectionResult> {
        let raw = self.service.upload(image)?;
        let immediate = normalize(&raw);
        if immediate.has_detections() {
            log::info!(
                "upload of {} returned {} detection(s); skipping poll",
                image.file_name,
                immediate.total()
            );
            return Ok(immediate);
        }

        let submission_id = submission_id(&raw);
        match &submission_id {
            Some(id) => log::info!("polling detections for submission {}", id),
            None => log::info!("upload response has no submission id; polling latest detections"),
        }
        self.poll_detections(submission_id.as_deref())
    }

    /// Poll the detections route under this client's policy.
    pub fn poll_detections(&self, submission_id: Option<&str>) -> Result<DetectionResult> {
        poll(
            || {
                self.service
                    .fetch_detections(submission_id)
                    .map(|raw| normalize(&raw))
            },
            self.policy,
            &self.sleeper,
            self.cancel.as_ref(),
        )
    }

    /// Past submissions, newest first.
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        let raw = self.service.fetch_history()?;
        Ok(parse_history(&raw))
    }
}

/// Identifier correlating an upload with its delayed result.
///
/// The first non-null key among `SUBMISSION_ID_KEYS` decides. Strings are
/// taken as-is (an empty string means no identifier), numbers are rendered in
/// decimal, other JSON types are skipped.
pub fn submission_id(raw: &Value) -> Option<String> {
    let obj = raw.as_object()?;
    let found = SUBMISSION_ID_KEYS
        .iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })?;
    (!found.is_empty()).then_some(found)
}

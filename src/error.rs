use std::fmt;

/// Remote call a failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Upload,
    FetchDetections,
    FetchHistory,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Upload => "upload",
            Operation::FetchDetections => "fetch detections",
            Operation::FetchHistory => "fetch history",
        };
        f.write_str(name)
    }
}

/// Fatal pipeline failures.
///
/// An empty detection list is never an error; normalization always succeeds
/// and an exhausted poll budget returns the last (empty) result.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{operation} failed: server returned status {status}")]
    Status { operation: Operation, status: u16 },

    #[error("{operation} failed: {message}")]
    Transport {
        operation: Operation,
        message: String,
    },

    #[error("{operation} failed: response is not valid JSON: {message}")]
    Decode {
        operation: Operation,
        message: String,
    },

    #[error("polling cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            PipelineError::Status { operation, .. }
            | PipelineError::Transport { operation, .. }
            | PipelineError::Decode { operation, .. } => Some(*operation),
            PipelineError::Configuration(_) | PipelineError::Cancelled { .. } => None,
        }
    }

    pub(crate) fn from_ureq(operation: Operation, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => PipelineError::Status { operation, status },
            ureq::Error::Transport(transport) => PipelineError::Transport {
                operation,
                message: transport.to_string(),
            },
        }
    }
}

pub fn exit_code(err: &PipelineError) -> i32 {
    match err {
        PipelineError::Configuration(_) => 2,
        PipelineError::Status { .. } | PipelineError::Transport { .. } => 3,
        PipelineError::Decode { .. } => 4,
        PipelineError::Cancelled { .. } => 130,
    }
}

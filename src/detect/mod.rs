mod normalize;
mod result;

pub use normalize::normalize;
pub use result::{DetectionBox, DetectionResult, CANONICAL_KEYS};

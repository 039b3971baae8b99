//! Voice capture: utterance-boundary heuristic and session lifecycle

mod heuristic;
mod session;

pub use heuristic::{CaptureConfig, CaptureOutcome, CapturePhase};
pub use session::CaptureSession;

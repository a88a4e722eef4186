use crate::decision::decision_model::ExplorationDecision;
use crate::explore::error::{CaptureError, ExecutionError};
use crate::hierarchy::element_model::Element;

// ============================================================================
// TargetDriver — the platform boundary
// ============================================================================

/// Raw output of one UI inspection: the unbounded element tree and the
/// screenshot taken with it.
#[derive(Debug, Clone)]
pub struct RawCapture {
    pub root: Element,
    pub screenshot: Vec<u8>,
}

/// Three-way execution result. Completion (`Stop`) and failure are distinct
/// outcomes — a driver that finished exploring is not a driver that failed.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// Action performed; exploration continues.
    Continue,

    /// The target signalled that the session should end.
    Stop,

    /// Action could not be performed.
    Failed(ExecutionError),
}

/// What the engine needs from the platform: inspect the live screen and
/// perform actions on it. Concrete drivers (device bridges, browser
/// sessions, simulators) live behind this trait.
pub trait TargetDriver {
    fn capture(&mut self) -> Result<RawCapture, CaptureError>;

    fn execute(&mut self, decision: &ExplorationDecision) -> ExecutionOutcome;
}

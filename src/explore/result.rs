use std::time::Duration;

use crate::graph::navigation::NavigationGraph;

// ============================================================================
// ExplorationResult — what a session hands back, success or not
// ============================================================================

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The decider said `done`. Full success.
    DecidedDone,

    /// The driver signalled completion.
    DriverStopped,

    /// Ran out of steps. Partial success.
    StepBudgetExhausted,

    /// Stuck threshold exceeded under the abort policy.
    StuckAborted,

    /// The decision capability failed unrecoverably.
    DecisionAborted(String),

    /// External cancellation or deadline.
    Cancelled,
}

impl TerminationReason {
    /// Terminations that count as an orderly finish (possibly partial).
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            TerminationReason::DecidedDone
                | TerminationReason::DriverStopped
                | TerminationReason::StepBudgetExhausted
        )
    }
}

/// Aggregate outcome of one session. Built once at loop termination and
/// immutable afterwards; always complete, even after abort or cancellation.
#[derive(Debug)]
pub struct ExplorationResult {
    pub screens_discovered: usize,
    pub transitions_recorded: usize,
    pub successful_actions: u32,
    pub failed_actions: u32,
    pub verifications_passed: u32,
    pub verifications_failed: u32,
    pub retry_attempts: u32,
    pub duration: Duration,
    pub termination: TerminationReason,
    pub graph: NavigationGraph,
}

impl ExplorationResult {
    /// Fraction of executed actions that succeeded, 1.0 when none ran.
    pub fn success_rate(&self) -> f64 {
        let total = self.successful_actions + self.failed_actions;
        if total == 0 {
            1.0
        } else {
            self.successful_actions as f64 / total as f64
        }
    }

    // ------------------------------------------------------------------
    // Assertion helpers for calling tests
    // ------------------------------------------------------------------

    pub fn assert_min_screens(&self, min: usize) {
        assert!(
            self.screens_discovered >= min,
            "expected at least {} screens discovered, got {}",
            min,
            self.screens_discovered
        );
    }

    pub fn assert_success_rate(&self, min: f64) {
        let rate = self.success_rate();
        assert!(
            rate >= min,
            "expected success rate >= {:.2}, got {:.2}",
            min,
            rate
        );
    }

    pub fn assert_completed(&self) {
        assert!(
            self.termination.is_success(),
            "exploration did not complete cleanly: {:?}",
            self.termination
        );
    }

    /// Console summary in the spirit of a test suite report.
    pub fn summary(&self) -> String {
        let stats = self.graph.coverage_stats();
        let mut out = String::new();
        out.push_str("=== Exploration Result ===\n");
        out.push_str(&format!(
            "screens: {} discovered, {} transitions, avg depth {:.1}\n",
            self.screens_discovered, self.transitions_recorded, stats.average_depth
        ));
        out.push_str(&format!(
            "actions: {} ok, {} failed ({:.0}% success)\n",
            self.successful_actions,
            self.failed_actions,
            self.success_rate() * 100.0
        ));
        out.push_str(&format!(
            "verification: {} passed, {} failed, {} retries\n",
            self.verifications_passed, self.verifications_failed, self.retry_attempts
        ));
        out.push_str(&format!(
            "terminated: {:?} in {:.1}s\n",
            self.termination,
            self.duration.as_secs_f64()
        ));
        out
    }
}

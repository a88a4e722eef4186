use crate::decision::decision_model::ExplorationDecision;
use crate::graph::graph_model::{ScreenNode, ScreenTransition};

// ============================================================================
// Observer interface — closed event set, no-op defaults
// ============================================================================

/// Session events a consumer may care about. Every method has a no-op
/// default, so observers implement exactly the events they want.
#[allow(unused_variables)]
pub trait ExplorationObserver {
    /// A fingerprint was seen for the first time.
    fn screen_discovered(&mut self, node: &ScreenNode) {}

    /// A known fingerprint came up again.
    fn screen_revisited(&mut self, node: &ScreenNode) {}

    fn before_decision(&mut self, fingerprint: &str) {}

    fn after_decision(&mut self, decision: &ExplorationDecision) {}

    fn transition_recorded(&mut self, transition: &ScreenTransition) {}

    /// The same fingerprint keeps recurring without forward progress.
    fn stuck_detected(&mut self, fingerprint: &str, attempts: u32) {}

    fn error_encountered(&mut self, message: &str) {}
}

/// Observer that prints progress lines, for interactive runs.
pub struct ConsoleObserver {
    pub verbose: bool,
}

impl ExplorationObserver for ConsoleObserver {
    fn screen_discovered(&mut self, node: &ScreenNode) {
        println!(
            "Discovered screen [{}] {:?} (depth {})",
            &node.fingerprint[..8.min(node.fingerprint.len())],
            node.category,
            node.depth
        );
    }

    fn screen_revisited(&mut self, node: &ScreenNode) {
        if self.verbose {
            println!(
                "Revisited screen [{}] (visits={})",
                &node.fingerprint[..8.min(node.fingerprint.len())],
                node.visit_count
            );
        }
    }

    fn after_decision(&mut self, decision: &ExplorationDecision) {
        if self.verbose {
            println!(
                "Decision: {} ({:?}) — {}",
                decision.action.describe(),
                decision.confidence(),
                decision.reasoning
            );
        }
    }

    fn stuck_detected(&mut self, fingerprint: &str, attempts: u32) {
        println!(
            "Stuck on [{}] after {} attempts",
            &fingerprint[..8.min(fingerprint.len())],
            attempts
        );
    }

    fn error_encountered(&mut self, message: &str) {
        eprintln!("Error: {}", message);
    }
}

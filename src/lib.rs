pub mod cli;
pub mod decision;
pub mod explore;
pub mod graph;
pub mod hierarchy;
pub mod trace;
pub mod verify;

use crate::decision::decider::Decider;
use crate::explore::result::ExplorationResult;
use crate::explore::session::{ExplorationLoop, LoopConfig};
use crate::explore::simulated::{ScenarioApp, SimulatedTarget};

/// Convenience entry point: explore a scenario app with the given decider
/// and return the full result. Used by the CLI and integration tests.
pub fn explore_scenario(
    app: ScenarioApp,
    config: LoopConfig,
    decider: Box<dyn Decider>,
    goal: &str,
) -> ExplorationResult {
    let mut target = SimulatedTarget::new(app);
    let mut session = ExplorationLoop::new(config, decider);
    session.run(&mut target, goal)
}

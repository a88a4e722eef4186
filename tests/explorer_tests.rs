use std::time::Duration;

use screen_explorer::decision::decider::{Decider, ScriptedDecider};
use screen_explorer::decision::decision_model::{
    ActionKind, ExplorationAction, ExplorationDecision,
};
use screen_explorer::explore::error::DecisionError;
use screen_explorer::explore::result::TerminationReason;
use screen_explorer::explore::session::{ExplorationLoop, LoopConfig, LoopState, StuckPolicy};
use screen_explorer::explore::simulated::{ScenarioApp, SimulatedTarget};
use screen_explorer::graph::graph_model::ScreenTransition;
use screen_explorer::hierarchy::hierarchy_model::CompressedHierarchy;

// =========================================================================
// Scenario fixtures
// =========================================================================

const LOGIN_APP: &str = r#"
start: login
screens:
  login:
    elements:
      - type: input
        id: emailField
        label: Email
        interactive: true
      - type: input
        id: passwordField
        label: Password
        interactive: true
      - type: button
        id: loginButton
        label: Sign In
        interactive: true
  dashboard:
    elements:
      - type: text
        label: Welcome back
        interactive: false
      - type: button
        id: logoutButton
        label: Log Out
        interactive: true
transitions:
  - from: login
    action: tap
    target: loginButton
    to: dashboard
"#;

fn login_app() -> ScenarioApp {
    ScenarioApp::from_yaml(LOGIN_APP).expect("fixture parses")
}

fn fast_config() -> LoopConfig {
    LoopConfig {
        settle_delay: Duration::ZERO,
        decision_backoff: Duration::ZERO,
        ..LoopConfig::default()
    }
}

fn scripted(decisions: Vec<ExplorationDecision>) -> Box<dyn Decider> {
    Box::new(ScriptedDecider::new(decisions))
}

// =========================================================================
// Scenario parsing
// =========================================================================

#[test]
fn scenario_yaml_parses_screens_and_transitions() {
    let app = login_app();
    assert_eq!(app.start, "login");
    assert_eq!(app.screens.len(), 2);
    assert_eq!(app.screens["login"].elements.len(), 3);
    assert_eq!(app.transitions.len(), 1);
    assert_eq!(app.transitions[0].action, ActionKind::Tap);
    assert_eq!(app.transitions[0].target.as_deref(), Some("loginButton"));
}

// =========================================================================
// End-to-end sessions
// =========================================================================

#[test]
fn scripted_session_explores_login_flow() {
    let decider = scripted(vec![
        ExplorationDecision::new(
            ExplorationAction::type_text("emailField", "user@example.com"),
            "fill the email field",
            0.9,
        ),
        ExplorationDecision::new(
            ExplorationAction::tap("loginButton"),
            "submit the form",
            0.9,
        ),
    ]);

    let result = screen_explorer::explore_scenario(login_app(), fast_config(), decider, "log in");

    assert_eq!(result.termination, TerminationReason::DecidedDone);
    assert_eq!(result.screens_discovered, 2, "login and dashboard");
    assert_eq!(result.transitions_recorded, 2);
    assert_eq!(result.successful_actions, 2);
    assert_eq!(result.failed_actions, 0);
    assert_eq!(
        result.verifications_passed, 2,
        "typing verifies by value, tapping by fingerprint change"
    );
    assert_eq!(result.verifications_failed, 0);
    assert_eq!(result.retry_attempts, 0);
    result.assert_completed();
    result.assert_min_screens(2);
    result.assert_success_rate(1.0);

    // Graph shape: login is the pinned start at depth 0, dashboard hangs
    // off it at depth 1, and the self-transition from typing kept login's
    // visit count climbing.
    let start = result.graph.start_node().expect("start recorded").to_string();
    let login = result.graph.node(&start).unwrap();
    assert_eq!(login.depth, 0);
    assert_eq!(login.visit_count, 2, "typing landed back on login");

    let dashboard = result
        .graph
        .nodes()
        .find(|n| n.fingerprint != start)
        .expect("dashboard node exists");
    assert_eq!(dashboard.depth, 1);
    assert_eq!(dashboard.parent.as_deref(), Some(start.as_str()));
    assert_eq!(dashboard.visit_count, 1);

    let edges: Vec<&ScreenTransition> = result.graph.edges().iter().collect();
    assert!(edges[0].success, "type action verified");
    assert_eq!(edges[0].from, edges[0].to, "typing does not leave the screen");
    assert!(edges[1].success);
    assert_eq!(edges[1].to, dashboard.fingerprint);
}

#[test]
fn failed_verification_retries_with_alternative() {
    // Tapping the password field changes nothing observable; the decision
    // carries the real submit button as its fallback.
    let decider = scripted(vec![ExplorationDecision::new(
        ExplorationAction::tap("passwordField"),
        "poke the form",
        0.5,
    )
    .with_alternatives(vec![ExplorationAction::tap("loginButton")])]);

    let result = screen_explorer::explore_scenario(login_app(), fast_config(), decider, "log in");

    assert_eq!(result.termination, TerminationReason::DecidedDone);
    assert_eq!(result.retry_attempts, 1, "one alternative was tried");
    assert_eq!(result.verifications_failed, 1, "the primary action failed");
    assert_eq!(result.verifications_passed, 1, "the alternative passed");
    assert_eq!(result.successful_actions, 2, "both executions ran cleanly");
    assert_eq!(
        result.transitions_recorded, 1,
        "one step, one edge, regardless of retries"
    );

    let edge = &result.graph.edges()[0];
    assert!(edge.success);
    assert_eq!(
        edge.action.target.as_deref(),
        Some("loginButton"),
        "the edge carries the action that finally worked"
    );
}

#[test]
fn execution_failure_records_no_transition() {
    let mut target = SimulatedTarget::new(login_app());
    target.broken_targets.push("loginButton".to_string());

    let decider = scripted(vec![ExplorationDecision::new(
        ExplorationAction::tap("loginButton"),
        "submit",
        0.9,
    )]);
    let mut session = ExplorationLoop::new(fast_config(), decider);
    let result = session.run(&mut target, "log in");

    assert_eq!(result.termination, TerminationReason::DecidedDone);
    assert_eq!(result.failed_actions, 1);
    assert_eq!(result.successful_actions, 0);
    assert_eq!(
        result.transitions_recorded, 0,
        "a failed execution never produces an edge"
    );
    assert_eq!(
        result.verifications_passed + result.verifications_failed,
        0,
        "execution failure is not verification failure"
    );
    assert_eq!(result.success_rate(), 0.0);
}

#[test]
fn stuck_screen_aborts_under_abort_policy() {
    // passwordField taps never change the screen, and the script never
    // gives up on its own.
    let noop = || {
        ExplorationDecision::new(ExplorationAction::tap("passwordField"), "again", 0.5)
    };
    let decider = scripted(vec![noop(), noop(), noop(), noop(), noop(), noop()]);

    let config = LoopConfig {
        stuck_threshold: 1,
        stuck_policy: StuckPolicy::Abort,
        ..fast_config()
    };
    let mut target = SimulatedTarget::new(login_app());
    let mut session = ExplorationLoop::new(config, decider);
    let result = session.run(&mut target, "log in");

    assert_eq!(result.termination, TerminationReason::StuckAborted);
    assert!(!result.termination.is_success());
    assert_eq!(session.state(), LoopState::StuckAborted);
    assert_eq!(result.screens_discovered, 1);
    assert_eq!(
        result.transitions_recorded, 2,
        "two full steps ran before the counter crossed the threshold"
    );
}

#[test]
fn force_novel_policy_keeps_the_session_alive() {
    let noop = || {
        ExplorationDecision::new(ExplorationAction::tap("passwordField"), "again", 0.5)
    };
    let decider = scripted(vec![noop(), noop(), noop()]);

    let config = LoopConfig {
        stuck_threshold: 0,
        stuck_policy: StuckPolicy::ForceNovelAction,
        ..fast_config()
    };
    let mut target = SimulatedTarget::new(login_app());
    let mut session = ExplorationLoop::new(config, decider);
    let result = session.run(&mut target, "log in");

    assert_eq!(
        result.termination,
        TerminationReason::DecidedDone,
        "the session rides out the stuck screen instead of aborting"
    );
    assert_eq!(result.transitions_recorded, 3);
}

#[test]
fn step_budget_bounds_the_session() {
    let decider = scripted(vec![
        ExplorationDecision::new(ExplorationAction::tap("loginButton"), "submit", 0.9),
        ExplorationDecision::new(ExplorationAction::tap("logoutButton"), "leave", 0.9),
    ]);

    let config = LoopConfig {
        max_steps: 1,
        ..fast_config()
    };
    let mut target = SimulatedTarget::new(login_app());
    let mut session = ExplorationLoop::new(config, decider);
    let result = session.run(&mut target, "log in");

    assert_eq!(result.termination, TerminationReason::StepBudgetExhausted);
    assert!(result.termination.is_success(), "budget exhaustion is partial success");
    assert_eq!(result.transitions_recorded, 1);
    assert_eq!(result.screens_discovered, 2);
}

// =========================================================================
// Cancellation and deadlines
// =========================================================================

#[test]
fn pre_cancelled_token_stops_before_the_first_step() {
    let decider = scripted(vec![ExplorationDecision::new(
        ExplorationAction::tap("loginButton"),
        "submit",
        0.9,
    )]);
    let mut target = SimulatedTarget::new(login_app());
    let mut session = ExplorationLoop::new(fast_config(), decider);
    session.cancellation_token().cancel();

    let result = session.run(&mut target, "log in");

    assert_eq!(result.termination, TerminationReason::Cancelled);
    assert!(!result.termination.is_success());
    assert_eq!(result.screens_discovered, 0, "nothing ran");
    assert_eq!(result.transitions_recorded, 0);
    assert_eq!(session.state(), LoopState::ErrorAborted);
}

#[test]
fn expired_deadline_cancels_the_session() {
    let decider = scripted(vec![ExplorationDecision::new(
        ExplorationAction::tap("loginButton"),
        "submit",
        0.9,
    )]);
    let config = LoopConfig {
        deadline: Some(Duration::ZERO),
        ..fast_config()
    };
    let mut target = SimulatedTarget::new(login_app());
    let mut session = ExplorationLoop::new(config, decider);
    let result = session.run(&mut target, "log in");

    assert_eq!(result.termination, TerminationReason::Cancelled);
    assert_eq!(result.screens_discovered, 0);
}

// =========================================================================
// Decision failure handling
// =========================================================================

struct FailingDecider {
    failures_left: u32,
    error: fn() -> DecisionError,
}

impl Decider for FailingDecider {
    fn decide(
        &mut self,
        _hierarchy: &CompressedHierarchy,
        _goal: &str,
        _history: &[ScreenTransition],
    ) -> Result<ExplorationDecision, DecisionError> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err((self.error)());
        }
        Ok(ExplorationDecision::done("recovered"))
    }
}

#[test]
fn retryable_decision_errors_are_retried() {
    let decider = Box::new(FailingDecider {
        failures_left: 2,
        error: || DecisionError::Network("connection reset".into()),
    });
    let mut target = SimulatedTarget::new(login_app());
    let mut session = ExplorationLoop::new(fast_config(), decider);
    let result = session.run(&mut target, "log in");

    assert_eq!(
        result.termination,
        TerminationReason::DecidedDone,
        "two transient failures fit inside the retry budget"
    );
}

#[test]
fn credential_failures_abort_without_retrying() {
    let decider = Box::new(FailingDecider {
        failures_left: 1,
        error: || DecisionError::InvalidCredentials("api key rejected".into()),
    });
    let mut target = SimulatedTarget::new(login_app());
    let mut session = ExplorationLoop::new(fast_config(), decider);
    let result = session.run(&mut target, "log in");

    match &result.termination {
        TerminationReason::DecisionAborted(msg) => {
            assert!(
                msg.to_lowercase().contains("credential"),
                "abort reason names the cause: {}",
                msg
            );
        }
        other => panic!("expected DecisionAborted, got {:?}", other),
    }
    assert!(!result.termination.is_success());
    assert_eq!(session.state(), LoopState::ErrorAborted);
    assert_eq!(result.screens_discovered, 1, "the start screen was still recorded");
}

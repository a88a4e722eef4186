use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::decision::decider::Decider;
use crate::decision::decision_model::{ActionKind, ExplorationAction, ExplorationDecision};
use crate::explore::driver::{ExecutionOutcome, TargetDriver};
use crate::explore::error::DecisionError;
use crate::explore::observer::ExplorationObserver;
use crate::explore::result::{ExplorationResult, TerminationReason};
use crate::graph::graph_model::ScreenNode;
use crate::graph::navigation::NavigationGraph;
use crate::hierarchy::compressor::{CompressorConfig, HierarchyCompressor};
use crate::hierarchy::hierarchy_model::CompressedHierarchy;
use crate::verify::verifier::verify;

// ============================================================================
// Session policy constants
// ============================================================================

pub const MAX_ALTERNATIVE_RETRIES: u32 = 2;
pub const DECISION_RETRIES: u32 = 2;
pub const DEFAULT_MAX_STEPS: u32 = 20;
pub const DEFAULT_STUCK_THRESHOLD: u32 = 3;

const CANCEL_POLL: Duration = Duration::from_millis(25);

// ============================================================================
// Cancellation
// ============================================================================

/// Shared flag for aborting a session from outside. Cloning hands out a
/// handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Loop configuration
// ============================================================================

/// What to do when one fingerprint keeps recurring past the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StuckPolicy {
    /// End the session, flagged as stuck.
    Abort,

    /// Keep going but refuse to repeat the previous action on that screen.
    ForceNovelAction,
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub max_steps: u32,
    pub stuck_threshold: u32,
    pub stuck_policy: StuckPolicy,
    pub max_alternative_retries: u32,
    pub decision_retries: u32,
    pub decision_backoff: Duration,

    /// Wait after each action before capturing the after-hierarchy.
    pub settle_delay: Duration,

    /// Optional wall-clock budget for the whole session.
    pub deadline: Option<Duration>,

    pub compressor: CompressorConfig,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            stuck_threshold: DEFAULT_STUCK_THRESHOLD,
            stuck_policy: StuckPolicy::Abort,
            max_alternative_retries: MAX_ALTERNATIVE_RETRIES,
            decision_retries: DECISION_RETRIES,
            decision_backoff: Duration::from_millis(500),
            settle_delay: Duration::from_millis(100),
            deadline: None,
            compressor: CompressorConfig::default(),
        }
    }
}

/// Loop phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Capturing,
    Deciding,
    Executing,
    Verifying,
    Recording,
    Retrying,
    Done,
    StuckAborted,
    ErrorAborted,
}

enum DecisionAttempt {
    Decided(ExplorationDecision),
    Cancelled,
    Failed(DecisionError),
}

// ============================================================================
// ExplorationLoop
// ============================================================================

/// Drives one exploration session: capture → decide → execute → verify →
/// retry → record, until done, stuck, out of budget, or cancelled.
///
/// The loop exclusively owns its graph, stuck counters, and all session
/// state; independent sessions use independent loops.
pub struct ExplorationLoop {
    config: LoopConfig,
    compressor: HierarchyCompressor,
    decider: Box<dyn Decider>,
    observers: Vec<Box<dyn ExplorationObserver>>,
    cancel: CancellationToken,
    state: LoopState,

    graph: NavigationGraph,
    stuck_counts: HashMap<String, u32>,
    last_action_by_screen: HashMap<String, ExplorationAction>,

    successful_actions: u32,
    failed_actions: u32,
    verifications_passed: u32,
    verifications_failed: u32,
    retry_attempts: u32,
}

impl ExplorationLoop {
    pub fn new(config: LoopConfig, decider: Box<dyn Decider>) -> Self {
        let compressor = HierarchyCompressor::new(config.compressor.clone());
        Self {
            config,
            compressor,
            decider,
            observers: Vec::new(),
            cancel: CancellationToken::new(),
            state: LoopState::Idle,
            graph: NavigationGraph::new(),
            stuck_counts: HashMap::new(),
            last_action_by_screen: HashMap::new(),
            successful_actions: 0,
            failed_actions: 0,
            verifications_passed: 0,
            verifications_failed: 0,
            retry_attempts: 0,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn ExplorationObserver>) {
        self.observers.push(observer);
    }

    /// Handle for cancelling this session from another thread.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run the session to termination. Always returns a complete result —
    /// cancellation and aborts still report everything recorded so far.
    pub fn run(&mut self, driver: &mut dyn TargetDriver, goal: &str) -> ExplorationResult {
        let started = Instant::now();
        let deadline = self.config.deadline.map(|d| started + d);

        // The after-hierarchy of a recorded step carries over as the next
        // step's current screen; bookkeeping for it already happened when
        // its node was added, so a carried screen is not re-counted.
        let mut current: Option<(CompressedHierarchy, usize)> = None;
        let mut steps = 0u32;

        let termination = 'session: loop {
            if self.cancelled(deadline) {
                break TerminationReason::Cancelled;
            }
            if steps >= self.config.max_steps {
                break TerminationReason::StepBudgetExhausted;
            }
            steps += 1;

            // ---- Capture ----
            self.state = LoopState::Capturing;
            let (hierarchy, depth) = match current.take() {
                Some(carried) => carried,
                None => match driver.capture() {
                    Ok(raw) => {
                        let hierarchy = self.compressor.compress(&raw.root, raw.screenshot);
                        let fingerprint = hierarchy.fingerprint().to_string();
                        let depth = self
                            .graph
                            .node(&fingerprint)
                            .map(|n| n.depth)
                            .unwrap_or_else(|| {
                                self.graph
                                    .current_node()
                                    .and_then(|fp| self.graph.node(fp))
                                    .map(|n| n.depth + 1)
                                    .unwrap_or(0)
                            });
                        let parent = self.graph.current_node().map(str::to_string);
                        self.observe_screen(&hierarchy, depth, parent);
                        (hierarchy, depth)
                    }
                    Err(e) => {
                        self.notify_error(&format!("capture failed: {}", e));
                        continue 'session;
                    }
                },
            };
            let before_fingerprint = hierarchy.fingerprint().to_string();

            // ---- Stuck check ----
            let attempts = *self.stuck_counts.get(&before_fingerprint).unwrap_or(&0);
            let mut force_novel = false;
            if attempts > self.config.stuck_threshold {
                for obs in &mut self.observers {
                    obs.stuck_detected(&before_fingerprint, attempts);
                }
                match self.config.stuck_policy {
                    StuckPolicy::Abort => break TerminationReason::StuckAborted,
                    StuckPolicy::ForceNovelAction => force_novel = true,
                }
            }

            // ---- Decide ----
            self.state = LoopState::Deciding;
            for obs in &mut self.observers {
                obs.before_decision(&before_fingerprint);
            }
            let mut decision = match self.request_decision(&hierarchy, goal, deadline) {
                DecisionAttempt::Decided(decision) => decision,
                DecisionAttempt::Cancelled => break TerminationReason::Cancelled,
                DecisionAttempt::Failed(e) => {
                    break TerminationReason::DecisionAborted(e.to_string());
                }
            };
            if force_novel {
                decision = self.avoid_repeat(&before_fingerprint, decision);
            }
            for obs in &mut self.observers {
                obs.after_decision(&decision);
            }

            if decision.action.kind == ActionKind::Done {
                break TerminationReason::DecidedDone;
            }

            // ---- Execute ----
            self.state = LoopState::Executing;
            let action_started = Instant::now();
            match driver.execute(&decision) {
                ExecutionOutcome::Continue => self.successful_actions += 1,
                ExecutionOutcome::Stop => {
                    self.successful_actions += 1;
                    break TerminationReason::DriverStopped;
                }
                ExecutionOutcome::Failed(e) => {
                    // Execution failure is not verification failure: record
                    // the failed step and move on without verifying.
                    self.failed_actions += 1;
                    self.notify_error(&format!("execution failed: {}", e));
                    continue 'session;
                }
            }
            self.settle(deadline);

            // ---- Verify (with bounded alternative retries) ----
            self.state = LoopState::Verifying;
            let mut after = match driver.capture() {
                Ok(raw) => self.compressor.compress(&raw.root, raw.screenshot),
                Err(e) => {
                    // Abandon the step before recording; the graph stays
                    // consistent and the next step recaptures.
                    self.notify_error(&format!("capture failed after action: {}", e));
                    continue 'session;
                }
            };
            let mut verification = verify(&decision, &hierarchy, &after);
            self.count_verification(verification.passed);
            let mut final_action = decision.action.clone();

            if !verification.passed && !decision.alternative_actions.is_empty() {
                self.state = LoopState::Retrying;
                let budget = self.config.max_alternative_retries as usize;
                for alternative in decision.alternative_actions.iter().take(budget) {
                    if self.cancelled(deadline) {
                        break;
                    }
                    self.retry_attempts += 1;
                    let alt_decision = decision.with_action(alternative.clone());
                    match driver.execute(&alt_decision) {
                        ExecutionOutcome::Continue => self.successful_actions += 1,
                        ExecutionOutcome::Stop => {
                            self.successful_actions += 1;
                            break;
                        }
                        ExecutionOutcome::Failed(e) => {
                            self.failed_actions += 1;
                            self.notify_error(&format!("retry execution failed: {}", e));
                            continue;
                        }
                    }
                    self.settle(deadline);
                    after = match driver.capture() {
                        Ok(raw) => self.compressor.compress(&raw.root, raw.screenshot),
                        Err(e) => {
                            self.notify_error(&format!("capture failed during retry: {}", e));
                            break;
                        }
                    };
                    verification = verify(&alt_decision, &hierarchy, &after);
                    self.count_verification(verification.passed);
                    final_action = alternative.clone();
                    if verification.passed {
                        break;
                    }
                }
            }

            // ---- Record ----
            // The transition is always recorded, success flag carrying the
            // final verification outcome.
            self.state = LoopState::Recording;
            let after_fingerprint = after.fingerprint().to_string();
            let after_depth = if after_fingerprint == before_fingerprint {
                depth
            } else {
                self.graph
                    .node(&after_fingerprint)
                    .map(|n| n.depth)
                    .unwrap_or(depth + 1)
            };
            self.observe_screen(&after, after_depth, Some(before_fingerprint.clone()));
            self.graph.add_transition(
                &before_fingerprint,
                &after_fingerprint,
                final_action.clone(),
                action_started.elapsed(),
                verification.passed,
            );
            if let Some(edge) = self.graph.edges().last() {
                for obs in &mut self.observers {
                    obs.transition_recorded(edge);
                }
            }
            self.last_action_by_screen
                .insert(before_fingerprint, final_action);
            current = Some((after, after_depth));
        };

        self.state = match &termination {
            TerminationReason::StuckAborted => LoopState::StuckAborted,
            TerminationReason::DecisionAborted(_) | TerminationReason::Cancelled => {
                LoopState::ErrorAborted
            }
            _ => LoopState::Done,
        };

        ExplorationResult {
            screens_discovered: self.graph.node_count(),
            transitions_recorded: self.graph.edges().len(),
            successful_actions: self.successful_actions,
            failed_actions: self.failed_actions,
            verifications_passed: self.verifications_passed,
            verifications_failed: self.verifications_failed,
            retry_attempts: self.retry_attempts,
            duration: started.elapsed(),
            termination,
            graph: std::mem::take(&mut self.graph),
        }
    }

    // ------------------------------------------------------------------
    // Step helpers
    // ------------------------------------------------------------------

    /// Register an arrival on a screen: insert or revisit the node, update
    /// the stuck counter, and notify observers. Called exactly once per
    /// arrival — carried-over screens are not re-registered.
    fn observe_screen(
        &mut self,
        hierarchy: &CompressedHierarchy,
        depth: usize,
        parent: Option<String>,
    ) {
        let node = ScreenNode::from_hierarchy(hierarchy, depth, parent);
        let fingerprint = node.fingerprint.clone();
        let is_new = self.graph.add_node(node);

        if is_new {
            self.stuck_counts.insert(fingerprint.clone(), 0);
        } else {
            *self.stuck_counts.entry(fingerprint.clone()).or_insert(0) += 1;
        }

        let node = self
            .graph
            .node(&fingerprint)
            .expect("node was just inserted");
        for obs in &mut self.observers {
            if is_new {
                obs.screen_discovered(node);
            } else {
                obs.screen_revisited(node);
            }
        }
    }

    /// Ask the decider, retrying retryable failures with linear backoff.
    fn request_decision(
        &mut self,
        hierarchy: &CompressedHierarchy,
        goal: &str,
        deadline: Option<Instant>,
    ) -> DecisionAttempt {
        let mut attempt = 0u32;
        loop {
            if self.cancelled(deadline) {
                return DecisionAttempt::Cancelled;
            }
            match self.decider.decide(hierarchy, goal, self.graph.edges()) {
                Ok(decision) => return DecisionAttempt::Decided(decision),
                Err(e) => {
                    self.notify_error(&format!("decision failed: {}", e));
                    if !e.is_retryable() || attempt >= self.config.decision_retries {
                        return DecisionAttempt::Failed(e);
                    }
                    attempt += 1;
                    self.sleep_cancellable(
                        self.config.decision_backoff * attempt,
                        deadline,
                    );
                }
            }
        }
    }

    /// Swap in the first alternative that differs from the last action
    /// taken on this screen. Applied under the force-novel stuck policy.
    fn avoid_repeat(
        &self,
        fingerprint: &str,
        decision: ExplorationDecision,
    ) -> ExplorationDecision {
        let Some(last) = self.last_action_by_screen.get(fingerprint) else {
            return decision;
        };
        if &decision.action != last {
            return decision;
        }
        match decision
            .alternative_actions
            .iter()
            .find(|alt| *alt != last)
            .cloned()
        {
            Some(alternative) => decision.with_action(alternative),
            None => decision,
        }
    }

    fn count_verification(&mut self, passed: bool) {
        if passed {
            self.verifications_passed += 1;
        } else {
            self.verifications_failed += 1;
        }
    }

    fn notify_error(&mut self, message: &str) {
        for obs in &mut self.observers {
            obs.error_encountered(message);
        }
    }

    fn cancelled(&self, deadline: Option<Instant>) -> bool {
        self.cancel.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn settle(&self, deadline: Option<Instant>) {
        self.sleep_cancellable(self.config.settle_delay, deadline);
    }

    /// Sleep in short slices so cancellation and deadlines cut waits short.
    fn sleep_cancellable(&self, total: Duration, deadline: Option<Instant>) {
        let until = Instant::now() + total;
        while Instant::now() < until {
            if self.cancelled(deadline) {
                return;
            }
            thread::sleep(CANCEL_POLL.min(until.saturating_duration_since(Instant::now())));
        }
    }
}

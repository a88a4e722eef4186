use std::{fs::OpenOptions, io::Write, sync::Mutex};

use crate::decision::decision_model::ExplorationDecision;
use crate::explore::observer::ExplorationObserver;
use crate::graph::graph_model::{ScreenNode, ScreenTransition};
use crate::trace::trace::TraceEvent;

// ============================================================================
// TraceLogger — append-only JSONL, degrades to disabled on open failure
// ============================================================================

pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path, e);
                Self { file: None }
            }
        }
    }

    pub fn log(&self, event: &TraceEvent) {
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return, // tracing disabled
        };

        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("Warning: failed to serialize trace event: {}", e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Warning: trace logger lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            eprintln!("Warning: failed to write trace event: {}", e);
        }
    }
}

// ============================================================================
// TraceObserver — bridges session events into the trace file
// ============================================================================

pub struct TraceObserver {
    logger: TraceLogger,
}

impl TraceObserver {
    pub fn new(path: &str) -> Self {
        Self {
            logger: TraceLogger::new(path),
        }
    }
}

impl ExplorationObserver for TraceObserver {
    fn screen_discovered(&mut self, node: &ScreenNode) {
        self.logger.log(
            &TraceEvent::now("screen_discovered")
                .with_fingerprint(&node.fingerprint)
                .with_detail(format!("depth={} category={:?}", node.depth, node.category)),
        );
    }

    fn screen_revisited(&mut self, node: &ScreenNode) {
        self.logger.log(
            &TraceEvent::now("screen_revisited")
                .with_fingerprint(&node.fingerprint)
                .with_detail(format!("visits={}", node.visit_count)),
        );
    }

    fn before_decision(&mut self, fingerprint: &str) {
        self.logger
            .log(&TraceEvent::now("before_decision").with_fingerprint(fingerprint));
    }

    fn after_decision(&mut self, decision: &ExplorationDecision) {
        self.logger
            .log(&TraceEvent::now("after_decision").with_decision(decision));
    }

    fn transition_recorded(&mut self, transition: &ScreenTransition) {
        self.logger.log(
            &TraceEvent::now("transition_recorded")
                .with_fingerprint(&transition.from)
                .with_action(transition.action.describe())
                .with_detail(format!("to={} success={}", transition.to, transition.success)),
        );
    }

    fn stuck_detected(&mut self, fingerprint: &str, attempts: u32) {
        self.logger.log(
            &TraceEvent::now("stuck_detected")
                .with_fingerprint(fingerprint)
                .with_detail(format!("attempts={}", attempts)),
        );
    }

    fn error_encountered(&mut self, message: &str) {
        self.logger
            .log(&TraceEvent::now("error").with_detail(message));
    }
}

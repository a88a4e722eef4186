use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decision::decision_model::{ActionKind, ExplorationDecision};
use crate::explore::driver::{ExecutionOutcome, RawCapture, TargetDriver};
use crate::explore::error::{CaptureError, ExecutionError};
use crate::hierarchy::element_model::Element;

// ============================================================================
// Scenario model — a YAML-described application to explore
// ============================================================================

/// A self-contained fake application: named screens with element forests
/// and a transition table. Lets the engine run end-to-end without any
/// platform driver — in tests, demos, and the `explore` subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioApp {
    /// Screen to start on.
    pub start: String,

    pub screens: BTreeMap<String, ScenarioScreen>,

    #[serde(default)]
    pub transitions: Vec<ScenarioTransition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioScreen {
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioTransition {
    pub from: String,
    pub action: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target: Option<String>,
    pub to: String,
}

impl ScenarioApp {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_yaml(&content)?)
    }
}

// ============================================================================
// SimulatedTarget — TargetDriver over a scenario
// ============================================================================

pub struct SimulatedTarget {
    app: ScenarioApp,
    current: String,
    /// Optional failure injection: actions on these targets always fail.
    pub broken_targets: Vec<String>,
}

impl SimulatedTarget {
    pub fn new(app: ScenarioApp) -> Self {
        let current = app.start.clone();
        Self {
            app,
            current,
            broken_targets: Vec::new(),
        }
    }

    pub fn current_screen(&self) -> &str {
        &self.current
    }

    fn matching_transition(&self, kind: ActionKind, target: Option<&str>) -> Option<&ScenarioTransition> {
        self.app.transitions.iter().find(|t| {
            t.from == self.current
                && t.action == kind
                && match (&t.target, target) {
                    (Some(expected), Some(actual)) => expected.eq_ignore_ascii_case(actual),
                    (None, _) => true,
                    (Some(_), None) => false,
                }
        })
    }
}

impl TargetDriver for SimulatedTarget {
    fn capture(&mut self) -> Result<RawCapture, CaptureError> {
        let screen = self
            .app
            .screens
            .get(&self.current)
            .ok_or_else(|| CaptureError::MalformedTree(format!("unknown screen '{}'", self.current)))?;

        let root = Element::container(screen.elements.clone());
        // Screenshot bytes stand in for a real capture; the engine never
        // reads them for identity anyway.
        let screenshot = format!("screenshot:{}", self.current).into_bytes();
        Ok(RawCapture { root, screenshot })
    }

    fn execute(&mut self, decision: &ExplorationDecision) -> ExecutionOutcome {
        let action = &decision.action;

        if let Some(target) = &action.target {
            if self.broken_targets.iter().any(|b| b.eq_ignore_ascii_case(target)) {
                return ExecutionOutcome::Failed(ExecutionError::ExecutionFailed(format!(
                    "simulated failure on '{}'",
                    target
                )));
            }
        }

        match action.kind {
            ActionKind::Done => ExecutionOutcome::Stop,

            ActionKind::Type => {
                let Some(target) = &action.target else {
                    return ExecutionOutcome::Failed(ExecutionError::MissingTarget);
                };
                let Some(text) = &action.text else {
                    return ExecutionOutcome::Failed(ExecutionError::MissingText);
                };
                let screen = self
                    .app
                    .screens
                    .get_mut(&self.current)
                    .expect("current screen exists");
                let Some(el) = screen
                    .elements
                    .iter_mut()
                    .find_map(|root| root.find_mut(target))
                else {
                    return ExecutionOutcome::Failed(ExecutionError::ElementNotFound {
                        element: target.clone(),
                        context: format!("screen '{}'", self.current),
                    });
                };
                let mut value = el.value.take().unwrap_or_default();
                value.push_str(text);
                el.value = Some(value);

                // Typing may also trigger a scripted transition (live search
                // and the like); otherwise the screen stays put.
                if let Some(t) = self.matching_transition(ActionKind::Type, Some(target)) {
                    self.current = t.to.clone();
                }
                ExecutionOutcome::Continue
            }

            ActionKind::Tap | ActionKind::Swipe => {
                let Some(target) = &action.target else {
                    return ExecutionOutcome::Failed(ExecutionError::MissingTarget);
                };
                let screen = self
                    .app
                    .screens
                    .get(&self.current)
                    .expect("current screen exists");
                let exists = screen.elements.iter().any(|root| root.find(target).is_some());
                if !exists {
                    return ExecutionOutcome::Failed(ExecutionError::ElementNotFound {
                        element: target.clone(),
                        context: format!("screen '{}'", self.current),
                    });
                }
                if let Some(t) = self.matching_transition(action.kind, Some(target)) {
                    self.current = t.to.clone();
                }
                ExecutionOutcome::Continue
            }

            ActionKind::Back => {
                if let Some(t) = self.matching_transition(ActionKind::Back, None) {
                    self.current = t.to.clone();
                }
                ExecutionOutcome::Continue
            }
        }
    }
}

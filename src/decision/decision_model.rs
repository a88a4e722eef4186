use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Exploration decisions — a proposed action plus machine-usable confidence
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Tap,
    Type,
    Swipe,
    Back,
    Done,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Tap => "tap",
            ActionKind::Type => "type",
            ActionKind::Swipe => "swipe",
            ActionKind::Back => "back",
            ActionKind::Done => "done",
        }
    }
}

/// A single executable action against the live target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationAction {
    pub kind: ActionKind,

    /// Element identifier or label the action applies to.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target: Option<String>,

    /// Text to enter, for `type` actions.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
}

impl ExplorationAction {
    pub fn tap(target: &str) -> Self {
        ExplorationAction {
            kind: ActionKind::Tap,
            target: Some(target.to_string()),
            text: None,
        }
    }

    pub fn type_text(target: &str, text: &str) -> Self {
        ExplorationAction {
            kind: ActionKind::Type,
            target: Some(target.to_string()),
            text: Some(text.to_string()),
        }
    }

    pub fn swipe(target: &str) -> Self {
        ExplorationAction {
            kind: ActionKind::Swipe,
            target: Some(target.to_string()),
            text: None,
        }
    }

    pub fn back() -> Self {
        ExplorationAction {
            kind: ActionKind::Back,
            target: None,
            text: None,
        }
    }

    pub fn done() -> Self {
        ExplorationAction {
            kind: ActionKind::Done,
            target: None,
            text: None,
        }
    }

    /// Compact form for diagram edges and trace lines.
    pub fn describe(&self) -> String {
        match &self.target {
            Some(target) => format!("{}({})", self.kind.as_str(), target),
            None => self.kind.as_str().to_string(),
        }
    }
}

// ============================================================================
// Confidence buckets
// ============================================================================

/// Qualitative view of a success probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfidenceBucket {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceBucket {
    pub fn from_probability(probability: f64) -> Self {
        let p = probability.clamp(0.0, 1.0);
        if p < 0.2 {
            ConfidenceBucket::VeryLow
        } else if p < 0.45 {
            ConfidenceBucket::Low
        } else if p < 0.65 {
            ConfidenceBucket::Medium
        } else if p < 0.9 {
            ConfidenceBucket::High
        } else {
            ConfidenceBucket::VeryHigh
        }
    }
}

// ============================================================================
// ExplorationDecision
// ============================================================================

/// A proposed next action with rationale, predicted outcome, and fallbacks.
///
/// `success_probability` is clamped to [0, 1] both at construction and on
/// deserialization, so a decision never carries an out-of-range value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationDecision {
    pub action: ExplorationAction,

    pub reasoning: String,

    #[serde(deserialize_with = "clamped_probability")]
    pub success_probability: f64,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expected_outcome: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternative_actions: Vec<ExplorationAction>,
}

impl ExplorationDecision {
    pub fn new(action: ExplorationAction, reasoning: &str, success_probability: f64) -> Self {
        ExplorationDecision {
            action,
            reasoning: reasoning.to_string(),
            success_probability: success_probability.clamp(0.0, 1.0),
            expected_outcome: None,
            alternative_actions: Vec::new(),
        }
    }

    pub fn done(reasoning: &str) -> Self {
        ExplorationDecision::new(ExplorationAction::done(), reasoning, 1.0)
    }

    pub fn with_expected_outcome(mut self, outcome: &str) -> Self {
        self.expected_outcome = Some(outcome.to_string());
        self
    }

    pub fn with_alternatives(mut self, alternatives: Vec<ExplorationAction>) -> Self {
        self.alternative_actions = alternatives;
        self
    }

    pub fn confidence(&self) -> ConfidenceBucket {
        ConfidenceBucket::from_probability(self.success_probability)
    }

    /// Same decision, different action — used when retrying with an
    /// alternative after a failed verification.
    pub fn with_action(&self, action: ExplorationAction) -> Self {
        ExplorationDecision {
            action,
            reasoning: self.reasoning.clone(),
            success_probability: self.success_probability,
            expected_outcome: self.expected_outcome.clone(),
            alternative_actions: Vec::new(),
        }
    }
}

fn clamped_probability<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.clamp(0.0, 1.0))
}

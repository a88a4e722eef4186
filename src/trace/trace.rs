use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::decision::decision_model::ExplorationDecision;
use crate::verify::verifier::VerificationResult;

/// One JSONL line in the session trace.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_passed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(event: impl ToString) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
            event: event.to_string(),
            fingerprint: None,
            action: None,
            confidence: None,
            reasoning: None,
            verification_passed: None,
            detail: None,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: &str) -> Self {
        self.fingerprint = Some(fingerprint.to_string());
        self
    }

    pub fn with_decision(mut self, decision: &ExplorationDecision) -> Self {
        self.action = Some(decision.action.describe());
        self.confidence = Some(decision.success_probability);
        self.reasoning = Some(decision.reasoning.clone());
        self
    }

    pub fn with_action(mut self, action: impl ToString) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn with_verification(mut self, verification: &VerificationResult) -> Self {
        self.verification_passed = Some(verification.passed);
        self.detail = Some(verification.reason.clone());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

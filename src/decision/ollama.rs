use serde::{Deserialize, Serialize};

use crate::decision::decider::Decider;
use crate::decision::decision_model::{ActionKind, ExplorationAction, ExplorationDecision};
use crate::explore::error::DecisionError;
use crate::graph::graph_model::ScreenTransition;
use crate::hierarchy::element_model::walk;
use crate::hierarchy::hierarchy_model::CompressedHierarchy;

// ============================================================================
// Ollama-backed decider
// ============================================================================

pub struct OllamaDecider {
    pub endpoint: String,
    pub model: String,
}

impl Default for OllamaDecider {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "qwen2.5:1.5b".to_string(),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: &'static str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Deserialize)]
struct ModelDecisionResponse {
    action: String,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    expected_outcome: Option<String>,
}

impl OllamaDecider {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        }
    }

    fn build_prompt(
        &self,
        hierarchy: &CompressedHierarchy,
        goal: &str,
        history: &[ScreenTransition],
    ) -> String {
        let mut elements_summary = String::new();
        walk(&hierarchy.elements, &mut |el| {
            if el.interactive {
                elements_summary.push_str(&format!(
                    "  - {} id={} label={}\n",
                    el.kind.as_str(),
                    el.id.as_deref().unwrap_or("-"),
                    el.label.as_deref().unwrap_or("-"),
                ));
            }
        });

        let recent_actions = history
            .iter()
            .rev()
            .take(5)
            .map(|t| t.action.describe())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"You are exploring an application's screens. Decide the next action.

GOAL: {goal}

CURRENT SCREEN:
- category: {category:?}
- interactive elements:
{elements}
- recent actions: {recent}

Respond with ONLY valid JSON:
{{"action":"tap|type|swipe|back|done","target":"element id or label","text":"text for type actions","reasoning":"...","confidence":0.8,"expected_outcome":"element expected after the action"}}"#,
            goal = goal,
            category = hierarchy.category,
            elements = if elements_summary.is_empty() {
                "  (none)"
            } else {
                &elements_summary
            },
            recent = if recent_actions.is_empty() {
                "none"
            } else {
                &recent_actions
            },
        )
    }

    fn parse_response(&self, response: &str) -> Result<ExplorationDecision, DecisionError> {
        let parsed: ModelDecisionResponse = serde_json::from_str(response)
            .map_err(|e| DecisionError::MalformedResponse(e.to_string()))?;

        let kind = match parsed.action.as_str() {
            "tap" => ActionKind::Tap,
            "type" => ActionKind::Type,
            "swipe" => ActionKind::Swipe,
            "back" => ActionKind::Back,
            "done" => ActionKind::Done,
            other => {
                return Err(DecisionError::MalformedResponse(format!(
                    "unknown action '{}'",
                    other
                )));
            }
        };

        let mut decision = ExplorationDecision::new(
            ExplorationAction {
                kind,
                target: parsed.target,
                text: parsed.text,
            },
            parsed.reasoning.as_deref().unwrap_or("model decision"),
            parsed.confidence.unwrap_or(0.7),
        );
        decision.expected_outcome = parsed.expected_outcome;
        Ok(decision)
    }
}

impl Decider for OllamaDecider {
    fn decide(
        &mut self,
        hierarchy: &CompressedHierarchy,
        goal: &str,
        history: &[ScreenTransition],
    ) -> Result<ExplorationDecision, DecisionError> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: self.build_prompt(hierarchy, goal, history),
            stream: false,
            format: "json",
        };

        let client = reqwest::blocking::Client::new();
        let response = client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| DecisionError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(DecisionError::InvalidCredentials(status.to_string()));
        }
        if status.as_u16() == 429 {
            return Err(DecisionError::RateLimited(status.to_string()));
        }
        if !status.is_success() {
            return Err(DecisionError::Network(format!(
                "provider returned {}",
                status
            )));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .map_err(|e| DecisionError::MalformedResponse(e.to_string()))?;
        self.parse_response(&ollama_response.response)
    }
}

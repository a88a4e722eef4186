use std::collections::{HashMap, HashSet, VecDeque};

use crate::decision::decision_model::{ExplorationAction, ExplorationDecision};
use crate::explore::error::DecisionError;
use crate::graph::graph_model::ScreenTransition;
use crate::hierarchy::element_model::{Element, ElementType, walk};
use crate::hierarchy::hierarchy_model::CompressedHierarchy;

// ============================================================================
// Decider — the decision capability boundary
// ============================================================================

/// Proposes the next action for a screen. Implementations range from pure
/// heuristics to remote models; all failure modes surface as
/// `DecisionError` so the loop can apply its retry policy uniformly.
pub trait Decider {
    fn decide(
        &mut self,
        hierarchy: &CompressedHierarchy,
        goal: &str,
        history: &[ScreenTransition],
    ) -> Result<ExplorationDecision, DecisionError>;
}

// ============================================================================
// Value guessing for inputs
// ============================================================================

/// Derive a plausible fill value from an input's label or id.
pub fn guess_value(hint: &str) -> String {
    let h = hint.to_lowercase();

    if h.contains("email") {
        return "user@example.com".into();
    }
    if h.contains("password") {
        return "TestPass123!".into();
    }
    if h.contains("phone") || h.contains("tel") {
        return "555-0100".into();
    }
    if h.contains("url") || h.contains("website") {
        return "https://example.com".into();
    }
    if h.contains("zip") || h.contains("postal") {
        return "90210".into();
    }
    if h.contains("username") || h.contains("user") {
        return "testuser".into();
    }
    if h.contains("name") {
        return "Jane Doe".into();
    }
    if h.contains("search") || h.contains("query") {
        return "test query".into();
    }
    if h.contains("date") {
        return "2025-01-15".into();
    }
    if h.contains("number") || h.contains("amount") || h.contains("quantity") {
        return "42".into();
    }

    "test".into()
}

// ============================================================================
// HeuristicDecider — deterministic, rule-based (no model calls)
// ============================================================================

/// Fills untried inputs first, then taps untried interactive elements, and
/// declares `done` once the current screen offers nothing new. Tracks what
/// it has tried per fingerprint, so revisits make progress instead of
/// looping on the first element.
pub struct HeuristicDecider {
    tried: HashMap<String, HashSet<String>>,
}

impl HeuristicDecider {
    pub fn new() -> Self {
        Self {
            tried: HashMap::new(),
        }
    }

    fn candidates<'a>(hierarchy: &'a CompressedHierarchy) -> Vec<&'a Element> {
        let mut out: Vec<&Element> = Vec::new();
        walk(&hierarchy.elements, &mut |el| {
            if el.interactive {
                out.push(el);
            }
        });
        // Inputs before everything else, keeping capture order within groups.
        out.sort_by_key(|el| if el.kind == ElementType::Input { 0 } else { 1 });
        out
    }

    fn target_of(el: &Element) -> Option<String> {
        el.id.clone().or_else(|| el.label.clone())
    }

    fn action_for(el: &Element, target: &str) -> ExplorationAction {
        match el.kind {
            ElementType::Input => ExplorationAction::type_text(target, &guess_value(target)),
            ElementType::Scrollable => ExplorationAction::swipe(target),
            _ => ExplorationAction::tap(target),
        }
    }
}

impl Default for HeuristicDecider {
    fn default() -> Self {
        Self::new()
    }
}

impl Decider for HeuristicDecider {
    fn decide(
        &mut self,
        hierarchy: &CompressedHierarchy,
        _goal: &str,
        _history: &[ScreenTransition],
    ) -> Result<ExplorationDecision, DecisionError> {
        let tried = self
            .tried
            .entry(hierarchy.fingerprint().to_string())
            .or_default();

        let mut untried: Vec<(&Element, String)> = Vec::new();
        for el in Self::candidates(hierarchy) {
            if let Some(target) = Self::target_of(el) {
                if !tried.contains(&target) {
                    untried.push((el, target));
                }
            }
        }

        let Some((el, target)) = untried.first().cloned() else {
            return Ok(ExplorationDecision::done(
                "every interactive element on this screen has been tried",
            ));
        };

        tried.insert(target.clone());

        let action = Self::action_for(el, &target);
        let probability = if el.id.is_some() { 0.85 } else { 0.6 };
        let alternatives = untried
            .iter()
            .skip(1)
            .take(2)
            .map(|(alt, alt_target)| Self::action_for(alt, alt_target))
            .collect();

        Ok(ExplorationDecision::new(
            action,
            &format!("untried {} '{}'", el.kind.as_str(), target),
            probability,
        )
        .with_alternatives(alternatives))
    }
}

// ============================================================================
// ScriptedDecider — canned decisions for tests and demos
// ============================================================================

/// Pops pre-built decisions in order; once the script runs out it answers
/// `done`. The scripted counterpart of a mock model backend.
pub struct ScriptedDecider {
    script: VecDeque<ExplorationDecision>,
}

impl ScriptedDecider {
    pub fn new(decisions: Vec<ExplorationDecision>) -> Self {
        Self {
            script: decisions.into(),
        }
    }
}

impl Decider for ScriptedDecider {
    fn decide(
        &mut self,
        _hierarchy: &CompressedHierarchy,
        _goal: &str,
        _history: &[ScreenTransition],
    ) -> Result<ExplorationDecision, DecisionError> {
        Ok(self
            .script
            .pop_front()
            .unwrap_or_else(|| ExplorationDecision::done("script exhausted")))
    }
}

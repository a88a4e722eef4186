use crate::decision::decision_model::{ActionKind, ExplorationDecision};
use crate::hierarchy::element_model::{Element, walk};
use crate::hierarchy::hierarchy_model::CompressedHierarchy;

// ============================================================================
// ActionVerifier — did the action do what the decision predicted?
// ============================================================================

/// Outcome of comparing before/after snapshots against a decision.
/// Never an error: ambiguous input degrades to `passed=false` with a
/// reason, it does not propagate.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub passed: bool,
    pub screen_changed: bool,
    pub expected_element_found: Option<bool>,
    pub reason: String,
}

/// Rule-ordered verification; the first matching rule decides and names
/// itself in `reason`.
///
/// 1. `done` needs no verification.
/// 2. Compute `screen_changed` from fingerprints.
/// 3. `type` checks the target's value — fingerprints ignore values, so a
///    successful text entry usually changes nothing structural.
/// 4. An expected outcome naming an element is matched against the after
///    screen; pass requires both a change and the element.
/// 5. Fallback: any non-`done` action that changed nothing observable is
///    treated as ineffective.
pub fn verify(
    decision: &ExplorationDecision,
    before: &CompressedHierarchy,
    after: &CompressedHierarchy,
) -> VerificationResult {
    // Rule 1: done.
    if decision.action.kind == ActionKind::Done {
        return VerificationResult {
            passed: true,
            screen_changed: false,
            expected_element_found: None,
            reason: "done action, no verification required".to_string(),
        };
    }

    // Rule 2: structural change.
    let screen_changed = before.fingerprint() != after.fingerprint();

    // Rule 3: type actions verify at the value level.
    if decision.action.kind == ActionKind::Type {
        if let (Some(target), Some(text)) = (&decision.action.target, &decision.action.text) {
            let value_updated = after
                .find_element(target)
                .and_then(|el| el.value.as_deref())
                .is_some_and(|value| value.contains(text.as_str()));
            if value_updated {
                return VerificationResult {
                    passed: true,
                    screen_changed,
                    expected_element_found: None,
                    reason: format!(
                        "type action verified: '{}' now contains the typed text",
                        target
                    ),
                };
            }
        }
    }

    // Rule 4: expected outcome names an element to look for.
    if let Some(outcome) = decision
        .expected_outcome
        .as_deref()
        .filter(|o| !o.trim().is_empty())
    {
        let found = outcome_element_present(outcome, &after.elements);
        let passed = screen_changed && found;
        return VerificationResult {
            passed,
            screen_changed,
            expected_element_found: Some(found),
            reason: format!(
                "expected outcome '{}': screen_changed={}, expected_element_found={}",
                outcome, screen_changed, found
            ),
        };
    }

    // Rule 5: fall back to the structural diff.
    VerificationResult {
        passed: screen_changed,
        expected_element_found: None,
        reason: if screen_changed {
            "screen fingerprint changed".to_string()
        } else {
            "no observable change after action".to_string()
        },
        screen_changed,
    }
}

/// Case-insensitive substring match between the expected outcome and any
/// element id or label on the after screen, in either direction — the
/// outcome may quote the identifier or merely contain it.
fn outcome_element_present(outcome: &str, elements: &[Element]) -> bool {
    let outcome = outcome.to_lowercase();
    let mut found = false;
    walk(elements, &mut |el| {
        if found {
            return;
        }
        for candidate in [el.id.as_deref(), el.label.as_deref()].into_iter().flatten() {
            let candidate = candidate.to_lowercase();
            if candidate.is_empty() {
                continue;
            }
            if outcome.contains(&candidate) || candidate.contains(&outcome) {
                found = true;
                return;
            }
        }
    });
    found
}

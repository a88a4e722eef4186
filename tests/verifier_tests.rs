use screen_explorer::decision::decision_model::{ExplorationAction, ExplorationDecision};
use screen_explorer::hierarchy::element_model::{Element, ElementType};
use screen_explorer::hierarchy::hierarchy_model::CompressedHierarchy;
use screen_explorer::verify::verifier::verify;

// =========================================================================
// Helper builders
// =========================================================================

fn login_screen() -> CompressedHierarchy {
    CompressedHierarchy::new(
        vec![
            Element::interactive(ElementType::Input, "emailField", "Email"),
            Element::interactive(ElementType::Button, "loginButton", "Sign In"),
        ],
        vec![],
        None,
    )
}

fn dashboard_screen() -> CompressedHierarchy {
    CompressedHierarchy::new(
        vec![
            Element::text("Welcome back"),
            Element::interactive(ElementType::Button, "logoutButton", "Log Out"),
        ],
        vec![],
        None,
    )
}

fn decision(action: ExplorationAction) -> ExplorationDecision {
    ExplorationDecision::new(action, "test decision", 0.8)
}

// =========================================================================
// Rule 1: done
// =========================================================================

#[test]
fn done_actions_always_pass() {
    let result = verify(
        &ExplorationDecision::done("nothing left"),
        &login_screen(),
        &login_screen(),
    );
    assert!(result.passed);
    assert!(!result.screen_changed);
    assert_eq!(result.expected_element_found, None);
    assert!(result.reason.contains("done"), "reason: {}", result.reason);
}

// =========================================================================
// Rules 2 and 5: structural change as the fallback signal
// =========================================================================

#[test]
fn tap_passes_when_screen_changes() {
    let result = verify(
        &decision(ExplorationAction::tap("loginButton")),
        &login_screen(),
        &dashboard_screen(),
    );
    assert!(result.passed);
    assert!(result.screen_changed);
    assert_eq!(result.expected_element_found, None);
    assert!(
        result.reason.contains("fingerprint changed"),
        "reason: {}",
        result.reason
    );
}

#[test]
fn tap_fails_when_nothing_changes() {
    let result = verify(
        &decision(ExplorationAction::tap("loginButton")),
        &login_screen(),
        &login_screen(),
    );
    assert!(!result.passed);
    assert!(!result.screen_changed);
    assert!(
        result.reason.contains("no observable change"),
        "reason: {}",
        result.reason
    );
}

// =========================================================================
// Rule 3: type actions verify at the value level
// =========================================================================

#[test]
fn type_passes_on_updated_value_without_structural_change() {
    let before = login_screen();
    let after = CompressedHierarchy::new(
        vec![
            Element::interactive(ElementType::Input, "emailField", "Email")
                .with_value("user@example.com"),
            Element::interactive(ElementType::Button, "loginButton", "Sign In"),
        ],
        vec![],
        None,
    );
    // Values are outside the fingerprint, so the screens still look identical.
    assert_eq!(before.fingerprint(), after.fingerprint());

    let result = verify(
        &decision(ExplorationAction::type_text("emailField", "user@example.com")),
        &before,
        &after,
    );
    assert!(result.passed, "typed text landed in the field");
    assert!(!result.screen_changed);
    assert!(result.reason.contains("type action verified"));
}

#[test]
fn type_fails_when_value_never_appears() {
    let result = verify(
        &decision(ExplorationAction::type_text("emailField", "user@example.com")),
        &login_screen(),
        &login_screen(),
    );
    assert!(!result.passed, "no value update and no structural change");
}

// =========================================================================
// Rule 4: expected outcome names an element
// =========================================================================

#[test]
fn expected_outcome_passes_when_element_appears_on_changed_screen() {
    let d = decision(ExplorationAction::tap("loginButton"))
        .with_expected_outcome("the logoutButton should be visible");
    let result = verify(&d, &login_screen(), &dashboard_screen());

    assert!(result.passed);
    assert!(result.screen_changed);
    assert_eq!(result.expected_element_found, Some(true));
    assert!(result.reason.contains("expected outcome"));
}

#[test]
fn expected_outcome_fails_when_element_is_missing() {
    let d = decision(ExplorationAction::tap("loginButton"))
        .with_expected_outcome("settingsButton appears");
    let result = verify(&d, &login_screen(), &dashboard_screen());

    assert!(!result.passed, "screen changed but the promised element is absent");
    assert!(result.screen_changed);
    assert_eq!(result.expected_element_found, Some(false));
}

#[test]
fn expected_outcome_fails_without_screen_change() {
    // The element is already on the before screen; both change AND presence
    // are required.
    let d = decision(ExplorationAction::tap("loginButton"))
        .with_expected_outcome("loginButton still shown");
    let result = verify(&d, &login_screen(), &login_screen());

    assert!(!result.passed);
    assert!(!result.screen_changed);
    assert_eq!(result.expected_element_found, Some(true));
}

#[test]
fn expected_outcome_matches_labels_case_insensitively() {
    let d = decision(ExplorationAction::tap("loginButton"))
        .with_expected_outcome("should show LOG OUT");
    let result = verify(&d, &login_screen(), &dashboard_screen());

    assert!(result.passed, "label 'Log Out' matches outcome text");
    assert_eq!(result.expected_element_found, Some(true));
}

#[test]
fn blank_expected_outcome_falls_through_to_structural_diff() {
    let mut d = decision(ExplorationAction::tap("loginButton"));
    d.expected_outcome = Some("   ".into());
    let result = verify(&d, &login_screen(), &dashboard_screen());

    assert!(result.passed);
    assert_eq!(
        result.expected_element_found, None,
        "a blank outcome is no outcome at all"
    );
}

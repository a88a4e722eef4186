use screen_explorer::decision::decider::{Decider, HeuristicDecider, ScriptedDecider, guess_value};
use screen_explorer::decision::decision_model::{
    ActionKind, ConfidenceBucket, ExplorationAction, ExplorationDecision,
};
use screen_explorer::hierarchy::element_model::{Element, ElementType};
use screen_explorer::hierarchy::hierarchy_model::CompressedHierarchy;

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

// =========================================================================
// Confidence buckets
// =========================================================================

#[test]
fn probabilities_map_to_expected_buckets() {
    let cases = [
        (0.1, ConfidenceBucket::VeryLow),
        (0.35, ConfidenceBucket::Low),
        (0.55, ConfidenceBucket::Medium),
        (0.75, ConfidenceBucket::High),
        (0.95, ConfidenceBucket::VeryHigh),
    ];
    for (p, expected) in cases {
        assert_eq!(
            ConfidenceBucket::from_probability(p),
            expected,
            "probability {} maps wrong",
            p
        );
    }
}

#[test]
fn bucket_boundaries_are_half_open() {
    assert_eq!(ConfidenceBucket::from_probability(0.0), ConfidenceBucket::VeryLow);
    assert_eq!(ConfidenceBucket::from_probability(0.2), ConfidenceBucket::Low);
    assert_eq!(ConfidenceBucket::from_probability(0.9), ConfidenceBucket::VeryHigh);
    assert_eq!(ConfidenceBucket::from_probability(1.0), ConfidenceBucket::VeryHigh);
}

// =========================================================================
// Probability clamping
// =========================================================================

#[test]
fn construction_clamps_out_of_range_probabilities() {
    let low = ExplorationDecision::new(ExplorationAction::back(), "r", -0.5);
    assert_eq!(low.success_probability, 0.0);
    assert_eq!(low.confidence(), ConfidenceBucket::VeryLow);

    let high = ExplorationDecision::new(ExplorationAction::back(), "r", 1.5);
    assert_eq!(high.success_probability, 1.0);
    assert_eq!(high.confidence(), ConfidenceBucket::VeryHigh);
}

#[test]
fn deserialization_clamps_out_of_range_probabilities() {
    let json = r#"{
        "action": {"kind": "tap", "target": "loginButton"},
        "reasoning": "from the wire",
        "success_probability": 3.2
    }"#;
    let decision: ExplorationDecision = serde_json::from_str(json).unwrap();
    assert_eq!(decision.success_probability, 1.0, "wire values are clamped too");

    let json = r#"{
        "action": {"kind": "back"},
        "reasoning": "from the wire",
        "success_probability": -1.0
    }"#;
    let decision: ExplorationDecision = serde_json::from_str(json).unwrap();
    assert_eq!(decision.success_probability, 0.0);
}

// =========================================================================
// Value guessing
// =========================================================================

#[test]
fn guess_value_matches_field_hints() {
    assert_eq!(guess_value("emailField"), "user@example.com");
    assert_eq!(guess_value("Password"), "TestPass123!");
    assert_eq!(guess_value("searchBox"), "test query");
    assert_eq!(guess_value("mystery"), "test", "unknown hints get a generic value");
}

// =========================================================================
// HeuristicDecider
// =========================================================================

#[test]
fn heuristic_decider_fills_inputs_before_tapping() {
    let mut decider = HeuristicDecider::new();
    let screen = login_screen();

    let first = decider.decide(&screen, "explore", &[]).unwrap();
    assert_eq!(first.action.kind, ActionKind::Type);
    assert_eq!(first.action.target.as_deref(), Some("emailField"));
    assert_eq!(first.action.text.as_deref(), Some("user@example.com"));
    assert_eq!(
        first.success_probability, 0.85,
        "an element with an id is a confident target"
    );
    assert_eq!(
        first.alternative_actions.len(),
        1,
        "the untried button is offered as a fallback"
    );

    let second = decider.decide(&screen, "explore", &[]).unwrap();
    assert_eq!(second.action.kind, ActionKind::Tap);
    assert_eq!(second.action.target.as_deref(), Some("loginButton"));

    let third = decider.decide(&screen, "explore", &[]).unwrap();
    assert_eq!(
        third.action.kind,
        ActionKind::Done,
        "nothing untried remains on this screen"
    );
}

#[test]
fn heuristic_decider_tracks_progress_per_screen() {
    let mut decider = HeuristicDecider::new();
    let login = login_screen();
    let other = CompressedHierarchy::new(
        vec![Element::interactive(
            ElementType::Button,
            "settingsButton",
            "Settings",
        )],
        vec![],
        None,
    );

    decider.decide(&login, "explore", &[]).unwrap();
    let on_other = decider.decide(&other, "explore", &[]).unwrap();
    assert_eq!(
        on_other.action.target.as_deref(),
        Some("settingsButton"),
        "a new screen starts with its own untried set"
    );

    // Back on the login screen, the email field is already spent.
    let back_on_login = decider.decide(&login, "explore", &[]).unwrap();
    assert_eq!(back_on_login.action.target.as_deref(), Some("loginButton"));
}

#[test]
fn heuristic_decider_uses_labels_when_ids_are_missing() {
    let screen = CompressedHierarchy::new(
        vec![Element {
            label: Some("Continue".into()),
            interactive: true,
            ..Element::new(ElementType::Button)
        }],
        vec![],
        None,
    );

    let decision = HeuristicDecider::new().decide(&screen, "explore", &[]).unwrap();
    assert_eq!(decision.action.target.as_deref(), Some("Continue"));
    assert_eq!(
        decision.success_probability, 0.6,
        "label-only targets are less certain"
    );
}

// =========================================================================
// ScriptedDecider
// =========================================================================

#[test]
fn scripted_decider_plays_in_order_then_finishes() {
    let mut decider = ScriptedDecider::new(vec![
        ExplorationDecision::new(ExplorationAction::tap("a"), "first", 0.9),
        ExplorationDecision::new(ExplorationAction::tap("b"), "second", 0.9),
    ]);
    let screen = login_screen();

    assert_eq!(
        decider.decide(&screen, "g", &[]).unwrap().action.target.as_deref(),
        Some("a")
    );
    assert_eq!(
        decider.decide(&screen, "g", &[]).unwrap().action.target.as_deref(),
        Some("b")
    );
    assert_eq!(
        decider.decide(&screen, "g", &[]).unwrap().action.kind,
        ActionKind::Done,
        "an exhausted script is done"
    );
}

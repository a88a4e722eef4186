use std::time::Duration;

use screen_explorer::cli::config::{AppConfig, ExploreConfig, build_loop_config, load_config};
use screen_explorer::explore::session::{
    DEFAULT_MAX_STEPS, DEFAULT_STUCK_THRESHOLD, StuckPolicy,
};

// =========================================================================
// YAML parsing and defaults
// =========================================================================

#[test]
fn empty_config_uses_defaults() {
    let config: AppConfig = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.explore.max_steps, DEFAULT_MAX_STEPS);
    assert_eq!(config.explore.stuck_threshold, DEFAULT_STUCK_THRESHOLD);
    assert_eq!(config.explore.stuck_policy, "abort");
    assert_eq!(config.explore.settle_delay_ms, 100);
    assert_eq!(config.explore.max_elements, 50);
    assert!(config.ollama.endpoint.is_none());
}

#[test]
fn partial_config_keeps_unspecified_defaults() {
    let yaml = r#"
explore:
  max_steps: 5
  stuck_policy: force-novel
ollama:
  model: qwen2.5:1.5b
"#;
    let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.explore.max_steps, 5);
    assert_eq!(config.explore.stuck_policy, "force-novel");
    assert_eq!(
        config.explore.stuck_threshold, DEFAULT_STUCK_THRESHOLD,
        "unset fields fall back"
    );
    assert_eq!(config.ollama.model.as_deref(), Some("qwen2.5:1.5b"));
    assert!(config.ollama.endpoint.is_none());
}

#[test]
fn missing_config_file_yields_defaults() {
    let config = load_config(Some("/nonexistent/screen-explorer.yaml"));
    assert_eq!(config.explore.max_steps, DEFAULT_MAX_STEPS);
}

#[test]
fn malformed_config_file_yields_defaults() {
    let path = std::env::temp_dir().join("screen-explorer-malformed-config.yaml");
    std::fs::write(&path, "explore: [not, a, mapping]").unwrap();
    let config = load_config(path.to_str());
    assert_eq!(
        config.explore.max_steps, DEFAULT_MAX_STEPS,
        "garbage config degrades to defaults instead of failing"
    );
    let _ = std::fs::remove_file(&path);
}

// =========================================================================
// LoopConfig assembly
// =========================================================================

#[test]
fn build_loop_config_merges_cli_step_budget() {
    let explore = ExploreConfig {
        stuck_threshold: 7,
        stuck_policy: "force-novel".to_string(),
        settle_delay_ms: 0,
        max_elements: 12,
        ..ExploreConfig::default()
    };

    let loop_config = build_loop_config(&explore, 42);
    assert_eq!(loop_config.max_steps, 42, "CLI wins over the file");
    assert_eq!(loop_config.stuck_threshold, 7);
    assert_eq!(loop_config.stuck_policy, StuckPolicy::ForceNovelAction);
    assert_eq!(loop_config.settle_delay, Duration::ZERO);
    assert_eq!(loop_config.compressor.max_elements, 12);
}

#[test]
fn unknown_stuck_policy_falls_back_to_abort() {
    let explore = ExploreConfig {
        stuck_policy: "panic-wildly".to_string(),
        ..ExploreConfig::default()
    };
    let loop_config = build_loop_config(&explore, DEFAULT_MAX_STEPS);
    assert_eq!(loop_config.stuck_policy, StuckPolicy::Abort);
}

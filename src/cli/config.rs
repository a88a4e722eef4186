use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::explore::session::{
    DECISION_RETRIES, DEFAULT_MAX_STEPS, DEFAULT_STUCK_THRESHOLD, LoopConfig,
    MAX_ALTERNATIVE_RETRIES, StuckPolicy,
};
use crate::hierarchy::compressor::CompressorConfig;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "screen-explorer",
    version,
    about = "Autonomous UI exploration engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ollama API endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,

    /// Path to config file (default: screen-explorer.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Explore a scenario app and print the resulting navigation map
    Explore {
        /// Path to a scenario YAML file
        #[arg(long)]
        scenario: String,

        /// Exploration goal handed to the decider
        #[arg(long, default_value = "explore every screen")]
        goal: String,

        /// Maximum exploration steps
        #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
        max_steps: u32,

        /// Decider: heuristic or ollama
        #[arg(long, default_value = "heuristic")]
        decider: String,

        /// Write the machine-readable graph snapshot here
        #[arg(long)]
        snapshot: Option<String>,

        /// Write a JSONL trace of the session here
        #[arg(long)]
        trace: Option<String>,
    },

    /// Print coverage stats and the diagram of a saved graph snapshot
    Inspect {
        /// Path to a snapshot JSON file
        #[arg(long)]
        snapshot: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `screen-explorer.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub explore: ExploreConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploreConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    #[serde(default = "default_stuck_threshold")]
    pub stuck_threshold: u32,

    /// "abort" or "force-novel"
    #[serde(default = "default_abort")]
    pub stuck_policy: String,

    #[serde(default = "default_alternative_retries")]
    pub max_alternative_retries: u32,

    #[serde(default = "default_decision_retries")]
    pub decision_retries: u32,

    #[serde(default = "default_settle_ms")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_max_elements")]
    pub max_elements: usize,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            stuck_threshold: DEFAULT_STUCK_THRESHOLD,
            stuck_policy: "abort".to_string(),
            max_alternative_retries: MAX_ALTERNATIVE_RETRIES,
            decision_retries: DECISION_RETRIES,
            settle_delay_ms: 100,
            max_elements: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OllamaConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

// Serde default helpers
fn default_max_steps() -> u32 {
    DEFAULT_MAX_STEPS
}
fn default_stuck_threshold() -> u32 {
    DEFAULT_STUCK_THRESHOLD
}
fn default_abort() -> String {
    "abort".to_string()
}
fn default_alternative_retries() -> u32 {
    MAX_ALTERNATIVE_RETRIES
}
fn default_decision_retries() -> u32 {
    DECISION_RETRIES
}
fn default_settle_ms() -> u64 {
    100
}
fn default_max_elements() -> usize {
    50
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("screen-explorer.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Build a LoopConfig from the config file, with the CLI step budget on top.
pub fn build_loop_config(config: &ExploreConfig, max_steps: u32) -> LoopConfig {
    LoopConfig {
        max_steps,
        stuck_threshold: config.stuck_threshold,
        stuck_policy: match config.stuck_policy.as_str() {
            "force-novel" => StuckPolicy::ForceNovelAction,
            _ => StuckPolicy::Abort,
        },
        max_alternative_retries: config.max_alternative_retries,
        decision_retries: config.decision_retries,
        settle_delay: std::time::Duration::from_millis(config.settle_delay_ms),
        compressor: CompressorConfig {
            max_elements: config.max_elements,
            ..CompressorConfig::default()
        },
        ..LoopConfig::default()
    }
}

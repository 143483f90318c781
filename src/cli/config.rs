use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "locator-healing",
    version,
    about = "Self-healing element resolution for recorded UI test steps"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Embedding API endpoint
    #[arg(long, global = true)]
    pub embed_endpoint: Option<String>,

    /// Embedding model name
    #[arg(long, global = true)]
    pub embed_model: Option<String>,

    /// Path to config file (default: locator-healing.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute every mapped step with self-healing resolution
    Run {
        /// Path to the mapping table CSV
        #[arg(long)]
        mapping: String,

        /// Directory for failure screenshots
        #[arg(long)]
        screenshots_dir: Option<String>,

        /// Report output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format: console, json
        #[arg(long, default_value = "console")]
        format: String,

        /// Retry attempts per step
        #[arg(long)]
        retry_attempts: Option<usize>,

        /// Per-step resolution timeout in milliseconds
        #[arg(long)]
        step_timeout_ms: Option<u64>,

        /// Settle delay between steps in milliseconds
        #[arg(long)]
        settle_ms: Option<u64>,

        /// Race policy: try-all or tracker-guided
        #[arg(long)]
        policy: Option<String>,

        /// Embedding backend: hashed or ollama
        #[arg(long)]
        embedder: Option<String>,

        /// Write resolution events to a JSONL trace file
        #[arg(long)]
        trace: Option<String>,

        /// Write healed locators back to the mapping CSV after the run
        #[arg(long)]
        persist: bool,
    },

    /// Parse a mapping table and print the derived strategy sets
    Inspect {
        /// Path to the mapping table CSV
        #[arg(long)]
        mapping: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `locator-healing.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    #[serde(default = "default_step_timeout_ms")]
    pub step_timeout_ms: u64,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_screenshots_dir")]
    pub screenshots_dir: String,

    #[serde(default = "default_policy")]
    pub policy: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            step_timeout_ms: 10_000,
            backoff_ms: 1_000,
            settle_ms: 1_500,
            screenshots_dir: "screenshots".to_string(),
            policy: "try-all".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default = "default_embedder")]
    pub backend: String,

    pub endpoint: Option<String>,
    pub model: Option<String>,

    /// Blend structural similarity into heal scoring
    #[serde(default)]
    pub blend_structural: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            backend: "hashed".to_string(),
            endpoint: None,
            model: None,
            blend_structural: false,
        }
    }
}

// Serde default helpers
fn default_retry_attempts() -> usize { 3 }
fn default_step_timeout_ms() -> u64 { 10_000 }
fn default_backoff_ms() -> u64 { 1_000 }
fn default_settle_ms() -> u64 { 1_500 }
fn default_screenshots_dir() -> String { "screenshots".to_string() }
fn default_policy() -> String { "try-all".to_string() }
fn default_embedder() -> String { "hashed".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("locator-healing.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

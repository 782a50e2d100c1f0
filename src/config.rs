//! Configuration for the answer benchmark
//!
//! Defines the `bench.toml` schema: which answer source to drive and the
//! pacing/preview knobs of a run.
//!
//! ```toml
//! [source]
//! kind = "process"
//!
//! [source.process]
//! program = "./main"
//! args = ["router"]
//! debug_flag = "-d"
//!
//! [run]
//! inter_question_delay_ms = 1000
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "bench.toml";

/// Which implementation answers the questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Spawn an external program once per question
    #[default]
    Process,
    /// POST to a chat-completions compatible endpoint
    Http,
    /// Canned offline answers
    Simulated,
}

impl SourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Http => "http",
            Self::Simulated => "simulated",
        }
    }
}

/// Top-level benchmark configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub run: RunConfig,
}

impl BenchConfig {
    /// Load config from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults.
    ///
    /// A file that exists but does not parse is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::info!("Loading config from {:?}", path);
            return Self::load(path);
        }
        tracing::debug!("No config at {:?}, using defaults", path);
        Ok(Self::default())
    }
}

/// Answer source selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    #[serde(default)]
    pub process: ProcessSourceConfig,

    #[serde(default)]
    pub http: HttpSourceConfig,
}

/// External program invoked as `<program> [args...] [debug_flag] <question>`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSourceConfig {
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before the question (usually a subcommand)
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    #[serde(default = "default_debug_flag")]
    pub debug_flag: String,

    /// Kill the program after this many seconds. Unset means wait for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ProcessSourceConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            debug_flag: default_debug_flag(),
            timeout_secs: None,
        }
    }
}

impl ProcessSourceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Chat-completions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSourceConfig {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl HttpSourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Pacing and console preview settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Pause between questions of a category run (milliseconds)
    #[serde(default = "default_delay_ms")]
    pub inter_question_delay_ms: u64,

    /// Characters of the extracted answer echoed to the console
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Preview length for compact category runs
    #[serde(default = "default_compact_preview_chars")]
    pub compact_preview_chars: usize,

    /// Directory for timestamped category-run records
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            inter_question_delay_ms: default_delay_ms(),
            preview_chars: default_preview_chars(),
            compact_preview_chars: default_compact_preview_chars(),
            results_dir: default_results_dir(),
        }
    }
}

impl RunConfig {
    pub fn inter_question_delay(&self) -> Duration {
        Duration::from_millis(self.inter_question_delay_ms)
    }
}

fn default_program() -> String { "./main".to_string() }
fn default_args() -> Vec<String> { vec!["router".to_string()] }
fn default_debug_flag() -> String { "-d".to_string() }
fn default_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_model() -> String { "gpt-3.5-turbo".to_string() }
fn default_api_key_env() -> String { "OPENAI_API_KEY".to_string() }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 500 }
fn default_http_timeout_secs() -> u64 { 30 }
fn default_delay_ms() -> u64 { 1000 }
fn default_preview_chars() -> usize { 200 }
fn default_compact_preview_chars() -> usize { 500 }
fn default_results_dir() -> PathBuf { PathBuf::from("benchmark_results") }

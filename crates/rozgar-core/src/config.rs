//! Console configuration: CLI flags over environment over an optional
//! TOML file, validated against a generated JSON schema.

use std::path::{Path, PathBuf};

use anyhow::Result;
use jsonschema::{validator_for, Validator};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default backend base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";

pub const ENV_BASE_URL: &str = "ROZGAR_BASE_URL";
pub const ENV_EVENTS_URL: &str = "ROZGAR_EVENTS_URL";
pub const ENV_STATE_DIR: &str = "ROZGAR_STATE_DIR";
pub const ENV_CONFIG: &str = "ROZGAR_CONFIG";

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct BackendConfig {
    /// REST base URL, e.g. <https://api.example.com/api>
    #[serde(default)]
    pub base_url: Option<String>,
    /// Realtime endpoint; defaults to `base_url` without its `/api` suffix.
    #[serde(default)]
    pub events_url: Option<String>,
    /// Directory holding the persisted session.
    #[serde(default)]
    pub state_dir: Option<String>,
}

static CONFIG_SCHEMA: Lazy<Validator> = Lazy::new(|| {
    let schema = schemars::schema_for!(ConsoleConfig);
    let schema_value = serde_json::to_value(&schema).expect("schema value");
    validator_for(&schema_value).expect("valid schema")
});

/// Returns the JSON schema describing the configuration structure.
///
/// # Panics
///
/// Panics if schema generation fails; this indicates a programming error.
pub fn config_schema_json() -> serde_json::Value {
    let schema = schemars::schema_for!(ConsoleConfig);
    serde_json::to_value(&schema).expect("schema json")
}

pub fn load_config(path: &Path) -> Result<ConsoleConfig> {
    let content = std::fs::read_to_string(path)?;
    let raw: toml::Value = toml::from_str(&content)?;
    let json_value = serde_json::to_value(&raw)?;
    let validation_errors: Vec<_> = CONFIG_SCHEMA
        .iter_errors(&json_value)
        .map(|e| e.to_string())
        .collect();
    if !validation_errors.is_empty() {
        return Err(anyhow::anyhow!(validation_errors.join(", ")));
    }
    let cfg: ConsoleConfig = toml::from_str(&content)?;
    Ok(cfg)
}

/// Realtime endpoint derived from the REST base URL by stripping a
/// trailing `/api` segment.
pub fn derive_events_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    trimmed.strip_suffix("/api").unwrap_or(trimmed).to_string()
}

/// CLI-level overrides, all optional.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub events_url: Option<String>,
    pub state_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Fully resolved settings: flags over env over config file over defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub events_url: String,
    pub state_dir: PathBuf,
}

impl Settings {
    pub fn resolve(overrides: Overrides) -> Result<Self> {
        let config_path = overrides
            .config
            .or_else(|| env_value(ENV_CONFIG).map(PathBuf::from));
        let file = match config_path {
            Some(path) => load_config(&path)?,
            None => ConsoleConfig::default(),
        };

        let base_url = overrides
            .base_url
            .or_else(|| env_value(ENV_BASE_URL))
            .or(file.backend.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        let events_url = overrides
            .events_url
            .or_else(|| env_value(ENV_EVENTS_URL))
            .or(file.backend.events_url)
            .unwrap_or_else(|| derive_events_url(&base_url));
        let events_url = events_url.trim_end_matches('/').to_string();

        let state_dir = overrides
            .state_dir
            .or_else(|| env_value(ENV_STATE_DIR).map(PathBuf::from))
            .or(file.backend.state_dir.map(PathBuf::from))
            .unwrap_or_else(default_state_dir);

        Ok(Settings {
            base_url,
            events_url,
            state_dir,
        })
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_state_dir() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) if !home.trim().is_empty() => PathBuf::from(home).join(".rozgar-admin"),
        _ => PathBuf::from(".rozgar-admin"),
    }
}

//! Settings sources and the on-disk settings file.
//!
//! Policy options are read through [`SettingsSource`], a plain key/value view
//! with typed accessors. The settings file (`~/.commit-gate/settings.json` by
//! default, JSON or YAML) carries the option bag, the optional Jira connection
//! and fallback values for environment variables.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::{keys, PolicyConfig};
use crate::error::ConfigError;
use crate::jira::JiraConfig;

/// Key/value lookup of policy options.
pub trait SettingsSource {
    /// Returns a boolean option, or `default` when unset.
    fn get_bool(&self, key: &str, default: bool) -> bool;

    /// Returns a string option; blank values count as unset.
    fn get_string(&self, key: &str) -> Option<String>;
}

/// In-memory settings backed by JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsMap {
    values: HashMap<String, Value>,
}

impl SettingsMap {
    /// Creates an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, returning the map for chaining.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key` to `value`.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Iterates over the configured keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl SettingsSource for SettingsMap {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            None | Some(Value::Null) => default,
            Some(Value::Bool(value)) => *value,
            Some(Value::String(value)) => match value.trim().to_lowercase().as_str() {
                "true" => true,
                "false" => false,
                "" => default,
                other => {
                    debug!(key, value = other, "Ignoring non-boolean setting");
                    default
                }
            },
            Some(other) => {
                debug!(key, value = %other, "Ignoring non-boolean setting");
                default
            }
        }
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(value) if !value.trim().is_empty() => Some(value.clone()),
            Value::Number(value) => Some(value.to_string()),
            Value::Bool(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

/// Contents of the settings file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PolicyFile {
    /// Policy options, keyed by their setting names.
    #[serde(default)]
    pub settings: SettingsMap,

    /// Jira connection; without it issue keys cannot be verified.
    #[serde(default)]
    pub jira: Option<JiraConfig>,

    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl PolicyFile {
    /// Loads the settings file from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads the settings file from a specific path. YAML is used for
    /// `.yaml`/`.yml` files, JSON otherwise.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // A missing file means an empty policy
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            serde_yaml::from_str::<Self>(&content)
                .with_context(|| format!("Failed to parse settings file: {}", path.display()))
        } else {
            serde_json::from_str::<Self>(&content)
                .with_context(|| format!("Failed to parse settings file: {}", path.display()))
        }
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

        Ok(home_dir.join(".commit-gate").join("settings.json"))
    }

    /// Returns every problem with the file's options.
    ///
    /// Besides invalid patterns, requiring issue keys without a Jira
    /// connection is reported, since every commit would then be rejected.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = PolicyConfig::validate(&self.settings);
        if self.jira.is_none() && self.settings.get_bool(keys::REQUIRE_JIRA_ISSUE, false) {
            errors.push(ConfigError::MissingIssueTracker {
                option: keys::REQUIRE_JIRA_ISSUE,
            });
        }
        errors
    }

    /// Returns an environment variable with fallback to the file's `env` section.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) => Some(value),
            Err(_) => self.env.get(key).cloned(),
        }
    }
}

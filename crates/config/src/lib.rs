//! Configuration loading, validation, and management for Consult.
//!
//! Loads configuration from `~/.consult/config.toml` with environment
//! variable overrides. The resulting [`ConsultConfig`] is built once at
//! startup and passed by reference; nothing reads the environment later.

use consult_core::EngineKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const MIN_TIMEOUT_MS: u64 = 5_000;
pub const MAX_TIMEOUT_MS: u64 = 600_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 180_000;
pub const DEFAULT_MAX_CONTEXT_FILES: usize = 20;

/// The root configuration structure.
///
/// Maps directly to `~/.consult/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultConfig {
    /// Engine used when a caller does not pick one
    #[serde(default = "default_engine")]
    pub default_engine: EngineKind,

    /// Invocation timeout in milliseconds (clamped on use)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of context files per request
    #[serde(default = "default_max_context_files")]
    pub max_context_files: usize,

    /// Directory holding `<role>.md` persona overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,

    /// Base directory for relative context file paths (default: cwd)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Per-engine settings
    #[serde(default)]
    pub engines: EnginesConfig,
}

fn default_engine() -> EngineKind {
    EngineKind::Codex
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_max_context_files() -> usize {
    DEFAULT_MAX_CONTEXT_FILES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnginesConfig {
    #[serde(default = "EngineConfig::codex")]
    pub codex: EngineConfig,

    #[serde(default = "EngineConfig::gemini")]
    pub gemini: EngineConfig,
}

impl Default for EnginesConfig {
    fn default() -> Self {
        Self {
            codex: EngineConfig::codex(),
            gemini: EngineConfig::gemini(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Binary name or absolute path
    pub binary: String,

    /// Model used when the request does not name one
    pub default_model: String,
}

impl EngineConfig {
    fn for_kind(kind: EngineKind) -> Self {
        Self {
            binary: kind.default_binary().into(),
            default_model: kind.default_model().into(),
        }
    }

    fn codex() -> Self {
        Self::for_kind(EngineKind::Codex)
    }

    fn gemini() -> Self {
        Self::for_kind(EngineKind::Gemini)
    }
}

impl ConsultConfig {
    /// Load configuration from the default path (~/.consult/config.toml),
    /// then apply environment overrides:
    /// - `CONSULT_ENGINE`
    /// - `CONSULT_CODEX_MODEL` / `CONSULT_GEMINI_MODEL`
    /// - `CONSULT_TIMEOUT_MS`
    /// - `CONSULT_PROMPTS_DIR`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment-like lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(engine) = lookup("CONSULT_ENGINE") {
            match engine.parse() {
                Ok(kind) => self.default_engine = kind,
                Err(e) => tracing::warn!("Ignoring CONSULT_ENGINE: {e}"),
            }
        }

        if let Some(model) = lookup("CONSULT_CODEX_MODEL").filter(|m| !m.trim().is_empty()) {
            self.engines.codex.default_model = model.trim().to_string();
        }
        if let Some(model) = lookup("CONSULT_GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
            self.engines.gemini.default_model = model.trim().to_string();
        }

        if let Some(raw) = lookup("CONSULT_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.timeout_ms = ms,
                Err(_) => {
                    tracing::warn!(value = %raw, "Ignoring unparseable CONSULT_TIMEOUT_MS");
                    self.timeout_ms = DEFAULT_TIMEOUT_MS;
                }
            }
        }

        if let Some(dir) = lookup("CONSULT_PROMPTS_DIR").filter(|d| !d.trim().is_empty()) {
            self.prompts_dir = Some(PathBuf::from(dir));
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".consult")
    }

    /// The configured timeout, clamped to [5s, 600s].
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms())
    }

    pub fn engine(&self, kind: EngineKind) -> &EngineConfig {
        match kind {
            EngineKind::Codex => &self.engines.codex,
            EngineKind::Gemini => &self.engines.gemini,
        }
    }

    /// Base directory for resolving relative context paths.
    pub fn working_dir(&self) -> PathBuf {
        self.working_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_context_files == 0 {
            return Err(ConfigError::ValidationError(
                "max_context_files must be at least 1".into(),
            ));
        }

        for kind in EngineKind::ALL {
            let engine = self.engine(kind);
            if engine.binary.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "engines.{kind}.binary must not be empty"
                )));
            }
            consult_core::validate_model(&engine.default_model).map_err(|e| {
                ConfigError::ValidationError(format!("engines.{kind}.default_model: {e}"))
            })?;
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for ConsultConfig {
    fn default() -> Self {
        Self {
            default_engine: default_engine(),
            timeout_ms: default_timeout_ms(),
            max_context_files: default_max_context_files(),
            prompts_dir: None,
            working_dir: None,
            engines: EnginesConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

//! Configuration schema (pgmodel.toml)

use serde::{Deserialize, Serialize};

/// SQL dialect used to parse input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectConfig {
    /// PostgreSQL SQL dialect
    #[default]
    Postgres,

    /// Permissive generic dialect
    Generic,

    /// Strict ANSI SQL
    Ansi,
}

/// Catalog dump format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented human-readable tree
    #[default]
    Text,

    /// Pretty-printed JSON
    Json,
}

/// Output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Dump format
    #[serde(default)]
    pub format: OutputFormat,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQL dialect
    #[serde(default)]
    pub dialect: DialectConfig,

    /// Schema that unqualified table names resolve to
    #[serde(default = "default_schema")]
    pub default_schema: String,

    /// Stop at the first statement that fails to apply
    #[serde(default = "default_true")]
    pub fail_fast: bool,

    /// Skip statements the compiler does not understand instead of failing
    #[serde(default = "default_true")]
    pub skip_unsupported: bool,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: DialectConfig::default(),
            default_schema: default_schema(),
            fail_fast: true,
            skip_unsupported: true,
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.default_schema.is_empty() {
            return Err(ConfigError::ParseError("default_schema cannot be empty".to_string()));
        }

        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Command-line arguments, which override file values

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use datatype_schemas::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Validation settings passed to the engine
    pub validation: ValidationConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format when `--output` is not given
    pub format: Option<OutputFormat>,

    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); verbosity flags take precedence
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Include thread IDs
    pub thread_ids: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            progress: true,
        }
    }
}

/// Configuration file syntax, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSyntax {
    Yaml,
    Json,
    Toml,
}

impl ConfigSyntax {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_str(&content, ConfigSyntax::from_path(path))?;
        config.check()?;
        Ok(config)
    }

    fn from_str(content: &str, syntax: ConfigSyntax) -> Result<Self> {
        let config = match syntax {
            ConfigSyntax::Yaml => serde_yaml::from_str(content)?,
            ConfigSyntax::Json => serde_json::from_str(content)?,
            ConfigSyntax::Toml => toml::from_str(content)?,
        };
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Ignoring unreadable configuration"
                        );
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Current directory
        for ext in ["yaml", "yml", "json", "toml"] {
            paths.push(PathBuf::from(format!(".datatype.{}", ext)));
        }

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let datatype_dir = config_dir.join("datatype");
            for ext in ["yaml", "yml", "json", "toml"] {
                paths.push(datatype_dir.join(format!("config.{}", ext)));
            }
        }

        paths
    }

    /// Reject settings the engine cannot run with
    fn check(&self) -> Result<()> {
        if self.validation.max_reference_depth == 0 {
            return Err(Error::config("validation.max_reference_depth must be at least 1"));
        }
        let epsilon = self.validation.multiple_of_epsilon;
        if !epsilon.is_finite() || epsilon < 0.0 {
            return Err(Error::config(
                "validation.multiple_of_epsilon must be a non-negative number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.validation, ValidationConfig::default());
        assert_eq!(config.output.format, None);
        assert!(config.output.progress);
    }

    #[test]
    fn test_yaml_partial_config() {
        let config = Config::from_str(
            "validation:\n  max_reference_depth: 8\noutput:\n  format: json-pretty\n",
            ConfigSyntax::Yaml,
        )
        .unwrap();
        assert_eq!(config.validation.max_reference_depth, 8);
        assert_eq!(
            config.validation.multiple_of_epsilon,
            ValidationConfig::default().multiple_of_epsilon
        );
        assert_eq!(config.output.format, Some(OutputFormat::JsonPretty));
        assert!(config.output.color);
    }

    #[test]
    fn test_toml_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[validation]\nmax_errors = 5\n\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n",
        )
        .unwrap();

        let config = Config::load_with_file(Some(&path)).unwrap();
        assert_eq!(config.validation.max_errors, 5);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let missing = Path::new("/nonexistent/datatype.yaml");
        let err = Config::load_with_file(Some(missing)).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"validation": {"max_reference_depth": 0}}"#).unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_syntax_from_extension() {
        assert_eq!(ConfigSyntax::from_path(Path::new("a.yml")), ConfigSyntax::Yaml);
        assert_eq!(ConfigSyntax::from_path(Path::new("a.toml")), ConfigSyntax::Toml);
        assert_eq!(ConfigSyntax::from_path(Path::new("a.json")), ConfigSyntax::Json);
    }
}

//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use datatype_schemas::LoaderError;
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (stdin, stdout, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A datatype, data or suite file could not be loaded
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Some data documents did not conform
    #[error("{failed} of {total} document(s) failed validation")]
    ValidationFailed { failed: usize, total: usize },

    /// Some conformance cases did not produce the expected outcome
    #[error("{failed} of {total} case(s) failed")]
    TestsFailed { failed: usize, total: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A background task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    ///
    /// Nonconforming data and failing suites exit with 1; usage and
    /// environment problems use distinct codes.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ValidationFailed { .. } | Self::TestsFailed { .. } => 1,
            Self::Loader(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::Io(_) => 4,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Toml(_) => 14,
            Self::Task(_) => 70,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::ValidationFailed { failed: 1, total: 2 }.exit_code(), 1);
        assert_eq!(Error::TestsFailed { failed: 1, total: 9 }.exit_code(), 1);
        assert_eq!(Error::invalid_args("bad").exit_code(), 6);
        assert!(Error::invalid_args("bad").should_show_help());
        assert!(!Error::config("bad").should_show_help());
    }

    #[test]
    fn test_format_error_without_color() {
        let error = Error::FileNotFound {
            path: PathBuf::from("missing.yaml"),
        };
        assert_eq!(format_error(&error, false), "Error: File not found: missing.yaml");
    }

    #[test]
    fn test_loader_error_is_transparent() {
        let schema = datatype_schemas::compile(&serde_json::json!({"type": "tuple"})).unwrap_err();
        let error = Error::from(LoaderError::schema_error(Path::new("person.yaml"), schema));
        assert_eq!(error.exit_code(), 2);
        let formatted = format_error(&error, false);
        assert!(formatted.starts_with("Error: Invalid schema in 'person.yaml'"));
        assert!(formatted.contains("Unknown type 'tuple'"));
    }
}

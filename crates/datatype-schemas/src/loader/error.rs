//! Error types for datatype loading operations
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use crate::model::SchemaError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Error types for datatype loading operations
#[derive(Error, Debug)]
pub enum LoaderError {
    /// File I/O errors
    #[error("Failed to read '{path}': {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parsing errors
    #[error("Failed to parse YAML file '{path}': {source}")]
    YamlParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// JSON parsing errors
    #[error("Failed to parse JSON file '{path}': {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Unsupported file format
    #[error("Unsupported file format for '{path}'. Expected .yaml, .yml, or .json")]
    UnsupportedFormat { path: PathBuf },

    /// The file decoded but is not a usable datatype document
    #[error("Invalid datatype document '{path}': {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    /// The schema in the file failed to compile
    #[error("Invalid schema in '{path}': {source}")]
    SchemaError {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },
}

impl LoaderError {
    /// Create an I/O error with path context
    pub fn io_error(path: &Path, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.to_path_buf(),
            source: error,
        }
    }

    /// Create a YAML parsing error with path context
    pub fn yaml_parse_error(path: &Path, error: serde_yaml::Error) -> Self {
        Self::YamlParseError {
            path: path.to_path_buf(),
            source: error,
        }
    }

    /// Create a JSON parsing error with path context
    pub fn json_parse_error(path: &Path, error: serde_json::Error) -> Self {
        Self::JsonParseError {
            path: path.to_path_buf(),
            source: error,
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(path: &Path) -> Self {
        Self::UnsupportedFormat {
            path: path.to_path_buf(),
        }
    }

    /// Create an invalid document error
    pub fn invalid_document(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a schema compilation error with path context
    pub fn schema_error(path: &Path, error: SchemaError) -> Self {
        Self::SchemaError {
            path: path.to_path_buf(),
            source: error,
        }
    }

    /// Get the path associated with this error
    pub fn path(&self) -> &Path {
        match self {
            Self::IoError { path, .. }
            | Self::YamlParseError { path, .. }
            | Self::JsonParseError { path, .. }
            | Self::UnsupportedFormat { path }
            | Self::InvalidDocument { path, .. }
            | Self::SchemaError { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let path = PathBuf::from("address.yaml");

        let io_err = LoaderError::io_error(
            &path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "File not found"),
        );
        assert!(matches!(io_err, LoaderError::IoError { .. }));
        assert_eq!(io_err.path(), path.as_path());

        let doc_err = LoaderError::invalid_document(&path, "missing 'name'");
        assert_eq!(
            doc_err.to_string(),
            "Invalid datatype document 'address.yaml': missing 'name'"
        );
    }

    #[test]
    fn test_schema_error_keeps_source() {
        let err = LoaderError::schema_error(
            Path::new("broken.json"),
            SchemaError::DuplicateName {
                name: "Address".to_string(),
            },
        );
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert!(source.unwrap().contains("Address"));
    }
}

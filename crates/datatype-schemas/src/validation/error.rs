//! Validation error types and the error aggregator
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use crate::resolver::ReferenceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One step into the data under test
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Property(String),
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Property(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        Self::Property(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Location of a value within the data under test
///
/// Renders JSONPath-style: `$`, `$.home.street`, `$.items[1]`, `$['a.b']`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataPath(Vec<PathSegment>);

impl DataPath {
    /// The root path
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A path made of the given segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// A new path extended by one segment
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::Property(name) if is_plain_identifier(name) => write!(f, ".{}", name)?,
                PathSegment::Property(name) => {
                    write!(f, "['{}']", name.replace('\\', "\\\\").replace('\'', "\\'"))?
                }
            }
        }
        Ok(())
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// Category of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TypeMismatch,
    MissingProperty,
    UnexpectedProperty,
    TooShort,
    TooLong,
    PatternMismatch,
    NotInEnum,
    BelowMinimum,
    AboveMaximum,
    NotMultipleOf,
    TooFewItems,
    TooManyItems,
    DuplicateItem,
    ReferenceNotFound,
    RecursionLimitExceeded,
}

impl ErrorKind {
    /// Stable rule name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::MissingProperty => "missing_property",
            ErrorKind::UnexpectedProperty => "unexpected_property",
            ErrorKind::TooShort => "too_short",
            ErrorKind::TooLong => "too_long",
            ErrorKind::PatternMismatch => "pattern_mismatch",
            ErrorKind::NotInEnum => "not_in_enum",
            ErrorKind::BelowMinimum => "below_minimum",
            ErrorKind::AboveMaximum => "above_maximum",
            ErrorKind::NotMultipleOf => "not_multiple_of",
            ErrorKind::TooFewItems => "too_few_items",
            ErrorKind::TooManyItems => "too_many_items",
            ErrorKind::DuplicateItem => "duplicate_item",
            ErrorKind::ReferenceNotFound => "reference_not_found",
            ErrorKind::RecursionLimitExceeded => "recursion_limit_exceeded",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ReferenceError> for ErrorKind {
    fn from(error: &ReferenceError) -> Self {
        match error {
            ReferenceError::NotFound { .. } => ErrorKind::ReferenceNotFound,
            ReferenceError::CycleExceeded { .. } => ErrorKind::RecursionLimitExceeded,
        }
    }
}

/// One structural nonconformance, tagged with where it occurred
///
/// Serializes with the rendered `location` next to the segment list.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(into = "ErrorRecord", from = "ErrorRecord")]
#[error("Validation error at '{path}': {message}")]
pub struct ValidationError {
    /// Location in the data under test
    pub path: DataPath,
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new<M>(path: DataPath, kind: ErrorKind, message: M) -> Self
    where
        M: Into<String>,
    {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// Create a validation error from a failed reference resolution
    pub fn from_reference(path: DataPath, error: &ReferenceError) -> Self {
        Self::new(path, ErrorKind::from(error), error.to_string())
    }
}

#[derive(Serialize, Deserialize)]
struct ErrorRecord {
    #[serde(default, skip_deserializing)]
    location: String,
    path: DataPath,
    kind: ErrorKind,
    message: String,
}

impl From<ValidationError> for ErrorRecord {
    fn from(error: ValidationError) -> Self {
        Self {
            location: error.path.to_string(),
            path: error.path,
            kind: error.kind,
            message: error.message,
        }
    }
}

impl From<ErrorRecord> for ValidationError {
    fn from(record: ErrorRecord) -> Self {
        Self::new(record.path, record.kind, record.message)
    }
}

/// Every error found in one validation run, in traversal order
///
/// No deduplication is performed: one path may carry several errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// List of validation errors
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "No validation errors");
        }
        write!(f, "{} validation error(s) occurred:", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. [{}] {}", i + 1, error.kind, error)?;
        }
        Ok(())
    }
}

impl ValidationErrors {
    /// Create a new validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Append every error of another collection
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// True when the data conformed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Errors reported at exactly `path`
    pub fn at_path<'a>(&'a self, path: &'a DataPath) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| &e.path == path)
    }

    /// Errors of the given kind
    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    /// Convert to result - Ok if no errors, Err if any errors exist
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

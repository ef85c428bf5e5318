//! Error types for schema compilation and registry construction
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Result type for schema construction
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Construction-time failures. Any of these aborts registry construction.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema (or sub-schema) is not a mapping
    #[error("Schema at '{location}' must be a mapping, found {found}")]
    NotAMapping { location: String, found: String },

    /// `type` names a kind outside the supported set
    #[error("Unknown type '{found}' at '{location}'")]
    UnknownType { location: String, found: String },

    /// A constraint keyword holds a malformed value
    #[error("Invalid '{keyword}' at '{location}': {reason}")]
    InvalidConstraint {
        location: String,
        keyword: String,
        reason: String,
    },

    /// `required` lists a property that `properties` never declares
    #[error("Required property '{property}' at '{location}' is not declared in 'properties'")]
    UndeclaredRequired { location: String, property: String },

    /// `pattern` is not a valid regular expression
    #[error("Invalid pattern '{pattern}' at '{location}': {source}")]
    InvalidPattern {
        location: String,
        pattern: String,
        source: regex::Error,
    },

    /// A datatype was registered without a name
    #[error("Referenced datatype names must not be empty")]
    EmptyName,

    /// Two datatypes share a name
    #[error("Duplicate datatype name '{name}'")]
    DuplicateName { name: String },

    /// A datatype uses the identifier reserved for the primary datatype
    #[error("Datatype name '{name}' is reserved")]
    ReservedName { name: String },

    /// A compilation error inside a named datatype
    #[error("Datatype '{name}': {source}")]
    InDatatype {
        name: String,
        #[source]
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    /// Create a not-a-mapping error
    pub fn not_a_mapping(location: impl Into<String>, found: impl Into<String>) -> Self {
        Self::NotAMapping {
            location: location.into(),
            found: found.into(),
        }
    }

    /// Create an unknown type error
    pub fn unknown_type(location: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnknownType {
            location: location.into(),
            found: found.into(),
        }
    }

    /// Create an invalid constraint error
    pub fn invalid_constraint(
        location: impl Into<String>,
        keyword: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConstraint {
            location: location.into(),
            keyword: keyword.into(),
            reason: reason.into(),
        }
    }

    /// Create an undeclared required property error
    pub fn undeclared_required(location: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UndeclaredRequired {
            location: location.into(),
            property: property.into(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(
        location: impl Into<String>,
        pattern: impl Into<String>,
        source: regex::Error,
    ) -> Self {
        Self::InvalidPattern {
            location: location.into(),
            pattern: pattern.into(),
            source,
        }
    }

    /// Attach the owning datatype name
    pub fn in_datatype(name: impl Into<String>, source: SchemaError) -> Self {
        Self::InDatatype {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// Get the schema location associated with this error, if any
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::NotAMapping { location, .. } => Some(location),
            Self::UnknownType { location, .. } => Some(location),
            Self::InvalidConstraint { location, .. } => Some(location),
            Self::UndeclaredRequired { location, .. } => Some(location),
            Self::InvalidPattern { location, .. } => Some(location),
            Self::InDatatype { source, .. } => source.location(),
            _ => None,
        }
    }

    /// Get the datatype name this error belongs to, if any
    pub fn datatype(&self) -> Option<&str> {
        match self {
            Self::InDatatype { name, .. } => Some(name),
            Self::DuplicateName { name } | Self::ReservedName { name } => Some(name),
            _ => None,
        }
    }
}

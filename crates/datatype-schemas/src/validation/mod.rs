//! Validation of data against the datatypes of a registry
//!
//! The validator walks the data depth-first alongside the compiled schema,
//! following references through the registry, and collects every
//! nonconformance it finds instead of stopping at the first one:
//!
//! - A type mismatch stops checks below that value, nothing else does
//! - Missing required properties are reported before the present keys are visited
//! - Array bounds and duplicates are reported before elements are visited
//! - A failed reference becomes one error at the referencing location
//!
//! A single [`Registry`] may be shared by any number of concurrent
//! validations; each call owns its own walk state.
//!
//! ```rust
//! use datatype_schemas::{validate, Registry};
//! use serde_json::{json, Value};
//!
//! let registry = Registry::build(
//!     &json!({
//!         "type": "object",
//!         "required": ["name"],
//!         "properties": {"name": {"type": "string"}}
//!     }),
//!     Vec::<(String, Value)>::new(),
//! )
//! .unwrap();
//!
//! assert!(validate(&registry, &json!({"name": "Ada"})).is_valid());
//! assert_eq!(validate(&registry, &json!({})).len(), 1);
//! ```
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

mod constraints;
pub mod error;
mod walker;

pub use error::{DataPath, ErrorKind, PathSegment, ValidationError, ValidationErrors};

use crate::registry::Registry;
use crate::resolver::{ReferenceError, ReferenceResolver, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use walker::Walker;

/// Default tolerance for `multipleOf` on non-integral values
pub const DEFAULT_MULTIPLE_OF_EPSILON: f64 = 1e-9;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum re-entries of one datatype along one data path
    pub max_reference_depth: usize,
    /// Relative tolerance for `multipleOf` when exact arithmetic does not apply
    pub multiple_of_epsilon: f64,
    /// Maximum number of errors to report (0 = unlimited)
    pub max_errors: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_reference_depth: DEFAULT_MAX_DEPTH,
            multiple_of_epsilon: DEFAULT_MULTIPLE_OF_EPSILON,
            max_errors: 0,
        }
    }
}

impl ValidationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how often a datatype may be re-entered along one data path
    pub fn with_max_reference_depth(mut self, depth: usize) -> Self {
        self.max_reference_depth = depth;
        self
    }

    /// Set the `multipleOf` tolerance
    pub fn with_multiple_of_epsilon(mut self, epsilon: f64) -> Self {
        self.multiple_of_epsilon = epsilon;
        self
    }

    /// Set maximum number of errors to report
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }
}

/// Validates data against the datatypes of one registry
#[derive(Debug, Clone)]
pub struct Validator<'r> {
    registry: &'r Registry,
    config: ValidationConfig,
}

impl<'r> Validator<'r> {
    /// Create a validator with the default configuration
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            config: ValidationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Validate `data` against the primary datatype
    pub fn validate(&self, data: &Value) -> ValidationErrors {
        self.validate_at(data, DataPath::root())
    }

    /// Validate `data` against the primary datatype, reporting paths below `base`
    pub fn validate_at(&self, data: &Value, base: DataPath) -> ValidationErrors {
        let primary = self.registry.primary();
        self.run(&primary.name, &primary.root, data, base)
    }

    /// Validate `data` against a referenced datatype instead of the primary
    ///
    /// An unknown name yields a single `ReferenceNotFound` error at the root.
    pub fn validate_datatype(&self, name: &str, data: &Value) -> ValidationErrors {
        match self.registry.get(name) {
            Some(datatype) => self.run(&datatype.name, &datatype.root, data, DataPath::root()),
            None => {
                let missing = ReferenceError::not_found(name);
                ValidationError::from_reference(DataPath::root(), &missing).into()
            }
        }
    }

    /// Validate several independent documents against the primary datatype
    ///
    /// Each document is reported under its index (`$[0]`, `$[1]`, ...).
    pub fn validate_batch(&self, documents: &[Value]) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for (i, document) in documents.iter().enumerate() {
            errors.merge(self.validate_at(document, DataPath::root().child(i)));
            if self.config.max_errors > 0 && errors.len() >= self.config.max_errors {
                break;
            }
        }
        self.truncate(errors)
    }

    fn run(
        &self,
        name: &'r str,
        root: &'r crate::model::SchemaNode,
        data: &Value,
        base: DataPath,
    ) -> ValidationErrors {
        let mut walker = Walker::new(
            ReferenceResolver::new(self.registry),
            self.config.max_reference_depth,
            self.config.multiple_of_epsilon,
            base,
        );
        walker.walk_root(name, root, data);
        let errors = self.truncate(walker.finish());

        debug!(datatype = name, errors = errors.len(), "Validation completed");
        errors
    }

    fn truncate(&self, mut errors: ValidationErrors) -> ValidationErrors {
        if self.config.max_errors > 0 {
            errors.errors.truncate(self.config.max_errors);
        }
        errors
    }
}

/// Validate `data` against the primary datatype of `registry`
pub fn validate(registry: &Registry, data: &Value) -> ValidationErrors {
    Validator::new(registry).validate(data)
}

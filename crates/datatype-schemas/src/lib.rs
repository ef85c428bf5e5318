//! Datatype Schemas - named OpenAPI v3 datatypes and structural validation
//!
//! This crate validates decoded data values against datatypes described in
//! the OpenAPI v3 schema dialect:
//! - **Schema Model**: raw schemas are compiled once into typed [`SchemaNode`] trees
//! - **Registry**: the primary datatype plus named referenced datatypes, immutable once built
//! - **Reference Resolver**: `$ref` lookups by name with a bounded recursion guard
//! - **Validator**: a depth-first walk that reports every nonconformance with its data path
//!
//! ## Quick Start
//!
//! ```rust
//! use datatype_schemas::{validate, ErrorKind, RegistryBuilder};
//! use serde_json::json;
//!
//! let registry = RegistryBuilder::new(json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": {
//!         "name": {"type": "string"},
//!         "home": {"$ref": "Address"}
//!     }
//! }))
//! .referenced("Address", json!({
//!     "type": "object",
//!     "required": ["street"],
//!     "properties": {"street": {"type": "string"}}
//! }))
//! .build()
//! .unwrap();
//!
//! let errors = validate(&registry, &json!({"name": "Ada", "home": {}}));
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors.errors[0].kind, ErrorKind::MissingProperty);
//! assert_eq!(errors.errors[0].path.to_string(), "$.home.street");
//! ```
//!
//! ## Recursive datatypes
//!
//! Datatypes may refer to themselves or to each other. References are only
//! followed while data is walked: a reference chain that consumes no data
//! fails immediately, and re-entering a datatype already on the current data
//! path is bounded by [`ValidationConfig::max_reference_depth`] (32 by
//! default). Chains of distinct datatypes are not bounded.
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

pub mod fixture;
pub mod loader;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod validation;
pub mod value;

// Re-export commonly used types for convenience
pub use loader::{DataTypeDocument, DatatypeLoader, LoaderError, LoaderResult};
pub use model::{compile, Datatype, SchemaError, SchemaKind, SchemaNode, SchemaResult};
pub use registry::{Registry, RegistryBuilder, PRIMARY_DATATYPE};
pub use resolver::{ReferenceError, ReferenceResolver, ResolverContext, DEFAULT_MAX_DEPTH};
pub use validation::{
    validate, DataPath, ErrorKind, PathSegment, ValidationConfig, ValidationError,
    ValidationErrors, Validator,
};

//! Datatype loading from YAML and JSON files
//!
//! This module provides:
//! - YAML and JSON parsing with format detection from the file extension
//! - The on-disk datatype document form (`name` + `scheme.openAPIV3Schema`)
//! - Registry construction from a primary document plus referenced
//!   documents or directories of them
//!
//! The engine itself never sees text; everything is decoded here first.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use datatype_schemas::loader::DatatypeLoader;
//! use datatype_schemas::validate;
//! use std::path::Path;
//!
//! let loader = DatatypeLoader::new();
//! let registry = loader.load_registry(Path::new("person.yaml"), &[Path::new("types/")])?;
//! let data = loader.load_data(Path::new("ada.json"))?;
//! println!("{}", validate(&registry, &data));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

pub mod datatype_loader;
pub mod error;
pub mod parser;

pub use datatype_loader::{DataTypeDocument, DataTypeScheme, DatatypeLoader};
pub use error::{LoaderError, LoaderResult};
pub use parser::{Format, SchemaParser};

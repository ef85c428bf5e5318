//! Loading datatype documents from disk into a registry
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::parser::{Format, SchemaParser};
use crate::registry::{Registry, RegistryBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A named datatype as stored on disk
///
/// ```yaml
/// name: Address
/// scheme:
///   openAPIV3Schema:
///     type: object
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTypeDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub scheme: DataTypeScheme,
}

/// The schema block of a [`DataTypeDocument`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTypeScheme {
    #[serde(rename = "openAPIV3Schema")]
    pub open_api_v3_schema: Value,
}

impl DataTypeDocument {
    /// Interpret a decoded file as a datatype document
    ///
    /// A mapping with a `scheme` key is a full document. Anything else is
    /// taken as a bare schema whose name defaults to the file stem.
    pub fn from_value(value: Value, path: &Path) -> LoaderResult<Self> {
        let is_document = value.as_object().is_some_and(|m| m.contains_key("scheme"));
        if is_document {
            return serde_json::from_value(value)
                .map_err(|e| LoaderError::invalid_document(path, e.to_string()));
        }

        Ok(Self {
            name: path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string),
            scheme: DataTypeScheme {
                open_api_v3_schema: value,
            },
        })
    }

    pub fn schema(&self) -> &Value {
        &self.scheme.open_api_v3_schema
    }
}

/// Builds registries from datatype documents on disk
#[derive(Debug, Default, Clone)]
pub struct DatatypeLoader {
    parser: SchemaParser,
}

impl DatatypeLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one datatype document
    pub fn load_document(&self, path: &Path) -> LoaderResult<DataTypeDocument> {
        let value = self.parser.parse_file(path)?;
        DataTypeDocument::from_value(value, path)
    }

    /// Load a data file to validate
    pub fn load_data(&self, path: &Path) -> LoaderResult<Value> {
        self.parser.parse_file(path)
    }

    /// Build a registry from a primary document and referenced documents
    ///
    /// Each entry of `referenced` is either a document file or a directory
    /// whose supported files are all loaded, in file name order. The primary
    /// file itself is skipped when it appears among them.
    pub fn load_registry<P>(&self, primary: &Path, referenced: &[P]) -> LoaderResult<Registry>
    where
        P: AsRef<Path>,
    {
        let primary_doc = self.load_document(primary)?;
        let mut origins: HashMap<String, PathBuf> = HashMap::new();

        let mut builder = RegistryBuilder::new(primary_doc.scheme.open_api_v3_schema);
        if let Some(name) = primary_doc.name {
            origins.insert(name.clone(), primary.to_path_buf());
            builder = builder.name(name);
        }

        let primary_canonical = primary.canonicalize().ok();
        for path in self.expand_paths(referenced)? {
            if primary_canonical.is_some() && path.canonicalize().ok() == primary_canonical {
                continue;
            }
            let document = self.load_document(&path)?;
            let name = document.name.ok_or_else(|| {
                LoaderError::invalid_document(&path, "referenced datatype has no name")
            })?;
            debug!(datatype = %name, path = %path.display(), "Loaded referenced datatype");
            origins.insert(name.clone(), path);
            builder = builder.referenced(name, document.scheme.open_api_v3_schema);
        }

        builder.build().map_err(|e| {
            let origin = e
                .datatype()
                .and_then(|name| origins.get(name))
                .map(PathBuf::as_path)
                .unwrap_or(primary);
            LoaderError::schema_error(origin, e)
        })
    }

    /// Supported document files in `dir`, sorted by file name
    pub fn collect_documents(&self, dir: &Path) -> LoaderResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|e| LoaderError::io_error(dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| LoaderError::io_error(dir, e))?.path();
            if path.is_file() && Format::is_supported(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn expand_paths<P: AsRef<Path>>(&self, paths: &[P]) -> LoaderResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                files.extend(self.collect_documents(path)?);
            } else {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }
}

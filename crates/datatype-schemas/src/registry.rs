//! Datatype registry
//!
//! The registry owns every compiled datatype available to one validation
//! session: the primary datatype under test plus the referenced auxiliary
//! datatypes. It is built atomically and never mutated afterwards, so a
//! single registry can be shared (e.g. behind an `Arc`) by any number of
//! concurrent validations.
//!
//! References between datatypes are *not* resolved here; cycles are legal
//! and only bounded when actual data is walked.
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use crate::model::{compile, Datatype, SchemaError, SchemaNode, SchemaResult};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Identifier under which the primary datatype is always addressable
pub const PRIMARY_DATATYPE: &str = "$primary";

/// Immutable collection of compiled datatypes
#[derive(Debug, Clone)]
pub struct Registry {
    /// Index 0 is always the primary datatype
    datatypes: Vec<Datatype>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    /// Build a registry from an unnamed primary schema and named referenced schemas
    pub fn build<I, S>(primary: &Value, referenced: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut builder = RegistryBuilder::new(primary.clone());
        for (name, raw) in referenced {
            builder = builder.referenced(name, raw);
        }
        builder.build()
    }

    /// The primary datatype under test
    pub fn primary(&self) -> &Datatype {
        &self.datatypes[0]
    }

    /// Look up a datatype by exact name
    pub fn get(&self, name: &str) -> Option<&Datatype> {
        self.by_name.get(name).map(|&index| &self.datatypes[index])
    }

    /// Look up the root node of a datatype by exact name
    pub fn root(&self, name: &str) -> Option<&SchemaNode> {
        self.get(name).map(|datatype| &datatype.root)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Every datatype, primary first, then referenced datatypes in registration order
    pub fn datatypes(&self) -> &[Datatype] {
        &self.datatypes
    }

    /// Names of every datatype, primary first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datatypes.iter().map(|d| d.name.as_str())
    }

    /// Names of the referenced datatypes in registration order
    pub fn referenced_names(&self) -> impl Iterator<Item = &str> {
        self.datatypes[1..].iter().map(|d| d.name.as_str())
    }

    /// Number of datatypes including the primary
    pub fn len(&self) -> usize {
        self.datatypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datatypes.is_empty()
    }

    /// Reference names used anywhere in the registry that no datatype satisfies.
    ///
    /// These are not construction errors: they only fail validation when data
    /// actually reaches them.
    pub fn dangling_references(&self) -> Vec<String> {
        let mut dangling: Vec<String> = Vec::new();
        for datatype in &self.datatypes {
            for name in datatype.root.referenced_names() {
                if !self.contains(name) && !dangling.iter().any(|d| d == name) {
                    dangling.push(name.to_string());
                }
            }
        }
        dangling
    }
}

/// Builder for [`Registry`]
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    primary: Value,
    primary_name: Option<String>,
    referenced: Vec<(String, Value)>,
}

impl RegistryBuilder {
    /// Start a registry around the raw primary schema
    pub fn new(primary: Value) -> Self {
        Self {
            primary,
            primary_name: None,
            referenced: Vec::new(),
        }
    }

    /// Make the primary datatype addressable under its own name as well
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.primary_name = Some(name.into());
        self
    }

    /// Add a referenced datatype
    pub fn referenced(mut self, name: impl Into<String>, raw: Value) -> Self {
        self.referenced.push((name.into(), raw));
        self
    }

    /// Compile everything; fails atomically on the first error
    pub fn build(self) -> SchemaResult<Registry> {
        let primary_name = match self.primary_name {
            Some(name) if name.is_empty() => return Err(SchemaError::EmptyName),
            Some(name) if name == PRIMARY_DATATYPE => {
                return Err(SchemaError::ReservedName { name })
            }
            Some(name) => Some(name),
            None => None,
        };

        let display_name = primary_name
            .clone()
            .unwrap_or_else(|| PRIMARY_DATATYPE.to_string());
        let root = compile(&self.primary)
            .map_err(|e| SchemaError::in_datatype(display_name.as_str(), e))?;

        let mut datatypes = vec![Datatype::new(display_name, root)];
        let mut by_name = HashMap::new();
        by_name.insert(PRIMARY_DATATYPE.to_string(), 0);
        if let Some(name) = primary_name {
            by_name.insert(name, 0);
        }

        for (name, raw) in self.referenced {
            if name.is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if name == PRIMARY_DATATYPE {
                return Err(SchemaError::ReservedName { name });
            }
            if by_name.contains_key(&name) {
                return Err(SchemaError::DuplicateName { name });
            }
            let root = compile(&raw).map_err(|e| SchemaError::in_datatype(name.as_str(), e))?;
            by_name.insert(name.clone(), datatypes.len());
            datatypes.push(Datatype::new(name, root));
        }

        debug!(
            primary = %datatypes[0].name,
            datatypes = datatypes.len(),
            "Datatype registry built"
        );

        Ok(Registry { datatypes, by_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn address() -> Value {
        json!({"type": "object", "properties": {"street": {"type": "string"}}})
    }

    #[test]
    fn test_build_and_lookup() {
        let registry = Registry::build(
            &json!({"type": "object", "properties": {"home": {"$ref": "Address"}}}),
            vec![("Address", address())],
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.primary().name, PRIMARY_DATATYPE);
        assert!(registry.get(PRIMARY_DATATYPE).is_some());
        assert!(registry.get("Address").is_some());
        assert!(registry.get("address").is_none());
        assert_eq!(registry.referenced_names().collect::<Vec<_>>(), vec!["Address"]);
        assert!(registry.dangling_references().is_empty());
    }

    #[test]
    fn test_named_primary_is_addressable_twice() {
        let registry = RegistryBuilder::new(json!({"type": "string"}))
            .name("Name")
            .build()
            .unwrap();
        assert_eq!(registry.primary().name, "Name");
        assert_eq!(registry.get("Name"), registry.get(PRIMARY_DATATYPE));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let err = Registry::build(
            &json!({}),
            vec![("Address", address()), ("Address", json!({"type": "string"}))],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName { ref name } if name == "Address"));

        let err = RegistryBuilder::new(json!({}))
            .name("Address")
            .referenced("Address", address())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName { .. }));
    }

    #[test]
    fn test_reserved_and_empty_names_are_rejected() {
        let err = Registry::build(&json!({}), vec![(PRIMARY_DATATYPE, address())]).unwrap_err();
        assert!(matches!(err, SchemaError::ReservedName { .. }));

        let err = Registry::build(&json!({}), vec![("", address())]).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyName));
    }

    #[test]
    fn test_compile_error_names_datatype() {
        let err = Registry::build(&json!({}), vec![("Broken", json!({"type": "tuple"}))])
            .unwrap_err();
        assert_eq!(err.datatype(), Some("Broken"));
        assert!(matches!(err, SchemaError::InDatatype { .. }));
    }

    #[test]
    fn test_dangling_references_are_reported_not_rejected() {
        let registry = Registry::build(
            &json!({"properties": {"a": {"$ref": "Missing"}, "b": {"$ref": "Missing"}}}),
            Vec::<(String, Value)>::new(),
        )
        .unwrap();
        assert_eq!(registry.dangling_references(), vec!["Missing".to_string()]);
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}

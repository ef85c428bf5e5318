//! Compiled schema model
//!
//! A raw OpenAPI v3 schema document is compiled once into a tree of
//! [`SchemaNode`]s. Each node carries a [`SchemaKind`] whose variant holds
//! only the constraints that are meaningful for that kind, so a string
//! length bound on an integer node simply cannot exist after compilation.
//!
//! Cross-datatype references stay symbolic ([`SchemaKind::Reference`]) and
//! are resolved through the registry at validation time.
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

pub mod compile;
pub mod error;

pub use compile::compile;
pub use error::{SchemaError, SchemaResult};

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One compiled schema node
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// The kind of value this node accepts, with its constraints
    pub kind: SchemaKind,
    /// Whether `null` is accepted in addition to `kind`
    pub nullable: bool,
    /// Free-form description kept for diagnostics
    pub description: Option<String>,
}

impl SchemaNode {
    /// Create a non-nullable node of the given kind
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            nullable: false,
            description: None,
        }
    }

    /// A node that accepts any value
    pub fn any() -> Self {
        Self::new(SchemaKind::Any)
    }

    /// A node that defers to the named datatype
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(SchemaKind::Reference(name.into()))
    }

    /// Mark this node as nullable
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// The type name of this node, as used in error messages
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// The referenced datatype name, if this is a reference node
    pub fn reference_name(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// Names of every datatype referenced anywhere below this node
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match &self.kind {
            SchemaKind::Reference(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            SchemaKind::Object(object) => {
                for child in object.properties.values() {
                    child.collect_references(names);
                }
                if let AdditionalProperties::Schema(child) = &object.additional_properties {
                    child.collect_references(names);
                }
            }
            SchemaKind::Array(array) => {
                if let Some(items) = &array.items {
                    items.collect_references(names);
                }
            }
            _ => {}
        }
    }
}

/// The kind of a schema node, each variant carrying only its own constraints
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String(StringConstraints),
    Number(NumberConstraints),
    Integer(NumberConstraints),
    Boolean(BooleanConstraints),
    Object(ObjectSchema),
    Array(ArraySchema),
    Null,
    /// Deferred to a named datatype in the registry
    Reference(String),
    /// Accepts every value
    Any,
}

impl SchemaKind {
    /// The type name of this kind, as used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaKind::String(_) => "string",
            SchemaKind::Number(_) => "number",
            SchemaKind::Integer(_) => "integer",
            SchemaKind::Boolean(_) => "boolean",
            SchemaKind::Object(_) => "object",
            SchemaKind::Array(_) => "array",
            SchemaKind::Null => "null",
            SchemaKind::Reference(_) => "reference",
            SchemaKind::Any => "any",
        }
    }
}

/// Constraints for string nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringConstraints {
    /// Minimum length in Unicode scalar values
    pub min_length: Option<usize>,
    /// Maximum length in Unicode scalar values
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub enumeration: Option<Vec<Value>>,
}

/// Constraints shared by number and integer nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberConstraints {
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub multiple_of: Option<f64>,
    pub enumeration: Option<Vec<Value>>,
}

/// A numeric bound; inclusive unless `exclusive` is set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub value: f64,
    pub exclusive: bool,
}

impl Bound {
    pub fn inclusive(value: f64) -> Self {
        Self {
            value,
            exclusive: false,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        Self {
            value,
            exclusive: true,
        }
    }
}

/// Constraints for boolean nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanConstraints {
    pub enumeration: Option<Vec<Value>>,
}

/// Structure of an object node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: BTreeMap<String, SchemaNode>,
    /// Required property names, in declaration order
    pub required: Vec<String>,
    pub additional_properties: AdditionalProperties,
}

/// Policy for object keys that are not declared in `properties`
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AdditionalProperties {
    #[default]
    Allowed,
    Forbidden,
    Schema(Box<SchemaNode>),
}

/// Structure of an array node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArraySchema {
    /// Schema for every element; `None` accepts any element
    pub items: Option<Box<SchemaNode>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
}

/// How a string pattern is applied to a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternMode {
    /// The pattern may match anywhere in the value (OpenAPI semantics)
    #[default]
    Partial,
    /// The pattern must match the whole value
    Full,
}

impl PatternMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternMode::Partial => "partial",
            PatternMode::Full => "full",
        }
    }
}

/// A compiled string pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    mode: PatternMode,
}

impl Pattern {
    /// Compile a pattern; full mode anchors the expression on both ends
    pub fn new(source: &str, mode: PatternMode) -> Result<Self, regex::Error> {
        let regex = match mode {
            PatternMode::Partial => Regex::new(source)?,
            PatternMode::Full => Regex::new(&format!("^(?:{})$", source))?,
        };
        Ok(Self {
            source: source.to_string(),
            regex,
            mode,
        })
    }

    /// The pattern as written in the schema
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.mode == other.mode
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/ ({})", self.source, self.mode.as_str())
    }
}

/// A named, compiled schema
#[derive(Debug, Clone, PartialEq)]
pub struct Datatype {
    pub name: String,
    pub root: SchemaNode,
}

impl Datatype {
    pub fn new(name: impl Into<String>, root: SchemaNode) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}

//! Depth-first walk of data against compiled schema nodes
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use super::constraints;
use crate::model::{
    AdditionalProperties, ArraySchema, NumberConstraints, ObjectSchema, SchemaKind, SchemaNode,
};
use crate::resolver::{ReferenceResolver, ResolverContext};
use crate::validation::error::{
    DataPath, ErrorKind, PathSegment, ValidationError, ValidationErrors,
};
use crate::value;
use serde_json::{Map, Number, Value};

/// State of one validation call
///
/// Owns the current data path and the resolution stack, so a walker is
/// never shared between calls.
pub(crate) struct Walker<'r> {
    resolver: ReferenceResolver<'r>,
    context: ResolverContext<'r>,
    path: DataPath,
    errors: ValidationErrors,
    epsilon: f64,
}

impl<'r> Walker<'r> {
    pub(crate) fn new(
        resolver: ReferenceResolver<'r>,
        max_depth: usize,
        epsilon: f64,
        base: DataPath,
    ) -> Self {
        Self {
            resolver,
            context: ResolverContext::new(max_depth),
            path: base,
            errors: ValidationErrors::new(),
            epsilon,
        }
    }

    /// Walk `data` against the root of the datatype a validation starts from
    ///
    /// The name is recorded so a datatype that refers back to itself without
    /// consuming data is caught, but it is not a resolution.
    pub(crate) fn walk_root(&mut self, name: &'r str, root: &'r SchemaNode, data: &Value) {
        self.context.push_root(name);
        self.walk(root, data);
        self.context.pop();
    }

    fn walk_datatype(&mut self, name: &'r str, root: &'r SchemaNode, data: &Value) {
        match self.context.push(name) {
            Ok(()) => {
                self.walk(root, data);
                self.context.pop();
            }
            Err(e) => self.errors.add(ValidationError::from_reference(self.path.clone(), &e)),
        }
    }

    pub(crate) fn finish(self) -> ValidationErrors {
        self.errors
    }

    pub(crate) fn walk(&mut self, node: &'r SchemaNode, data: &Value) {
        if node.nullable && data.is_null() {
            return;
        }

        match &node.kind {
            SchemaKind::Any => {}
            SchemaKind::Reference(name) => self.walk_reference(name, data),
            SchemaKind::Null => {
                if !data.is_null() {
                    self.mismatch(node, data);
                }
            }
            SchemaKind::Boolean(c) => match data {
                Value::Bool(_) => self.check_enum(data, c.enumeration.as_deref()),
                _ => self.mismatch(node, data),
            },
            SchemaKind::String(c) => match data {
                Value::String(text) => {
                    constraints::check_string(text, c, &self.path, &mut self.errors);
                    self.check_enum(data, c.enumeration.as_deref());
                }
                _ => self.mismatch(node, data),
            },
            SchemaKind::Number(c) => match data {
                Value::Number(number) => {
                    self.check_number(number, c);
                    self.check_enum(data, c.enumeration.as_deref());
                }
                _ => self.mismatch(node, data),
            },
            SchemaKind::Integer(c) => match data {
                Value::Number(number) if value::is_integral(number) => {
                    self.check_number(number, c);
                    self.check_enum(data, c.enumeration.as_deref());
                }
                _ => self.mismatch(node, data),
            },
            SchemaKind::Object(object) => match data {
                Value::Object(map) => self.walk_object(object, map),
                _ => self.mismatch(node, data),
            },
            SchemaKind::Array(array) => match data {
                Value::Array(items) => self.walk_array(array, items),
                _ => self.mismatch(node, data),
            },
        }
    }

    fn walk_reference(&mut self, name: &'r str, data: &Value) {
        match self.resolver.resolve(name, &self.context) {
            Ok(datatype) => self.walk_datatype(name, &datatype.root, data),
            Err(e) => self.errors.add(ValidationError::from_reference(self.path.clone(), &e)),
        }
    }

    fn walk_object(&mut self, object: &'r ObjectSchema, map: &Map<String, Value>) {
        for name in &object.required {
            if !map.contains_key(name) {
                self.errors.add(ValidationError::new(
                    self.path.child(name.as_str()),
                    ErrorKind::MissingProperty,
                    format!("Required property '{}' is missing", name),
                ));
            }
        }

        for (key, child) in map {
            if let Some(node) = object.properties.get(key) {
                self.descend(PathSegment::from(key.as_str()), node, child);
                continue;
            }
            match &object.additional_properties {
                AdditionalProperties::Allowed => {}
                AdditionalProperties::Forbidden => self.errors.add(ValidationError::new(
                    self.path.child(key.as_str()),
                    ErrorKind::UnexpectedProperty,
                    format!("Property '{}' is not allowed", key),
                )),
                AdditionalProperties::Schema(node) => {
                    self.descend(PathSegment::from(key.as_str()), node, child)
                }
            }
        }
    }

    fn walk_array(&mut self, array: &'r ArraySchema, items: &[Value]) {
        constraints::check_array_bounds(items, array, &self.path, &mut self.errors);
        if array.unique_items {
            constraints::check_unique(items, &self.path, &mut self.errors);
        }

        if let Some(node) = &array.items {
            for (index, item) in items.iter().enumerate() {
                self.descend(PathSegment::Index(index), node, item);
            }
        }
    }

    /// Step into a child value; references resolved so far no longer count
    /// towards same-value cycles.
    fn descend(&mut self, segment: PathSegment, node: &'r SchemaNode, data: &Value) {
        self.path.push(segment);
        let frame = self.context.enter_value();
        self.walk(node, data);
        self.context.leave_value(frame);
        self.path.pop();
    }

    fn check_number(&mut self, number: &Number, c: &NumberConstraints) {
        constraints::check_number(number, c, self.epsilon, &self.path, &mut self.errors);
    }

    fn check_enum(&mut self, data: &Value, allowed: Option<&[Value]>) {
        constraints::check_enum(data, allowed, &self.path, &mut self.errors);
    }

    fn mismatch(&mut self, node: &SchemaNode, data: &Value) {
        let expected = if node.nullable {
            format!("{} or null", node.type_name())
        } else {
            node.type_name().to_string()
        };
        self.errors.add(ValidationError::new(
            self.path.clone(),
            ErrorKind::TypeMismatch,
            format!("Expected {}, found {}", expected, value::kind_name(data)),
        ));
    }
}

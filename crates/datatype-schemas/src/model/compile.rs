//! Compilation of raw OpenAPI v3 schema documents into [`SchemaNode`] trees
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use crate::model::error::{SchemaError, SchemaResult};
use crate::model::{
    AdditionalProperties, ArraySchema, BooleanConstraints, Bound, NumberConstraints,
    ObjectSchema, Pattern, PatternMode, SchemaKind, SchemaNode, StringConstraints,
};
use crate::value;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Location of the schema root
pub const ROOT_LOCATION: &str = "/";

/// Extension keyword selecting how `pattern` is applied
pub const PATTERN_MODE_KEYWORD: &str = "x-pattern-mode";

/// Compile a decoded schema document into a schema tree
pub fn compile(raw: &Value) -> SchemaResult<SchemaNode> {
    compile_node(raw, ROOT_LOCATION)
}

fn compile_node(raw: &Value, location: &str) -> SchemaResult<SchemaNode> {
    let obj = raw
        .as_object()
        .ok_or_else(|| SchemaError::not_a_mapping(location, value::kind_name(raw)))?;

    let nullable = read_bool(obj, "nullable", location)?.unwrap_or(false);
    let description = obj
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string);

    // Sibling keywords of `$ref` are ignored, as in OpenAPI v3
    let kind = if let Some(reference) = obj.get("$ref") {
        let name = reference.as_str().ok_or_else(|| {
            SchemaError::invalid_constraint(location, "$ref", "must be a datatype name")
        })?;
        if name.is_empty() {
            return Err(SchemaError::invalid_constraint(
                location,
                "$ref",
                "must not be empty",
            ));
        }
        SchemaKind::Reference(name.to_string())
    } else {
        let declared = match obj.get("type") {
            Some(Value::String(t)) => Some(t.as_str()),
            Some(other) => {
                return Err(SchemaError::invalid_constraint(
                    location,
                    "type",
                    format!("must be a string, found {}", value::kind_name(other)),
                ))
            }
            None => infer_type(obj),
        };
        match declared {
            Some(type_name) => compile_kind(type_name, obj, location)?,
            None => SchemaKind::Any,
        }
    };

    Ok(SchemaNode {
        kind,
        nullable,
        description,
    })
}

/// Kind inference for schemas that omit `type`
fn infer_type(obj: &Map<String, Value>) -> Option<&'static str> {
    if obj.contains_key("properties")
        || obj.contains_key("required")
        || obj.contains_key("additionalProperties")
    {
        Some("object")
    } else if obj.contains_key("items") {
        Some("array")
    } else {
        None
    }
}

fn compile_kind(
    type_name: &str,
    obj: &Map<String, Value>,
    location: &str,
) -> SchemaResult<SchemaKind> {
    match type_name {
        "string" => Ok(SchemaKind::String(compile_string(obj, location)?)),
        "number" => Ok(SchemaKind::Number(compile_number(obj, location)?)),
        "integer" => Ok(SchemaKind::Integer(compile_number(obj, location)?)),
        "boolean" => Ok(SchemaKind::Boolean(BooleanConstraints {
            enumeration: read_enum(obj, location)?,
        })),
        "object" => Ok(SchemaKind::Object(compile_object(obj, location)?)),
        "array" => Ok(SchemaKind::Array(compile_array(obj, location)?)),
        "null" => Ok(SchemaKind::Null),
        other => Err(SchemaError::unknown_type(location, other)),
    }
}

fn compile_string(obj: &Map<String, Value>, location: &str) -> SchemaResult<StringConstraints> {
    let min_length = read_count(obj, "minLength", location)?;
    let max_length = read_count(obj, "maxLength", location)?;
    if let (Some(min), Some(max)) = (min_length, max_length) {
        if min > max {
            return Err(SchemaError::invalid_constraint(
                location,
                "minLength",
                format!("{} exceeds maxLength {}", min, max),
            ));
        }
    }

    let mode = match obj.get(PATTERN_MODE_KEYWORD) {
        None => PatternMode::default(),
        Some(Value::String(s)) if s == "partial" => PatternMode::Partial,
        Some(Value::String(s)) if s == "full" => PatternMode::Full,
        Some(other) => {
            return Err(SchemaError::invalid_constraint(
                location,
                PATTERN_MODE_KEYWORD,
                format!("expected 'partial' or 'full', found {}", other),
            ))
        }
    };

    let pattern = match obj.get("pattern") {
        None => None,
        Some(Value::String(source)) => Some(
            Pattern::new(source, mode)
                .map_err(|e| SchemaError::invalid_pattern(location, source.as_str(), e))?,
        ),
        Some(other) => {
            return Err(SchemaError::invalid_constraint(
                location,
                "pattern",
                format!("must be a string, found {}", value::kind_name(other)),
            ))
        }
    };

    Ok(StringConstraints {
        min_length,
        max_length,
        pattern,
        enumeration: read_enum(obj, location)?,
    })
}

fn compile_number(obj: &Map<String, Value>, location: &str) -> SchemaResult<NumberConstraints> {
    let minimum = read_bound(obj, "minimum", "exclusiveMinimum", location, f64::max)?;
    let maximum = read_bound(obj, "maximum", "exclusiveMaximum", location, f64::min)?;

    if let (Some(min), Some(max)) = (minimum, maximum) {
        if min.value > max.value {
            return Err(SchemaError::invalid_constraint(
                location,
                "minimum",
                format!("{} exceeds maximum {}", min.value, max.value),
            ));
        }
    }

    let multiple_of = read_number(obj, "multipleOf", location)?;
    if let Some(divisor) = multiple_of {
        if !(divisor > 0.0 && divisor.is_finite()) {
            return Err(SchemaError::invalid_constraint(
                location,
                "multipleOf",
                format!("must be strictly positive, found {}", divisor),
            ));
        }
    }

    Ok(NumberConstraints {
        minimum,
        maximum,
        multiple_of,
        enumeration: read_enum(obj, location)?,
    })
}

/// Reads `minimum`/`maximum` together with its exclusive flag.
///
/// The exclusive keyword is either the OpenAPI v3.0 boolean modifier or a
/// number of its own. When both a numeric exclusive bound and an inclusive
/// bound are present the tighter one wins, as chosen by `tighter`.
fn read_bound(
    obj: &Map<String, Value>,
    keyword: &str,
    exclusive_keyword: &str,
    location: &str,
    tighter: fn(f64, f64) -> f64,
) -> SchemaResult<Option<Bound>> {
    let inclusive = read_number(obj, keyword, location)?;

    match obj.get(exclusive_keyword) {
        None => Ok(inclusive.map(Bound::inclusive)),
        Some(Value::Bool(flag)) => Ok(inclusive.map(|value| Bound {
            value,
            exclusive: *flag,
        })),
        Some(Value::Number(n)) => {
            let exclusive = n.as_f64().ok_or_else(|| {
                SchemaError::invalid_constraint(location, exclusive_keyword, "is not representable")
            })?;
            match inclusive {
                Some(value) if tighter(value, exclusive) == value && value != exclusive => {
                    Ok(Some(Bound::inclusive(value)))
                }
                _ => Ok(Some(Bound::exclusive(exclusive))),
            }
        }
        Some(other) => Err(SchemaError::invalid_constraint(
            location,
            exclusive_keyword,
            format!("must be a boolean or number, found {}", value::kind_name(other)),
        )),
    }
}

fn compile_object(obj: &Map<String, Value>, location: &str) -> SchemaResult<ObjectSchema> {
    let declared = match obj.get("properties") {
        None => None,
        Some(Value::Object(props)) => {
            let mut properties = BTreeMap::new();
            for (name, raw) in props {
                let child_location = child(&child(location, "properties"), name);
                properties.insert(name.clone(), compile_node(raw, &child_location)?);
            }
            Some(properties)
        }
        Some(other) => {
            return Err(SchemaError::invalid_constraint(
                location,
                "properties",
                format!("must be a mapping, found {}", value::kind_name(other)),
            ))
        }
    };

    let mut required: Vec<String> = Vec::new();
    match obj.get("required") {
        None => {}
        Some(Value::Array(names)) => {
            for name in names {
                let name = name.as_str().ok_or_else(|| {
                    SchemaError::invalid_constraint(
                        location,
                        "required",
                        format!("entries must be strings, found {}", value::kind_name(name)),
                    )
                })?;
                if !declared.as_ref().is_some_and(|properties| properties.contains_key(name)) {
                    return Err(SchemaError::undeclared_required(location, name));
                }
                if !required.iter().any(|existing| existing == name) {
                    required.push(name.to_string());
                }
            }
        }
        Some(other) => {
            return Err(SchemaError::invalid_constraint(
                location,
                "required",
                format!("must be a list, found {}", value::kind_name(other)),
            ))
        }
    }

    let additional_properties = match obj.get("additionalProperties") {
        None | Some(Value::Bool(true)) => AdditionalProperties::Allowed,
        Some(Value::Bool(false)) => AdditionalProperties::Forbidden,
        Some(raw @ Value::Object(_)) => AdditionalProperties::Schema(Box::new(compile_node(
            raw,
            &child(location, "additionalProperties"),
        )?)),
        Some(other) => {
            return Err(SchemaError::invalid_constraint(
                location,
                "additionalProperties",
                format!("must be a boolean or schema, found {}", value::kind_name(other)),
            ))
        }
    };

    Ok(ObjectSchema {
        properties: declared.unwrap_or_default(),
        required,
        additional_properties,
    })
}

fn compile_array(obj: &Map<String, Value>, location: &str) -> SchemaResult<ArraySchema> {
    let items = match obj.get("items") {
        None => None,
        Some(raw @ Value::Object(_)) => {
            Some(Box::new(compile_node(raw, &child(location, "items"))?))
        }
        Some(other) => {
            return Err(SchemaError::invalid_constraint(
                location,
                "items",
                format!("must be a schema, found {}", value::kind_name(other)),
            ))
        }
    };

    let min_items = read_count(obj, "minItems", location)?;
    let max_items = read_count(obj, "maxItems", location)?;
    if let (Some(min), Some(max)) = (min_items, max_items) {
        if min > max {
            return Err(SchemaError::invalid_constraint(
                location,
                "minItems",
                format!("{} exceeds maxItems {}", min, max),
            ));
        }
    }

    Ok(ArraySchema {
        items,
        min_items,
        max_items,
        unique_items: read_bool(obj, "uniqueItems", location)?.unwrap_or(false),
    })
}

fn read_bool(
    obj: &Map<String, Value>,
    keyword: &str,
    location: &str,
) -> SchemaResult<Option<bool>> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(SchemaError::invalid_constraint(
            location,
            keyword,
            format!("must be a boolean, found {}", value::kind_name(other)),
        )),
    }
}

fn read_number(
    obj: &Map<String, Value>,
    keyword: &str,
    location: &str,
) -> SchemaResult<Option<f64>> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or_else(|| {
            SchemaError::invalid_constraint(location, keyword, "is not representable")
        }),
        Some(other) => Err(SchemaError::invalid_constraint(
            location,
            keyword,
            format!("must be a number, found {}", value::kind_name(other)),
        )),
    }
}

/// Reads a non-negative integer such as `minLength` or `maxItems`
fn read_count(
    obj: &Map<String, Value>,
    keyword: &str,
    location: &str,
) -> SchemaResult<Option<usize>> {
    let Some(raw) = obj.get(keyword) else {
        return Ok(None);
    };
    let count = match raw {
        Value::Number(n) if n.is_u64() => n.as_u64(),
        Value::Number(n) if value::is_integral(n) => n
            .as_f64()
            .filter(|f| *f >= 0.0)
            .map(|f| f as u64),
        _ => None,
    };
    count
        .and_then(|c| usize::try_from(c).ok())
        .map(Some)
        .ok_or_else(|| {
            SchemaError::invalid_constraint(
                location,
                keyword,
                format!("must be a non-negative integer, found {}", raw),
            )
        })
}

fn read_enum(obj: &Map<String, Value>, location: &str) -> SchemaResult<Option<Vec<Value>>> {
    match obj.get("enum") {
        None => Ok(None),
        Some(Value::Array(values)) if !values.is_empty() => Ok(Some(values.clone())),
        Some(Value::Array(_)) => Err(SchemaError::invalid_constraint(
            location,
            "enum",
            "must list at least one value",
        )),
        Some(other) => Err(SchemaError::invalid_constraint(
            location,
            "enum",
            format!("must be a list, found {}", value::kind_name(other)),
        )),
    }
}

/// Appends a JSON-pointer segment to a schema location
fn child(location: &str, segment: &str) -> String {
    let escaped = segment.replace('~', "~0").replace('/', "~1");
    if location == ROOT_LOCATION {
        format!("/{}", escaped)
    } else {
        format!("{}/{}", location, escaped)
    }
}

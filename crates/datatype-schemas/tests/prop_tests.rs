//! Property-based tests for datatype validation
//!
//! These tests verify that the validator behaves correctly across a wide
//! range of generated data.

use datatype_schemas::{validate, ErrorKind, PathSegment, Registry, RegistryBuilder, Validator};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for generating random JSON values with controlled complexity
fn json_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        (-1.0e6..1.0e6f64).prop_map(|f| json!(f)),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::String),
    ];

    leaf.prop_recursive(
        4,  // max depth
        24, // max size
        5,  // items per collection
        |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                proptest::collection::hash_map("[a-z]{1,6}", inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

/// A registry touching every node kind, with a recursive datatype
fn kitchen_sink() -> Registry {
    RegistryBuilder::new(json!({
        "type": "object",
        "required": ["id"],
        "properties": {
            "id": {"type": "integer", "minimum": 0, "multipleOf": 3},
            "name": {"type": "string", "minLength": 2, "pattern": "^[a-z]"},
            "score": {"type": "number", "maximum": 100, "exclusiveMaximum": true},
            "ok": {"type": "boolean"},
            "tags": {
                "type": "array",
                "items": {"type": "string"},
                "uniqueItems": true,
                "maxItems": 3
            },
            "tree": {"$ref": "Tree"},
            "note": {"type": "string", "nullable": true},
            "extra": {}
        },
        "additionalProperties": false
    }))
    .referenced(
        "Tree",
        json!({
            "type": "object",
            "properties": {
                "value": {"type": "integer"},
                "children": {"type": "array", "items": {"$ref": "Tree"}}
            }
        }),
    )
    .build()
    .expect("registry should build")
}

/// Whether the error path (or its parent for missing properties) is present in the data
fn path_is_present(data: &Value, segments: &[PathSegment]) -> bool {
    let mut current = data;
    for segment in segments {
        let next = match (segment, current) {
            (PathSegment::Property(name), Value::Object(map)) => map.get(name),
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return false,
        }
    }
    true
}

proptest! {
    /// Property: validating twice yields identical errors in identical order
    #[test]
    fn prop_validation_is_idempotent(input in json_value_strategy()) {
        let registry = kitchen_sink();
        let first = validate(&registry, &input);
        let second = validate(&registry, &input);
        prop_assert_eq!(first, second);
    }

    /// Property: every error points at data that exists
    #[test]
    fn prop_error_paths_exist(
        input in json_value_strategy(),
        tree in json_value_strategy(),
    ) {
        let registry = kitchen_sink();
        let mut data = input;
        if let Value::Object(map) = &mut data {
            map.insert("tree".to_string(), tree);
        }

        for error in &validate(&registry, &data) {
            let segments = error.path.segments();
            let checked = if error.kind == ErrorKind::MissingProperty {
                &segments[..segments.len() - 1]
            } else {
                segments
            };
            prop_assert!(path_is_present(&data, checked), "{} is not in {}", error, data);
        }
    }

    /// Property: the unconstrained schema accepts everything
    #[test]
    fn prop_any_accepts_all(input in json_value_strategy()) {
        let registry = Registry::build(&json!({}), Vec::<(String, Value)>::new()).unwrap();
        prop_assert!(validate(&registry, &input).is_valid());
    }

    /// Property: a nullable node accepts null whatever its kind
    #[test]
    fn prop_nullable_accepts_null(kind in prop_oneof![
        Just("string"), Just("number"), Just("integer"),
        Just("boolean"), Just("object"), Just("array"),
    ]) {
        let registry = Registry::build(
            &json!({"type": kind, "nullable": true}),
            Vec::<(String, Value)>::new(),
        ).unwrap();
        prop_assert!(validate(&registry, &Value::Null).is_valid());
    }

    /// Property: integers inside the bounds and on the step always conform
    #[test]
    fn prop_integer_constraints(n in -1000i64..1000) {
        let registry = Registry::build(
            &json!({"type": "integer", "minimum": 0, "multipleOf": 5}),
            Vec::<(String, Value)>::new(),
        ).unwrap();
        let errors = validate(&registry, &json!(n));
        prop_assert_eq!(errors.is_valid(), n >= 0 && n % 5 == 0);
    }

    /// Property: string length bounds count characters, not bytes
    #[test]
    fn prop_string_length_in_chars(s in "\\PC{0,12}") {
        let registry = Registry::build(
            &json!({"type": "string", "maxLength": 6}),
            Vec::<(String, Value)>::new(),
        ).unwrap();
        let errors = validate(&registry, &json!(s));
        prop_assert_eq!(errors.is_valid(), s.chars().count() <= 6);
    }

    /// Property: finite recursive data within the bound always conforms
    #[test]
    fn prop_recursive_data_within_bound(depth in 0usize..25) {
        let registry = kitchen_sink();
        let mut tree = json!({"value": 1});
        for _ in 0..depth {
            tree = json!({"value": 1, "children": [tree.clone(), {"value": 2}]});
        }
        let errors = Validator::new(&registry).validate_datatype("Tree", &tree);
        prop_assert!(errors.is_valid(), "{}", errors);
    }
}

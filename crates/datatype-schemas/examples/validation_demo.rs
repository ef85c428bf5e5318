//! Validation demonstration example
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use datatype_schemas::{RegistryBuilder, ValidationConfig, Validator};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Datatype Validation Demo ===\n");

    demo_referenced_datatypes()?;

    println!();

    demo_recursive_datatype()?;

    Ok(())
}

fn demo_referenced_datatypes() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Referenced Datatypes ---");

    let registry = RegistryBuilder::new(json!({
        "type": "object",
        "required": ["name", "age"],
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "age": {"type": "integer", "minimum": 0},
            "home": {"$ref": "Address"},
            "tags": {"type": "array", "items": {"type": "string"}, "uniqueItems": true}
        },
        "additionalProperties": false
    }))
    .name("Person")
    .referenced(
        "Address",
        json!({
            "type": "object",
            "required": ["street"],
            "properties": {"street": {"type": "string"}}
        }),
    )
    .build()?;

    let validator = Validator::new(&registry);

    println!("✅ Validating conforming person:");
    let errors = validator.validate(&json!({
        "name": "Ada",
        "age": 36,
        "home": {"street": "Main"},
        "tags": ["math", "engines"]
    }));
    println!("   {}", errors);

    println!("\n❌ Validating nonconforming person:");
    let errors = validator.validate(&json!({
        "name": "",
        "age": -1,
        "home": {},
        "tags": ["math", "math"],
        "nickname": "Countess"
    }));
    for error in &errors {
        println!("   [{}] {}: {}", error.kind, error.path, error.message);
    }

    Ok(())
}

fn demo_recursive_datatype() -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Recursive Datatype ---");

    let registry = RegistryBuilder::new(json!({"$ref": "Node"}))
        .referenced(
            "Node",
            json!({
                "type": "object",
                "properties": {
                    "value": {"type": "integer"},
                    "children": {"type": "array", "items": {"$ref": "Node"}}
                }
            }),
        )
        .build()?;

    let tree = json!({"value": 1, "children": [{"value": 2, "children": [{"value": 3}]}]});
    let validator = Validator::new(&registry);
    println!("Tree of depth 3: {}", validator.validate(&tree));

    let mut chain = json!({"value": 0});
    for _ in 0..8 {
        chain = json!({"value": 0, "children": [chain]});
    }
    let strict = Validator::new(&registry)
        .with_config(ValidationConfig::new().with_max_reference_depth(6));
    println!("Chain of depth 9 with a bound of 6: {}", strict.validate(&chain));

    Ok(())
}

//! JSON schemas for structured outputs, derived from Rust types.
//!
//! Strict mode requires every object to declare `additionalProperties: false`
//! and to list all of its properties as required. Nested `$ref`s are not
//! resolved here, so keep structured-output types flat.

use serde_json::Value;

/// Turn a generated root schema into one accepted by strict mode.
pub fn strict_schema(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.remove("$schema");
        map.remove("title");
        map.remove("definitions");
    }
    close_objects(&mut value);
    value
}

fn close_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type") == Some(&Value::String("object".into())) {
                map.insert("additionalProperties".into(), Value::Bool(false));
                if let Some(Value::Object(props)) = map.get("properties") {
                    let required = props.keys().cloned().map(Value::String).collect();
                    map.insert("required".into(), Value::Array(required));
                }
            }
            for child in map.values_mut() {
                close_objects(child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

//! Strict JSON Schema validation for tool arguments
//!
//! Caller-supplied arguments are checked against a tool's declared
//! `inputSchema` before any network request is made. Error messages name the
//! offending parameter so an LLM caller can repair the call.
//!
//! Checks, in order: required parameters present and non-null, no unknown
//! parameters, type match (with safe `"123"` → `123` and `"true"` → `true`
//! coercions), enum membership, numeric minimum/maximum.

use serde_json::{Map, Value};

/// Validate `arguments` against `schema`, returning the coerced arguments
///
/// An absent or empty schema accepts any object. Errors are human-readable
/// messages identifying the failing field.
pub fn validate_arguments(arguments: &Value, schema: &Value) -> Result<Value, String> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(arguments.clone());
    };

    let args = match arguments {
        Value::Null => Map::new(),
        Value::Object(map) => map.clone(),
        other => {
            return Err(format!(
                "arguments must be an object, got {}",
                type_name(other)
            ));
        }
    };

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for name in &required {
        if args.get(*name).is_none_or(Value::is_null) {
            return Err(format!("missing required parameter '{name}'"));
        }
    }

    let mut coerced = Map::new();
    for (name, value) in args {
        let Some(spec) = properties.get(&name) else {
            return Err(format!("unknown parameter '{name}'"));
        };
        if value.is_null() {
            continue;
        }
        let value = coerce(&name, value, spec)?;
        check_enum(&name, &value, spec)?;
        check_bounds(&name, &value, spec)?;
        coerced.insert(name, value);
    }

    Ok(Value::Object(coerced))
}

fn coerce(name: &str, value: Value, spec: &Value) -> Result<Value, String> {
    let Some(expected) = spec.get("type").and_then(Value::as_str) else {
        return Ok(value);
    };

    let coerced = match (expected, &value) {
        ("string", Value::String(_))
        | ("boolean", Value::Bool(_))
        | ("object", Value::Object(_))
        | ("array", Value::Array(_)) => value,
        ("integer", Value::Number(n)) if n.is_i64() || n.is_u64() => value,
        ("number", Value::Number(_)) => value,
        // Safe string coercions for numeric and boolean fields.
        ("integer", Value::String(s)) => match s.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => return Err(format!("parameter '{name}' must be an integer, got '{s}'")),
        },
        ("number", Value::String(s)) => match s.parse::<f64>() {
            Ok(n) => Value::from(n),
            Err(_) => return Err(format!("parameter '{name}' must be a number, got '{s}'")),
        },
        ("boolean", Value::String(s)) => match s.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => return Err(format!("parameter '{name}' must be a boolean, got '{s}'")),
        },
        _ => {
            return Err(format!(
                "parameter '{name}' must be of type {expected}, got {}",
                type_name(&value)
            ));
        }
    };
    Ok(coerced)
}

fn check_enum(name: &str, value: &Value, spec: &Value) -> Result<(), String> {
    if let Some(options) = spec.get("enum").and_then(Value::as_array) {
        if !options.contains(value) {
            let listed: Vec<String> = options.iter().map(ToString::to_string).collect();
            return Err(format!(
                "parameter '{name}' must be one of [{}], got {value}",
                listed.join(", ")
            ));
        }
    }
    Ok(())
}

fn check_bounds(name: &str, value: &Value, spec: &Value) -> Result<(), String> {
    let Some(v) = value.as_f64() else {
        return Ok(());
    };
    if let Some(min) = spec.get("minimum").and_then(Value::as_f64) {
        if v < min {
            return Err(format!("parameter '{name}' must be >= {min}, got {v}"));
        }
    }
    if let Some(max) = spec.get("maximum").and_then(Value::as_f64) {
        if v > max {
            return Err(format!("parameter '{name}' must be <= {max}, got {v}"));
        }
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

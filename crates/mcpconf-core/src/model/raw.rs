//! Helpers for pulling typed values out of a raw JSON object.
//!
//! Every `take_*` function removes the key from the map whether or not it is
//! present, so whatever remains afterwards is the unknown-field bag. A `null`
//! value is treated as absent.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

pub(crate) fn take_string(map: &mut Map<String, Value>, key: &str) -> Result<Option<String>> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(type_error(key, "a string", &other)),
    }
}

pub(crate) fn take_string_vec(map: &mut Map<String, Value>, key: &str) -> Result<Vec<String>> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(type_error(key, "an array of strings", &other)),
            })
            .collect(),
        Some(other) => Err(type_error(key, "an array of strings", &other)),
    }
}

pub(crate) fn take_string_map(
    map: &mut Map<String, Value>,
    key: &str,
) -> Result<BTreeMap<String, String>> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries
            .into_iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k, s)),
                other => Err(type_error(key, "a map of strings", &other)),
            })
            .collect(),
        Some(other) => Err(type_error(key, "a map of strings", &other)),
    }
}

pub(crate) fn take_bool(map: &mut Map<String, Value>, key: &str) -> Result<Option<bool>> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(b)),
        Some(other) => Err(type_error(key, "a boolean", &other)),
    }
}

pub(crate) fn take_object(
    map: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<Map<String, Value>>> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(obj)) => Ok(Some(obj)),
        Some(other) => Err(type_error(key, "an object", &other)),
    }
}

pub(crate) fn put_string(map: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
}

pub(crate) fn put_string_vec(map: &mut Map<String, Value>, key: &str, values: &[String]) {
    if !values.is_empty() {
        map.insert(
            key.to_string(),
            Value::Array(values.iter().cloned().map(Value::String).collect()),
        );
    }
}

pub(crate) fn put_string_map(
    map: &mut Map<String, Value>,
    key: &str,
    values: &BTreeMap<String, String>,
) {
    if !values.is_empty() {
        let object = values
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        map.insert(key.to_string(), Value::Object(object));
    }
}

/// Interpret a value as a JSON object, the shape every config root and
/// server entry must have.
pub(crate) fn expect_object(value: Value, field: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(type_error(field, "an object", &other)),
    }
}

fn type_error(key: &str, expected: &str, found: &Value) -> Error {
    Error::invalid_field(key, format!("expected {expected}, found {}", kind(found)))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

//! Raw platform documents.
//!
//! Every translator normalizes its file to a `serde_json::Map` root, lifts the
//! servers table out of it at a nested path, and leaves everything else in
//! place so surrounding settings survive a rewrite.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::model::raw::expect_object;

pub(crate) use crate::parser::json_object as json_root;

/// Decode a TOML document root into the JSON intermediate.
pub(crate) fn toml_root(bytes: &[u8]) -> Result<Map<String, Value>> {
    let content = std::str::from_utf8(bytes)
        .map_err(|e| Error::invalid_field("<root>", format!("TOML must be UTF-8: {e}")))?;
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    let table: toml::Table = toml::from_str(content).map_err(|e| Error::toml_syntax(&e, content))?;
    Ok(table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json_value(value)))
        .collect())
}

/// Encode a JSON intermediate root as a TOML document.
pub(crate) fn toml_bytes(root: &Map<String, Value>) -> Result<Vec<u8>> {
    let table = json_map_to_toml(root, "")?;
    let content = toml::to_string_pretty(&table).map_err(|e| Error::Serialize {
        message: e.to_string(),
    })?;
    Ok(content.into_bytes())
}

/// Remove and return the object at `path`, leaving sibling keys untouched.
/// A missing path yields an empty map. Parents left empty by the removal are
/// removed too; `set_map_at_path` recreates them.
pub(crate) fn take_map_at_path(
    root: &mut Map<String, Value>,
    path: &[&str],
) -> Result<Map<String, Value>> {
    let Some((first, rest)) = path.split_first() else {
        return Ok(Map::new());
    };
    if rest.is_empty() {
        return match root.remove(*first) {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(value) => expect_object(value, first),
        };
    }
    let taken = match root.get_mut(*first) {
        None => return Ok(Map::new()),
        Some(Value::Object(inner)) => take_map_at_path(inner, rest)?,
        Some(_) => return Err(Error::invalid_field(*first, "expected an object")),
    };
    if matches!(root.get(*first), Some(Value::Object(inner)) if inner.is_empty()) {
        root.remove(*first);
    }
    Ok(taken)
}

/// Set the object at `path`, creating intermediate objects as needed.
pub(crate) fn set_map_at_path(
    root: &mut Map<String, Value>,
    path: &[&str],
    map: Map<String, Value>,
) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        return Ok(());
    };
    let mut current = root;
    for segment in parents {
        let next = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        match next {
            Value::Object(inner) => current = inner,
            _ => return Err(Error::invalid_field(*segment, "expected an object")),
        }
    }
    current.insert(last.to_string(), Value::Object(map));
    Ok(())
}

/// Single key of the object a TOML datetime travels as in the JSON
/// intermediate. Same marker the `toml` crate uses for its serde form.
const DATETIME_KEY: &str = "$__toml_private_datetime";

fn toml_to_json_value(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => {
            // serde_json::Number doesn't support NaN/Infinity, fall back to string
            serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string()))
        }
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => {
            let mut tagged = Map::new();
            tagged.insert(DATETIME_KEY.to_string(), Value::String(dt.to_string()));
            Value::Object(tagged)
        }
        toml::Value::Array(items) => {
            Value::Array(items.into_iter().map(toml_to_json_value).collect())
        }
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json_value(value)))
                .collect(),
        ),
    }
}

fn json_map_to_toml(map: &Map<String, Value>, path: &str) -> Result<toml::Table> {
    let mut table = toml::Table::new();
    for (key, value) in map {
        // TOML has no null; a null key is simply absent.
        if value.is_null() {
            continue;
        }
        let child = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        table.insert(key.clone(), json_to_toml_value(value, &child)?);
    }
    Ok(table)
}

fn json_to_toml_value(value: &Value, path: &str) -> Result<toml::Value> {
    match value {
        Value::Null => Err(Error::invalid_field(path, "null cannot be written to TOML")),
        Value::Bool(b) => Ok(toml::Value::Boolean(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(toml::Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(toml::Value::Float(f))
            } else {
                Err(Error::invalid_field(path, "number out of range for TOML"))
            }
        }
        Value::String(s) => Ok(toml::Value::String(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| json_to_toml_value(item, path))
            .collect::<Result<Vec<_>>>()
            .map(toml::Value::Array),
        Value::Object(obj) => match tagged_datetime(obj) {
            Some(text) => text
                .parse::<toml::value::Datetime>()
                .map(toml::Value::Datetime)
                .map_err(|err| Error::invalid_field(path, err.to_string())),
            None => json_map_to_toml(obj, path).map(toml::Value::Table),
        },
    }
}

fn tagged_datetime(obj: &Map<String, Value>) -> Option<&str> {
    if obj.len() != 1 {
        return None;
    }
    obj.get(DATETIME_KEY).and_then(Value::as_str)
}

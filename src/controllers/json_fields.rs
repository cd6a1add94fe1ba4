//! Lenient readers for JSON body fields. A value of the wrong type is
//! reported against its field instead of rejecting the whole body.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{FieldErrors, add_error};

const NOT_NULL: &str = "This field may not be null.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_NUMBER: &str = "A valid number is required.";

/// Keeps an explicit `null` apart from an absent field.
pub fn present<'de, D>(de: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(de).map(Some)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

pub fn integer(v: &Value) -> Result<i64, String> {
    match v {
        Value::Null => Err(NOT_NULL.to_string()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                // 4.0 is still a whole number
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| INVALID_INTEGER.to_string()),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| INVALID_INTEGER.to_string()),
        _ => Err(INVALID_INTEGER.to_string()),
    }
}

pub fn decimal(v: &Value) -> Result<Decimal, String> {
    match v {
        Value::Null => Err(NOT_NULL.to_string()),
        Value::Number(n) => n
            .to_string()
            .parse::<Decimal>()
            .map_err(|_| INVALID_NUMBER.to_string()),
        Value::String(s) => s.trim().parse::<Decimal>().map_err(|_| INVALID_NUMBER.to_string()),
        _ => Err(INVALID_NUMBER.to_string()),
    }
}

pub fn text(v: &Value) -> Result<String, String> {
    match v {
        Value::Null => Err(NOT_NULL.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err("Not a valid string.".to_string()),
    }
}

pub fn choice(v: &Value) -> Result<String, String> {
    match v {
        Value::Null => Err(NOT_NULL.to_string()),
        Value::String(s) => Ok(s.clone()),
        other => Err(format!("\"{other}\" is not a valid choice.")),
    }
}

/// A list of record ids. Every bad element gets its own message.
pub fn id_list(v: &Value) -> Result<Vec<i64>, Vec<String>> {
    let values = match v {
        Value::Array(values) => values,
        Value::Null => return Err(vec![NOT_NULL.to_string()]),
        other => {
            return Err(vec![format!(
                "Expected a list of items but got type \"{}\".",
                type_name(other)
            )]);
        }
    };

    let mut ids: Vec<i64> = Vec::with_capacity(values.len());
    let mut errs: Vec<String> = Vec::new();
    for item in values {
        let id = item
            .as_i64()
            .or_else(|| item.as_str().and_then(|s| s.trim().parse().ok()));
        match id {
            Some(id) => ids.push(id),
            None => errs.push(format!(
                "Incorrect type. Expected pk value, received {}.",
                type_name(item)
            )),
        }
    }

    if errs.is_empty() { Ok(ids) } else { Err(errs) }
}

/// Converts a present field, recording a failure under `field`.
pub fn take<T>(
    raw: Option<Value>,
    field: &str,
    rejected: &mut FieldErrors,
    convert: impl Fn(&Value) -> Result<T, String>,
) -> Option<T> {
    let raw = raw?;
    match convert(&raw) {
        Ok(v) => Some(v),
        Err(msg) => {
            add_error(rejected, field, msg);
            None
        }
    }
}

/// Like [`take`] for id lists.
pub fn take_ids(raw: Option<Value>, field: &str, rejected: &mut FieldErrors) -> Option<Vec<i64>> {
    let raw = raw?;
    match id_list(&raw) {
        Ok(ids) => Some(ids),
        Err(msgs) => {
            for msg in msgs {
                add_error(rejected, field, msg);
            }
            None
        }
    }
}

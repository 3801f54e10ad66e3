//! Row shaping.
//!
//! One generic row-to-JSON conversion used by every tool handler, plus the
//! currency rounding applied to money fields before serialization.

use serde_json::{json, Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row};

/// Convert a row into a JSON object.
///
/// If `columns` is non-empty, only the named columns are included; column
/// order follows the statement's select list. Values are decoded by probing
/// SQLite's storage classes in order and fall back to null.
pub fn row_to_json(row: &SqliteRow, columns: &[&str]) -> Value {
    let mut obj = Map::new();

    for col in row.columns() {
        let name = col.name();
        if !columns.is_empty() && !columns.contains(&name) {
            continue;
        }

        let value: Value = if let Ok(v) = row.try_get::<i64, _>(name) {
            json!(v)
        } else if let Ok(v) = row.try_get::<f64, _>(name) {
            json!(v)
        } else if let Ok(v) = row.try_get::<String, _>(name) {
            json!(v)
        } else if let Ok(v) = row.try_get::<Option<String>, _>(name) {
            match v {
                Some(s) => json!(s),
                None => Value::Null,
            }
        } else {
            Value::Null
        };

        obj.insert(name.to_string(), value);
    }

    Value::Object(obj)
}

/// Convert a row set into a JSON array of objects.
pub fn rows_to_json(rows: &[SqliteRow], columns: &[&str]) -> Value {
    Value::Array(rows.iter().map(|r| row_to_json(r, columns)).collect())
}

/// Round a currency value to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round the named numeric fields of an object (or each object of an array)
/// to two decimal places.
pub fn round_currency_fields(value: &mut Value, fields: &[&str]) {
    match value {
        Value::Array(items) => {
            for item in items {
                round_currency_fields(item, fields);
            }
        }
        Value::Object(obj) => {
            for field in fields {
                if let Some(v) = obj.get_mut(*field) {
                    if let Some(n) = v.as_f64() {
                        *v = json!(round2(n));
                    }
                }
            }
        }
        _ => {}
    }
}

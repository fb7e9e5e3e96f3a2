//! Field-level reading and writing of generic records.
//!
//! Conversion is explicit per field so every failure can name the field
//! path it happened at (e.g. `ingredients[2].unit`).

use super::GenericRecord;
use crate::error::{CookbookError, CookbookResult};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Number, Value};

/// Reads typed fields out of a [`GenericRecord`].
pub struct FieldReader<'a> {
    record: &'a GenericRecord,
    prefix: String,
}

impl<'a> FieldReader<'a> {
    pub fn new(record: &'a GenericRecord) -> Self {
        Self {
            record,
            prefix: String::new(),
        }
    }

    /// Reader for a record nested under `prefix` (used in error paths).
    pub fn nested(record: &'a GenericRecord, prefix: String) -> Self {
        Self { record, prefix }
    }

    /// Full path of `key` relative to the top-level record.
    pub fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    /// Rejects any key not listed in `known`.
    pub fn reject_unknown(&self, known: &[&str]) -> CookbookResult<()> {
        match self.record.keys().find(|k| !known.contains(&k.as_str())) {
            Some(key) => Err(CookbookError::invalid_field(
                self.path(key),
                "unrecognized field",
            )),
            None => Ok(()),
        }
    }

    /// Returns the raw value for `key`, treating an explicit null as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.record.get(key).filter(|v| !v.is_null())
    }

    fn mismatch(&self, key: &str, expected: &str, found: &Value) -> CookbookError {
        CookbookError::invalid_field(
            self.path(key),
            format!("expected {}, found {}", expected, type_name(found)),
        )
    }

    pub fn optional_i64(&self, key: &str) -> CookbookResult<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| self.mismatch(key, "integer", v)),
        }
    }

    /// Reads a number, keeping its integer or float representation.
    pub fn optional_number(&self, key: &str) -> CookbookResult<Option<Number>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.clone())),
            Some(v) => Err(self.mismatch(key, "number", v)),
        }
    }

    pub fn optional_string(&self, key: &str) -> CookbookResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(v) => Err(self.mismatch(key, "string", v)),
        }
    }

    /// Reads an epoch-milliseconds timestamp.
    pub fn optional_timestamp(&self, key: &str) -> CookbookResult<Option<DateTime<Utc>>> {
        match self.optional_i64(key)? {
            None => Ok(None),
            Some(millis) => Utc
                .timestamp_millis_opt(millis)
                .single()
                .map(Some)
                .ok_or_else(|| {
                    CookbookError::invalid_field(
                        self.path(key),
                        format!("timestamp {} is out of range", millis),
                    )
                }),
        }
    }

    pub fn optional_string_list(&self, key: &str) -> CookbookResult<Option<Vec<String>>> {
        let items = match self.get(key) {
            None => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(v) => return Err(self.mismatch(key, "array", v)),
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(CookbookError::invalid_field(
                    format!("{}[{}]", self.path(key), i),
                    format!("expected string, found {}", type_name(other)),
                )),
            })
            .collect::<CookbookResult<Vec<_>>>()
            .map(Some)
    }

    /// Reads an array of nested records, returning each with its field path.
    pub fn optional_record_list(
        &self,
        key: &str,
    ) -> CookbookResult<Option<Vec<(String, &'a GenericRecord)>>> {
        let items = match self.get(key) {
            None => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(v) => return Err(self.mismatch(key, "array", v)),
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let path = format!("{}[{}]", self.path(key), i);
                match item {
                    Value::Object(record) => Ok((path, record)),
                    other => Err(CookbookError::invalid_field(
                        path,
                        format!("expected object, found {}", type_name(other)),
                    )),
                }
            })
            .collect::<CookbookResult<Vec<_>>>()
            .map(Some)
    }
}

/// Inserts `value` under `key` when present.
pub fn put<T: Into<Value>>(record: &mut GenericRecord, key: &str, value: Option<T>) {
    if let Some(value) = value {
        record.insert(key.to_string(), value.into());
    }
}

pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::from(at.timestamp_millis())
}

/// Human-readable JSON type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> GenericRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_null_is_absent() {
        let r = record(json!({"name": null}));
        let reader = FieldReader::new(&r);
        assert_eq!(reader.optional_string("name").unwrap(), None);
    }

    #[test]
    fn test_type_mismatch_names_field() {
        let r = record(json!({"id": "seven"}));
        let err = FieldReader::new(&r).optional_i64("id").unwrap_err();
        assert_eq!(err.field(), Some("id"));
        assert!(err.to_string().contains("expected integer, found string"));
    }

    #[test]
    fn test_nested_path() {
        let r = record(json!({"quantity": true}));
        let reader = FieldReader::nested(&r, "ingredients[3]".to_string());
        let err = reader.optional_number("quantity").unwrap_err();
        assert_eq!(err.field(), Some("ingredients[3].quantity"));
    }

    #[test]
    fn test_string_list_reports_element() {
        let r = record(json!({"directions": ["chop", 4]}));
        let err = FieldReader::new(&r)
            .optional_string_list("directions")
            .unwrap_err();
        assert_eq!(err.field(), Some("directions[1]"));
    }

    #[test]
    fn test_reject_unknown() {
        let r = record(json!({"name": "Salt", "colour": "white"}));
        let err = FieldReader::new(&r)
            .reject_unknown(&["name"])
            .unwrap_err();
        assert_eq!(err.field(), Some("colour"));
    }

    #[test]
    fn test_number_keeps_representation() {
        let r = record(json!({"whole": 1, "float": 1.0, "fraction": 1.5}));
        let reader = FieldReader::new(&r);

        let whole = reader.optional_number("whole").unwrap().unwrap();
        let float = reader.optional_number("float").unwrap().unwrap();
        assert!(whole.is_i64());
        assert!(float.is_f64());
        assert_eq!(Value::from(float), json!(1.0));
        assert_eq!(
            reader.optional_number("fraction").unwrap().and_then(|n| n.as_f64()),
            Some(1.5)
        );
    }
}

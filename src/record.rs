use rusqlite::types::ValueRef;
use rusqlite::Row;
use serde_json::{Map, Number, Value};

use crate::error::{ConvertError, Result};

// One relational row decoded into named fields, paired positionally with the
// probed column list. Values stay as JSON values so arbitrary legacy columns
// survive into passthrough fields.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn from_row(columns: &[String], row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut fields = Map::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            fields.insert(column.clone(), json_value(row.get_ref(idx)?));
        }
        Ok(Self { fields })
    }

    pub fn from_pairs(pairs: Vec<(&str, Value)>) -> Self {
        let mut fields = Map::with_capacity(pairs.len());
        for (name, value) in pairs {
            fields.insert(name.to_string(), value);
        }
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    // Absence aborts the run rather than silently yielding an empty value.
    pub fn required(&self, table: &str, column: &str) -> Result<&Value> {
        self.fields
            .get(column)
            .ok_or_else(|| ConvertError::MissingField {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    // Legacy databases sometimes store extracted values with integer
    // affinity; rendering keeps them usable as map keys.
    pub fn required_str(&self, table: &str, column: &str) -> Result<String> {
        Ok(render_string(self.required(table, column)?))
    }

    pub fn str_or(&self, name: &str, default: &str) -> String {
        match self.fields.get(name) {
            Some(Value::Null) | None => default.to_string(),
            Some(value) => render_string(value),
        }
    }

    pub fn i64_or(&self, name: &str, default: i64) -> i64 {
        self.fields
            .get(name)
            .and_then(Value::as_i64)
            .unwrap_or(default)
    }

    // Defaulted only when the column is absent; a present null is legacy
    // data and passes through as null.
    pub fn value_or(&self, name: &str, default: Value) -> Value {
        match self.fields.get(name) {
            Some(value) => value.clone(),
            None => default,
        }
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

// Blobs render as lossy UTF-8: an undecodable byte must not abort the run or
// drop the rest of the row.
fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

fn render_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// Preserves the native type so integer source ids still match
// integer-affinity columns.
pub fn sql_value(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(*b as i64),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Sql::Integer(i)
            } else {
                Sql::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => Sql::Text(s.clone()),
        other => Sql::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_only_when_absent() {
        let record = Record::from_pairs(vec![
            ("file_name", json!("dump.txt")),
            ("imsi", Value::Null),
        ]);

        assert_eq!(record.str_or("file_name", "Unknown"), "dump.txt");
        assert_eq!(record.str_or("missing", "Unknown"), "Unknown");
        assert_eq!(record.str_or("imsi", "fallback"), "fallback");
        // A present null passes through raw accessors untouched.
        assert_eq!(record.value_or("imsi", json!("x")), Value::Null);
        assert_eq!(record.value_or("missing", json!("x")), json!("x"));
        assert_eq!(record.i64_or("missing", 7), 7);
    }

    #[test]
    fn required_field_absence_is_an_error() {
        let record = Record::from_pairs(vec![("id", json!(3))]);
        let err = record.required("phone_numbers", "phone_number").unwrap_err();
        assert!(matches!(
            err,
            crate::error::ConvertError::MissingField { .. }
        ));
    }

    #[test]
    fn required_str_renders_integer_affinity_values() {
        let record = Record::from_pairs(vec![("phone_number", json!(5550001))]);
        assert_eq!(
            record.required_str("phone_numbers", "phone_number").unwrap(),
            "5550001"
        );
    }

    #[test]
    fn sql_value_round_trips_native_types() {
        use rusqlite::types::Value as Sql;
        assert_eq!(sql_value(&json!(42)), Sql::Integer(42));
        assert_eq!(sql_value(&json!("src-1")), Sql::Text("src-1".to_string()));
        assert_eq!(sql_value(&Value::Null), Sql::Null);
    }
}

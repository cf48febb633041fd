//! Result frames
//!
//! A [`Frame`] is the tabular result of one query: typed fields of equal
//! length built from extracted [`Column`]s.

use chrono::DateTime;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use super::error::{QueryError, QueryResult};
use super::extract::Column;
use super::model::FieldType;

/// A typed result field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub values: Vec<Option<Value>>,
}

impl Field {
    /// Build a field from a column, detecting the type unless one was given.
    /// Values that cannot be converted to the field type become `None`.
    pub fn from_column(column: Column) -> Self {
        let field_type = column
            .field_type
            .unwrap_or_else(|| detect_field_type(&column.values));
        let values = column
            .values
            .into_iter()
            .map(|v| v.and_then(|v| convert_value(v, field_type)))
            .collect();

        Self {
            name: column.name,
            field_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Tabular result of one query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub ref_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub fields: Vec<Field>,
}

impl Frame {
    /// Assemble a frame; all columns must have the same length
    pub fn from_columns(ref_id: impl Into<String>, columns: Vec<Column>) -> QueryResult<Self> {
        let lengths: Vec<usize> = columns.iter().map(Column::len).collect();
        if lengths.windows(2).any(|w| w[0] != w[1]) {
            let detail = columns
                .iter()
                .map(|c| format!("{}={}", c.name, c.len()))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(QueryError::LengthMismatch(detail));
        }

        Ok(Self {
            ref_id: ref_id.into(),
            name: None,
            fields: columns.into_iter().map(Field::from_column).collect(),
        })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.fields.first().map(Field::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Split into one frame per distinct value of `field_name`, in order of
    /// first appearance. Each frame is named after its value.
    pub fn group_by(&self, field_name: &str) -> QueryResult<Vec<Frame>> {
        let key_field = self
            .field(field_name)
            .ok_or_else(|| QueryError::UnknownField(field_name.to_string()))?;

        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (row, value) in key_field.values.iter().enumerate() {
            let key = value.as_ref().map(display_value).unwrap_or_default();
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(row);
        }

        Ok(groups
            .into_iter()
            .map(|(key, rows)| Frame {
                ref_id: self.ref_id.clone(),
                name: Some(key),
                fields: self
                    .fields
                    .iter()
                    .map(|f| Field {
                        name: f.name.clone(),
                        field_type: f.field_type,
                        values: rows.iter().map(|&r| f.values[r].clone()).collect(),
                    })
                    .collect(),
            })
            .collect())
    }
}

/// Plain-text rendering of a value: strings unquoted, everything else as JSON
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Detect a field type from its present, non-null values
pub fn detect_field_type(values: &[Option<Value>]) -> FieldType {
    let present: Vec<&Value> = values.iter().flatten().filter(|v| !v.is_null()).collect();

    if present.is_empty() {
        FieldType::String
    } else if present.iter().all(|v| v.is_boolean()) {
        FieldType::Boolean
    } else if present.iter().all(|v| v.is_number()) {
        FieldType::Number
    } else if present
        .iter()
        .all(|v| v.as_str().is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()))
    {
        FieldType::Time
    } else {
        FieldType::String
    }
}

/// Convert a value to the representation of `field_type`. Time values become
/// epoch milliseconds.
fn convert_value(value: Value, field_type: FieldType) -> Option<Value> {
    if value.is_null() {
        return None;
    }

    match field_type {
        FieldType::String => Some(Value::String(display_value(&value))),
        FieldType::Number => match value {
            Value::Number(_) => Some(value),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            Value::Bool(b) => Some(Value::from(u8::from(b))),
            _ => None,
        },
        FieldType::Time => match value {
            Value::Number(_) => Some(value),
            Value::String(s) => DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| Value::from(dt.timestamp_millis())),
            _ => None,
        },
        FieldType::Boolean => match value {
            Value::Bool(_) => Some(value),
            Value::String(s) => match s.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            Value::Number(n) => n.as_f64().map(|f| Value::Bool(f != 0.0)),
            _ => None,
        },
    }
}

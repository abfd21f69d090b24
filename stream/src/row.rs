//! Rows handed to and produced by streams.

use indexmap::IndexMap;
use sqllike_core::Value;

/// One row: a mapping from field name to value, or a positional tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Fields in insertion order.
    Record(IndexMap<String, Value>),
    Tuple(Vec<Value>),
}

impl Row {
    /// Build a record from `(name, value)` pairs.
    pub fn record<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Row::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn tuple<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Row::Tuple(values.into_iter().map(Into::into).collect())
    }

    /// Field by name; tuples have no names.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Row::Record(fields) => fields.get(name),
            Row::Tuple(_) => None,
        }
    }

    /// Field by position.
    pub fn at(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Record(fields) => fields.get_index(index).map(|(_, v)| v),
            Row::Tuple(values) => values.get(index),
        }
    }

    /// Field names of a record.
    pub fn names(&self) -> Option<Vec<&str>> {
        match self {
            Row::Record(fields) => Some(fields.keys().map(String::as_str).collect()),
            Row::Tuple(_) => None,
        }
    }

    pub fn values(&self) -> Vec<Value> {
        match self {
            Row::Record(fields) => fields.values().cloned().collect(),
            Row::Tuple(values) => values.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Record(fields) => fields.len(),
            Row::Tuple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render as a JSON object (record) or array (tuple).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Row::Record(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Row::Tuple(values) => {
                serde_json::Value::Array(values.iter().map(Value::to_json).collect())
            }
        }
    }

    /// Read a row from a JSON object or array of scalars.
    pub fn from_json(json: &serde_json::Value) -> Option<Row> {
        match json {
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| Value::from_json(v).map(|v| (k.clone(), v)))
                .collect::<Option<IndexMap<_, _>>>()
                .map(Row::Record),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Row::Tuple),
            _ => None,
        }
    }
}

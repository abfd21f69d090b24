//! Schemas.
//!
//! A schema is the ordered, name-unique set of columns describing one row
//! shape. It is built once per stream and never edited afterwards.

use std::collections::HashMap;

use sqllike_core::{StreamId, Value, ValueKind};

use crate::{Column, ExprError, ExprResult};

/// A column descriptor for building a schema.
#[derive(Debug, Clone)]
pub enum ColumnSpec {
    /// An existing column, copied into the new schema.
    Existing(Column),
    /// A field of unknown type.
    Name(String),
    /// A field of a declared type.
    Typed(String, ValueKind),
}

impl ColumnSpec {
    /// Build the column this descriptor stands for.
    pub fn into_column(self) -> Column {
        match self {
            ColumnSpec::Existing(c) => c.copy(),
            ColumnSpec::Name(name) => Column::leaf(name, ValueKind::Unknown),
            ColumnSpec::Typed(name, kind) => Column::leaf(name, kind),
        }
    }
}

impl From<Column> for ColumnSpec {
    fn from(c: Column) -> Self {
        ColumnSpec::Existing(c)
    }
}

impl From<&Column> for ColumnSpec {
    fn from(c: &Column) -> Self {
        ColumnSpec::Existing(c.clone())
    }
}

impl From<&str> for ColumnSpec {
    fn from(name: &str) -> Self {
        ColumnSpec::Name(name.to_string())
    }
}

impl From<String> for ColumnSpec {
    fn from(name: String) -> Self {
        ColumnSpec::Name(name)
    }
}

impl From<(&str, ValueKind)> for ColumnSpec {
    fn from((name, kind): (&str, ValueKind)) -> Self {
        ColumnSpec::Typed(name.to_string(), kind)
    }
}

impl From<(String, ValueKind)> for ColumnSpec {
    fn from((name, kind): (String, ValueKind)) -> Self {
        ColumnSpec::Typed(name, kind)
    }
}

/// Ordered, name-unique columns owned by one stream.
#[derive(Debug, Clone)]
pub struct Schema {
    owner: StreamId,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Adopt `columns` on behalf of stream `owner`.
    pub fn new(owner: StreamId, columns: Vec<Column>) -> ExprResult<Self> {
        if columns.is_empty() {
            return Err(ExprError::SchemaEmpty);
        }
        let mut index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if index.insert(column.name().to_string(), i).is_some() {
                return Err(ExprError::duplicate_column(column.name()));
            }
        }
        for column in &columns {
            column.set_owner(Some(owner));
        }
        Ok(Self {
            owner,
            columns,
            index,
        })
    }

    pub fn owner(&self) -> StreamId {
        self.owner
    }

    /// Column by name.
    pub fn lookup(&self, name: &str) -> ExprResult<Column> {
        self.index
            .get(name)
            .map(|&i| self.columns[i].clone())
            .ok_or_else(|| ExprError::column_not_found(name))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    /// Bind one row of values, positionally, to the member columns.
    pub fn bind_values(&self, values: &[Value]) {
        for (column, value) in self.columns.iter().zip(values) {
            column.bind(value.clone());
        }
    }

    /// Compute every member column for the current bindings.
    pub fn compute_values(&self) -> ExprResult<Vec<Value>> {
        self.columns.iter().map(Column::compute).collect()
    }

    /// Clear the slots of the members and of the unowned nodes they are
    /// computed from. Nodes of other schemas are left to their own stream.
    pub fn reset_values(&self) {
        for column in &self.columns {
            column.reset_unowned();
        }
    }

    /// Render the schema as `number of columns=N` followed by each
    /// column's tree.
    pub fn explain(&self) -> String {
        let mut out = format!("number of columns={}\n", self.len());
        for column in &self.columns {
            out.push_str(&column.explain());
        }
        out
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

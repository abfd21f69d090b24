//! The union stage.
//!
//! A union emits every row of the left stream, then every row of the right
//! stream. Without schema merging both schemas must hold the same column
//! names; right rows are reordered into the left order. With merging the
//! output holds the shared columns in left order, then the left-only
//! columns, then the right-only ones, and each side's missing columns are
//! filled with NA.

use sqllike_core::{StreamId, Value};
use sqllike_expr::{Column, Schema};

use crate::operators::log_stage;
use crate::{RowStream, StageKind, StreamError, StreamResult};

impl RowStream {
    /// All rows of this stream followed by all rows of `other`.
    pub fn union(self, other: RowStream, merge_schema: bool) -> StreamResult<RowStream> {
        let left = self.schema();
        let right = other.schema();
        let columns: Vec<Column> = if merge_schema {
            let shared = left.iter().filter(|c| right.contains(c.name()));
            let left_only = left.iter().filter(|c| !right.contains(c.name()));
            let right_only = right.iter().filter(|c| !left.contains(c.name()));
            shared.chain(left_only).chain(right_only).map(Column::copy).collect()
        } else {
            check_same_columns(left, right)?;
            left.iter().map(Column::copy).collect()
        };
        let outputs = Schema::new(StreamId::next(), columns)?;
        log_stage(StageKind::Union, &self, &outputs);

        // Where each left column's value sits in a right row.
        let left_from_right = left.iter().map(|c| right.position(c.name())).collect();
        let options = self.options().clone();
        let driver = Union {
            left: self,
            right: other,
            left_from_right,
            outputs: outputs.clone(),
            phase: Phase::Left,
        };
        Ok(RowStream::from_parts(outputs, options, Box::new(driver)))
    }
}

fn check_same_columns(left: &Schema, right: &Schema) -> StreamResult<()> {
    if left.len() != right.len() {
        return Err(StreamError::SchemaLengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    let mut left_names = left.names();
    let mut right_names = right.names();
    left_names.sort();
    right_names.sort();
    if left_names != right_names {
        return Err(StreamError::SchemaColumnMismatch {
            left: left_names,
            right: right_names,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Left,
    Right,
    Done,
}

struct Union {
    left: RowStream,
    right: RowStream,
    left_from_right: Vec<Option<usize>>,
    outputs: Schema,
    phase: Phase,
}

impl Union {
    fn emit_left(&self, values: &[Value]) -> StreamResult<Vec<Value>> {
        self.left.bind(values);
        self.right.bind(&vec![Value::Na; self.right.schema().len()]);
        Ok(self.outputs.compute_values()?)
    }

    fn emit_right(&self, values: &[Value]) -> StreamResult<Vec<Value>> {
        self.right.bind(values);
        let left_values: Vec<Value> = self
            .left_from_right
            .iter()
            .map(|pos| pos.and_then(|i| values.get(i).cloned()).unwrap_or(Value::Na))
            .collect();
        self.left.bind(&left_values);
        Ok(self.outputs.compute_values()?)
    }

    fn finish(&mut self) {
        self.phase = Phase::Done;
        self.left.schema().reset_values();
        self.right.schema().reset_values();
    }
}

impl Iterator for Union {
    type Item = StreamResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.phase {
                Phase::Left => match self.left.next_values() {
                    Some(Ok(values)) => return Some(self.emit_left(&values)),
                    Some(Err(e)) => return Some(Err(e)),
                    None => self.phase = Phase::Right,
                },
                Phase::Right => match self.right.next_values() {
                    Some(Ok(values)) => return Some(self.emit_right(&values)),
                    Some(Err(e)) => return Some(Err(e)),
                    None => {
                        self.finish();
                        return None;
                    }
                },
                Phase::Done => return None,
            }
        }
    }
}

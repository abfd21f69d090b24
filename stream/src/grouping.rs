//! The group stage.
//!
//! Grouping sorts the input on its keys, then splits it into runs of
//! consecutive rows with equal keys. Each run yields one row: keys and
//! scalar columns take the run's first row, aggregates reduce the values
//! their input expression takes over the whole run.

use std::cmp::Ordering;
use std::ops::Range;

use sqllike_core::{StreamId, Value};
use sqllike_expr::{validate_aggregate_expression, Column, ExprError, ExprResult, Schema};
use tracing::trace;

use crate::operators::{log_stage, materialize_keyed, sort_keyed};
use crate::{RowStream, StageKind, StreamResult};

impl RowStream {
    /// One row per distinct key tuple.
    ///
    /// Output columns are copies of `keys`, then `computed` in order. Every
    /// key must be a column of this stream. A computed entry is either a
    /// bare aggregate over this stream's columns or a scalar expression,
    /// which takes its value from the first row of each group.
    pub fn group(self, keys: &[Column], computed: &[(&str, Column)]) -> StreamResult<RowStream> {
        for key in keys {
            if key.owner() != Some(self.id()) {
                return Err(ExprError::schema_mismatch(key.name(), self.id().to_string()).into());
            }
        }
        for (_, expr) in computed {
            validate_aggregate_expression(expr, self.id())?;
        }
        let mut columns: Vec<Column> = keys.iter().map(Column::copy).collect();
        columns.extend(computed.iter().map(|(name, expr)| expr.renamed(*name)));
        let outputs = Schema::new(StreamId::next(), columns)?;
        log_stage(StageKind::Group, &self, &outputs);

        let aggregates = outputs
            .iter()
            .filter_map(|c| c.aggregate_input().map(|input| (c.clone(), input.clone())))
            .collect();
        let options = self.options().clone();
        let driver = Group {
            upstream: self,
            keys: keys.to_vec(),
            aggregates,
            outputs: outputs.clone(),
            state: GroupState::Pending,
        };
        Ok(RowStream::from_parts(outputs, options, Box::new(driver)))
    }
}

enum GroupState {
    Pending,
    Emitting {
        rows: Vec<Vec<Value>>,
        partitions: std::vec::IntoIter<Range<usize>>,
    },
    Done,
}

struct Group {
    upstream: RowStream,
    keys: Vec<Column>,
    /// Aggregate output columns with the expression each reduces.
    aggregates: Vec<(Column, Column)>,
    outputs: Schema,
    state: GroupState,
}

/// Split key-sorted rows into runs of equal keys.
fn partition(keys: &[Vec<Value>]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for i in 1..=keys.len() {
        if i == keys.len() || Value::cmp_keys(&keys[start], &keys[i]) != Ordering::Equal {
            if start < i {
                ranges.push(start..i);
            }
            start = i;
        }
    }
    ranges
}

impl Group {
    fn load(&mut self) -> StreamResult<()> {
        let mut keyed = materialize_keyed(&mut self.upstream, &self.keys)?;
        sort_keyed(&mut keyed, true);
        let (keys, rows): (Vec<_>, Vec<_>) = keyed.into_iter().unzip();
        let partitions = partition(&keys);
        trace!(
            stream = %self.outputs.owner(),
            rows = rows.len(),
            groups = partitions.len(),
            "input partitioned"
        );
        self.state = GroupState::Emitting {
            rows,
            partitions: partitions.into_iter(),
        };
        Ok(())
    }
}

/// Compute the output row of one group.
fn emit(
    upstream: &RowStream,
    aggregates: &[(Column, Column)],
    outputs: &Schema,
    rows: &[Vec<Value>],
) -> ExprResult<Vec<Value>> {
    let mut collections: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); aggregates.len()];
    for values in rows {
        upstream.bind(values);
        for ((_, input), collection) in aggregates.iter().zip(collections.iter_mut()) {
            collection.push(input.evaluate()?);
        }
    }
    for ((output, _), collection) in aggregates.iter().zip(collections) {
        output.bind_group(collection);
    }
    if let Some(first) = rows.first() {
        upstream.bind(first);
    }
    outputs.compute_values()
}

impl Iterator for Group {
    type Item = StreamResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let GroupState::Pending = self.state {
            if let Err(e) = self.load() {
                self.state = GroupState::Done;
                return Some(Err(e));
            }
        }
        let GroupState::Emitting { rows, partitions } = &mut self.state else {
            return None;
        };
        match partitions.next() {
            Some(range) => {
                trace!(stream = %self.outputs.owner(), rows = range.len(), "group emitted");
                let group = &rows[range];
                Some(emit(&self.upstream, &self.aggregates, &self.outputs, group).map_err(Into::into))
            }
            None => {
                self.state = GroupState::Done;
                self.upstream.schema().reset_values();
                None
            }
        }
    }
}

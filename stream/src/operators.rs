//! Project, filter and sort stages.
//!
//! Each stage validates its expressions against the receiving stream when
//! it is built, adopts copies of the columns it emits into a new schema,
//! and returns a stream driven by one of the drivers below.

use sqllike_core::{StreamId, Value};
use sqllike_expr::{validate_scalar_expression, Column, ExprError, ExprResult, Schema};
use tracing::{debug, trace};

use crate::{RowStream, StageKind, StreamResult};

impl RowStream {
    /// Keep columns of this stream and add computed ones.
    ///
    /// Output columns are `keep` in order, then `computed` in order. Every
    /// kept column must belong to this stream.
    pub fn project(self, keep: &[Column], computed: &[(&str, Column)]) -> StreamResult<RowStream> {
        for column in keep {
            if column.owner() != Some(self.id()) {
                return Err(
                    ExprError::schema_mismatch(column.name(), self.id().to_string()).into(),
                );
            }
        }
        for (_, expr) in computed {
            validate_scalar_expression(expr, self.id())?;
        }
        let mut columns: Vec<Column> = keep.iter().map(Column::copy).collect();
        columns.extend(computed.iter().map(|(name, expr)| expr.renamed(*name)));
        let outputs = Schema::new(StreamId::next(), columns)?;
        log_stage(StageKind::Project, &self, &outputs);

        let options = self.options().clone();
        let driver = Project {
            upstream: self,
            outputs: outputs.clone(),
        };
        Ok(RowStream::from_parts(outputs, options, Box::new(driver)))
    }

    /// Keep the rows where `predicate` is truthy.
    pub fn filter(self, predicate: &Column) -> StreamResult<RowStream> {
        self.build_filter(predicate, false)
    }

    /// Like `filter`, with the predicate appended as a last column.
    pub fn filter_with_predicate(self, predicate: &Column) -> StreamResult<RowStream> {
        self.build_filter(predicate, true)
    }

    fn build_filter(self, predicate: &Column, append: bool) -> StreamResult<RowStream> {
        validate_scalar_expression(predicate, self.id())?;
        let mut columns: Vec<Column> = self.schema().iter().map(Column::copy).collect();
        if append {
            columns.push(predicate.copy());
        }
        let outputs = Schema::new(StreamId::next(), columns)?;
        log_stage(StageKind::Filter, &self, &outputs);

        let options = self.options().clone();
        let driver = Filter {
            upstream: self,
            predicate: predicate.clone(),
            outputs: outputs.clone(),
        };
        Ok(RowStream::from_parts(outputs, options, Box::new(driver)))
    }

    /// Sort rows on `keys`, compared left to right.
    ///
    /// The whole input is read before the first row is emitted. Rows with
    /// equal keys keep their input order, in either direction.
    pub fn sort(self, keys: &[Column], ascending: bool) -> StreamResult<RowStream> {
        for key in keys {
            validate_scalar_expression(key, self.id())?;
        }
        let columns: Vec<Column> = self.schema().iter().map(Column::copy).collect();
        let outputs = Schema::new(StreamId::next(), columns)?;
        log_stage(StageKind::Sort, &self, &outputs);

        let options = self.options().clone();
        let driver = Sort {
            upstream: self,
            keys: keys.to_vec(),
            ascending,
            outputs: outputs.clone(),
            state: SortState::Pending,
        };
        Ok(RowStream::from_parts(outputs, options, Box::new(driver)))
    }
}

pub(crate) fn log_stage(kind: StageKind, upstream: &RowStream, outputs: &Schema) {
    debug!(
        stage = kind.keyword(),
        upstream = %upstream.id(),
        stream = %outputs.owner(),
        columns = ?outputs.names(),
        "stage built"
    );
}

/// Read the whole upstream, pairing each row with its key values.
pub(crate) fn materialize_keyed(
    upstream: &mut RowStream,
    keys: &[Column],
) -> StreamResult<Vec<(Vec<Value>, Vec<Value>)>> {
    let mut rows = Vec::new();
    while let Some(values) = upstream.next_values() {
        let values = values?;
        upstream.bind(&values);
        let key = keys
            .iter()
            .map(Column::evaluate)
            .collect::<ExprResult<Vec<_>>>()?;
        rows.push((key, values));
    }
    trace!(stream = %upstream.id(), rows = rows.len(), "input materialized");
    Ok(rows)
}

/// Stable sort of keyed rows.
pub(crate) fn sort_keyed(rows: &mut [(Vec<Value>, Vec<Value>)], ascending: bool) {
    rows.sort_by(|a, b| {
        let ord = Value::cmp_keys(&a.0, &b.0);
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}

struct Project {
    upstream: RowStream,
    outputs: Schema,
}

impl Iterator for Project {
    type Item = StreamResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = match self.upstream.next_values()? {
            Ok(values) => values,
            Err(e) => return Some(Err(e)),
        };
        self.upstream.bind(&values);
        Some(self.outputs.compute_values().map_err(Into::into))
    }
}

struct Filter {
    upstream: RowStream,
    predicate: Column,
    outputs: Schema,
}

impl Filter {
    fn accept(&self, values: &[Value]) -> StreamResult<Option<Vec<Value>>> {
        self.upstream.bind(values);
        if !self.predicate.evaluate()?.is_truthy() {
            return Ok(None);
        }
        Ok(Some(self.outputs.compute_values()?))
    }
}

impl Iterator for Filter {
    type Item = StreamResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let values = match self.upstream.next_values() {
                Some(Ok(values)) => values,
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.predicate.reset_unowned();
                    return None;
                }
            };
            match self.accept(&values) {
                Ok(Some(row)) => return Some(Ok(row)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

enum SortState {
    Pending,
    Emitting(std::vec::IntoIter<Vec<Value>>),
    Done,
}

struct Sort {
    upstream: RowStream,
    keys: Vec<Column>,
    ascending: bool,
    outputs: Schema,
    state: SortState,
}

impl Sort {
    fn load(&mut self) -> StreamResult<()> {
        let mut rows = materialize_keyed(&mut self.upstream, &self.keys)?;
        sort_keyed(&mut rows, self.ascending);
        let sorted: Vec<Vec<Value>> = rows.into_iter().map(|(_, values)| values).collect();
        self.state = SortState::Emitting(sorted.into_iter());
        Ok(())
    }
}

impl Iterator for Sort {
    type Item = StreamResult<Vec<Value>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let SortState::Pending = self.state {
            if let Err(e) = self.load() {
                self.state = SortState::Done;
                return Some(Err(e));
            }
        }
        let SortState::Emitting(rows) = &mut self.state else {
            return None;
        };
        match rows.next() {
            Some(values) => {
                self.upstream.bind(&values);
                Some(self.outputs.compute_values().map_err(Into::into))
            }
            None => {
                self.state = SortState::Done;
                self.upstream.schema().reset_values();
                None
            }
        }
    }
}

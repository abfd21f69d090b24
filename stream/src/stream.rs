//! The row stream.
//!
//! A stream owns a schema and a source of value vectors in schema order.
//! Sources are either the caller's rows, checked against the schema, or a
//! stage driver pulling from upstream streams. When the source is
//! exhausted, or fails, the stream closes: the schema's slots are reset and
//! every later call yields `None`.

use std::fmt;

use indexmap::IndexMap;
use sqllike_core::{StreamId, Value, ValueKind};
use sqllike_expr::{Column, ColumnSpec, Schema};
use tracing::{debug, trace};

use crate::{Row, RowFormat, StreamError, StreamOptions, StreamResult};

pub(crate) type Source = Box<dyn Iterator<Item = StreamResult<Vec<Value>>>>;

/// A lazy, single-pass producer of rows bound to one schema.
pub struct RowStream {
    id: StreamId,
    schema: Schema,
    names: Vec<String>,
    options: StreamOptions,
    source: Source,
    produced: usize,
    closed: bool,
}

impl RowStream {
    /// Build a stream over caller rows with the given column descriptors.
    ///
    /// Records are matched to columns by name and tuples by position.
    /// Field values are checked against the declared column kinds as the
    /// rows are read.
    pub fn new<S, I>(
        specs: impl IntoIterator<Item = S>,
        rows: I,
        options: StreamOptions,
    ) -> StreamResult<Self>
    where
        S: Into<ColumnSpec>,
        I: IntoIterator<Item = Row>,
        I::IntoIter: 'static,
    {
        let id = StreamId::next();
        let columns: Vec<Column> = specs
            .into_iter()
            .map(|s| s.into().into_column())
            .collect();
        let schema = Schema::new(id, columns)?;
        let fields: Vec<(String, ValueKind)> = schema
            .iter()
            .map(|c| (c.name().to_string(), c.declared_kind()))
            .collect();
        debug!(stream = %id, columns = ?schema.names(), "source stream built");
        let source = rows.into_iter().map(move |row| read_row(&fields, row));
        Ok(Self::from_parts(schema, options, Box::new(source)))
    }

    /// Build a stream whose schema is inferred from the first row.
    ///
    /// The first row must be a record; its field names and value kinds
    /// become the columns.
    pub fn infer<I>(rows: I, options: StreamOptions) -> StreamResult<Self>
    where
        I: IntoIterator<Item = Row>,
        I::IntoIter: 'static,
    {
        let mut rows = rows.into_iter();
        let first = rows
            .next()
            .ok_or_else(|| StreamError::schema_inference("no rows to infer columns from"))?;
        let specs: Vec<ColumnSpec> = match &first {
            Row::Record(fields) => fields
                .iter()
                .map(|(name, value)| ColumnSpec::Typed(name.clone(), ValueKind::of(value)))
                .collect(),
            Row::Tuple(_) => {
                return Err(StreamError::schema_inference(
                    "the first row is a tuple and has no field names",
                ))
            }
        };
        Self::new(specs, std::iter::once(first).chain(rows), options)
    }

    pub(crate) fn from_parts(schema: Schema, options: StreamOptions, source: Source) -> Self {
        Self {
            id: schema.owner(),
            names: schema.names(),
            schema,
            options,
            source,
            produced: 0,
            closed: false,
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &StreamOptions {
        &self.options
    }

    /// Column names in schema order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column by name, for building expressions over this stream.
    pub fn column(&self, name: &str) -> StreamResult<Column> {
        Ok(self.schema.lookup(name)?)
    }

    /// Columns by name, in the order given.
    pub fn columns(&self, names: &[&str]) -> StreamResult<Vec<Column>> {
        names.iter().map(|n| self.column(n)).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of rows produced so far.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Switch the shape of the rows this stream yields.
    pub fn with_format(mut self, row_format: RowFormat) -> Self {
        self.options.row_format = row_format;
        self
    }

    /// Render the schema's expression trees.
    pub fn explain(&self) -> String {
        self.schema.explain()
    }

    /// Drain the stream.
    pub fn collect_rows(self) -> StreamResult<Vec<Row>> {
        self.collect()
    }

    /// Stop the stream and clear its schema's value slots.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.source = Box::new(std::iter::empty());
        self.schema.reset_values();
        debug!(stream = %self.id, rows = self.produced, "stream closed");
    }

    /// Next row as values in schema order.
    pub(crate) fn next_values(&mut self) -> Option<StreamResult<Vec<Value>>> {
        if self.closed {
            return None;
        }
        match self.source.next() {
            Some(Ok(values)) => {
                self.produced += 1;
                trace!(stream = %self.id, row = self.produced, "row produced");
                Some(Ok(values))
            }
            Some(Err(e)) => {
                debug!(stream = %self.id, error = %e, "stream failed");
                self.close();
                Some(Err(e))
            }
            None => {
                self.close();
                None
            }
        }
    }

    /// Bind one row of this stream's values to its columns.
    pub(crate) fn bind(&self, values: &[Value]) {
        self.schema.bind_values(values);
    }

    fn make_row(&self, values: Vec<Value>) -> Row {
        match self.options.row_format {
            RowFormat::Record => Row::Record(
                self.names
                    .iter()
                    .cloned()
                    .zip(values)
                    .collect::<IndexMap<_, _>>(),
            ),
            RowFormat::Tuple => Row::Tuple(values),
        }
    }
}

impl Iterator for RowStream {
    type Item = StreamResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_values()
            .map(|values| values.map(|v| self.make_row(v)))
    }
}

impl fmt::Debug for RowStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream")
            .field("id", &self.id)
            .field("columns", &self.names)
            .field("options", &self.options)
            .field("produced", &self.produced)
            .field("closed", &self.closed)
            .finish()
    }
}

fn read_row(fields: &[(String, ValueKind)], row: Row) -> StreamResult<Vec<Value>> {
    let values = match row {
        Row::Record(mut record) => fields
            .iter()
            .map(|(name, _)| {
                record
                    .swap_remove(name)
                    .ok_or_else(|| StreamError::missing_field(name))
            })
            .collect::<StreamResult<Vec<_>>>()?,
        Row::Tuple(values) => {
            if values.len() != fields.len() {
                return Err(StreamError::RowWidth {
                    expected: fields.len(),
                    got: values.len(),
                });
            }
            values
        }
    };
    for ((name, kind), value) in fields.iter().zip(&values) {
        if !kind.admits(value) {
            return Err(StreamError::field_type(name, kind.name(), value.type_name()));
        }
    }
    Ok(values)
}

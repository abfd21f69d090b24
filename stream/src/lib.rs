//! SQLLike Row Streams
//!
//! A row stream is a lazy, single-pass producer of rows bound to one schema.
//! Every pipeline stage consumes a stream and returns a new one whose
//! production drives the old: for each upstream row it binds the upstream
//! columns, then computes its own.
//!
//! Stages:
//! - `project`: keep and compute columns, one row per input row
//! - `filter`: keep the rows where a predicate is truthy
//! - `sort`: stable sort on key expressions (materializes its input)
//! - `group`: one row per distinct key, with aggregates (materializes)
//! - `union`: the rows of two streams, optionally merging their schemas

mod error;
mod grouping;
mod operators;
mod options;
mod row;
pub mod stage;
mod stream;
mod union;

pub use error::{StreamError, StreamResult};
pub use options::{RowFormat, StreamOptions};
pub use row::Row;
pub use stage::{Cardinality, StageKind};
pub use stream::RowStream;

//! SQLLike Expression Graph
//!
//! Column expressions are nodes of an acyclic dependency graph. Leaves are
//! bound to row fields by a driving stream, constants carry a fixed value,
//! and interior nodes apply a scalar or aggregate operator to their parents.
//!
//! This crate provides:
//! - The operator taxonomy (`ScalarOp`, `AggregateOp`, caller `Function`s)
//! - Column nodes with their builder methods (`Column`)
//! - Iterative evaluation and construction-time validation
//! - Schemas: ordered, name-unique sets of columns owned by one stream
//! - The operator symbol table consumed by code generators

mod aggregate;
mod error;
mod eval;
mod node;
mod operator;
mod schema;
pub mod symbols;

pub use aggregate::AggregateOp;
pub use error::{ExprError, ExprResult};
pub use eval::{validate_aggregate_expression, validate_scalar_expression};
pub use node::{Column, NodeKind, Operand, Slot, DEFAULT_NAME};
pub use operator::{Arity, Function, ScalarOp};
pub use schema::{ColumnSpec, Schema};

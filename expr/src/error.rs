//! Expression error types.

use sqllike_core::ValueError;
use thiserror::Error;

/// Errors raised while building or evaluating column expressions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    /// A schema was built with no columns.
    #[error("schema must contain at least one column")]
    SchemaEmpty,

    /// Two columns of one schema share a name.
    #[error("duplicate column '{name}' in schema")]
    DuplicateColumn { name: String },

    /// No column with this name in the schema.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    /// An expression uses a column that does not belong to the stream.
    #[error("schema mismatch: column '{column}' does not belong to stream {stream}")]
    SchemaMismatch { column: String, stream: String },

    /// Operator applied to the wrong number of operands.
    #[error("operator '{op}' expects {expected} operand(s), got {got}")]
    OperatorArity {
        op: String,
        expected: String,
        got: usize,
    },

    /// Operand that cannot become a column.
    #[error("operand of '{op}' is not a column: {found}")]
    NonColumnOperand { op: String, found: String },

    /// Leaf read before a value was bound for the current row.
    #[error("column '{name}' has no value bound")]
    UnboundLeaf { name: String },

    /// Operator failed on the evaluated operands.
    #[error("cannot evaluate column '{column}': {source}")]
    Evaluation {
        column: String,
        #[source]
        source: ValueError,
    },

    /// Aggregate composed with further operators, or used as a scalar.
    #[error("operation not allowed: {message}")]
    NotAllowedOperation { message: String },

    /// Aggregate evaluated without a group collection.
    #[error("aggregate column '{name}' has no group bound")]
    EmptyGroup { name: String },
}

impl ExprError {
    pub fn duplicate_column(name: impl Into<String>) -> Self {
        Self::DuplicateColumn { name: name.into() }
    }

    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    pub fn schema_mismatch(column: impl Into<String>, stream: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            column: column.into(),
            stream: stream.into(),
        }
    }

    pub fn operator_arity(op: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        Self::OperatorArity {
            op: op.into(),
            expected: expected.into(),
            got,
        }
    }

    pub fn non_column_operand(op: impl Into<String>, found: impl Into<String>) -> Self {
        Self::NonColumnOperand {
            op: op.into(),
            found: found.into(),
        }
    }

    pub fn unbound_leaf(name: impl Into<String>) -> Self {
        Self::UnboundLeaf { name: name.into() }
    }

    pub fn evaluation(column: impl Into<String>, source: ValueError) -> Self {
        Self::Evaluation {
            column: column.into(),
            source,
        }
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::NotAllowedOperation {
            message: message.into(),
        }
    }

    pub fn empty_group(name: impl Into<String>) -> Self {
        Self::EmptyGroup { name: name.into() }
    }
}

/// Result type for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;

//! Stream error types.

use sqllike_expr::ExprError;
use thiserror::Error;

/// Errors raised while building or iterating row streams.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// Expression or schema failure.
    #[error(transparent)]
    Expr(#[from] ExprError),

    /// Union of schemas with different numbers of columns.
    #[error("cannot union schemas of {left} and {right} columns")]
    SchemaLengthMismatch { left: usize, right: usize },

    /// Union of schemas with different column names.
    #[error("cannot union schemas with columns {left:?} and {right:?}")]
    SchemaColumnMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },

    /// No schema given and none can be inferred from the rows.
    #[error("cannot infer schema: {message}")]
    SchemaInference { message: String },

    /// A record lacks a schema field.
    #[error("row is missing field '{field}'")]
    MissingField { field: String },

    /// A tuple's width differs from the schema's.
    #[error("row has {got} fields, schema has {expected}")]
    RowWidth { expected: usize, got: usize },

    /// A field value does not fit its declared column kind.
    #[error("field '{field}' expects {expected}, got {found}")]
    FieldType {
        field: String,
        expected: String,
        found: String,
    },
}

impl StreamError {
    pub fn schema_inference(message: impl Into<String>) -> Self {
        Self::SchemaInference {
            message: message.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn field_type(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::FieldType {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result type for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;

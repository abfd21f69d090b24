//! Value-level error types.

use thiserror::Error;

/// Errors raised by arithmetic and comparison over values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// The operator is not defined for this pair of value kinds.
    #[error("type mismatch: cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        op: String,
        left: String,
        right: String,
    },

    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Operand value out of the operator's domain.
    #[error("invalid operand for '{op}': {message}")]
    InvalidOperand { op: String, message: String },
}

impl ValueError {
    pub fn type_mismatch(
        op: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            op: op.into(),
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn invalid_operand(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOperand {
            op: op.into(),
            message: message.into(),
        }
    }
}

/// Result type for value operations.
pub type ValueResult<T> = Result<T, ValueError>;

//! Declared column kinds.

use std::fmt;
use std::str::FromStr;

use crate::Value;

/// The declared type of a column.
///
/// Besides the value kinds, a column may be of unknown type (declared by
/// name only) or carry the result of a caller-supplied function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Str,
    Long,
    Na,
    Unknown,
    Function,
}

impl ValueKind {
    /// The kind of a concrete value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Na => ValueKind::Na,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Long(_) => ValueKind::Long,
        }
    }

    /// Short lowercase name, as printed in schema dumps.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::Long => "long",
            ValueKind::Na => "NA",
            ValueKind::Unknown => "unknown",
            ValueKind::Function => "func",
        }
    }

    /// Whether a field value fits a column of this kind.
    ///
    /// NA fits every column. Integers widen into float and long columns.
    /// Columns inferred from a missing value, of unknown type or produced by
    /// a function accept anything.
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Na) => true,
            (ValueKind::Unknown | ValueKind::Na | ValueKind::Function, _) => true,
            (ValueKind::Int, Value::Int(_)) => true,
            (ValueKind::Float, Value::Float(_) | Value::Int(_)) => true,
            (ValueKind::Long, Value::Long(_) | Value::Int(_)) => true,
            (ValueKind::Str, Value::Str(_)) => true,
            _ => false,
        }
    }

    /// Result kind of an arithmetic operator over two operand kinds.
    pub fn promote(left: ValueKind, right: ValueKind) -> ValueKind {
        use ValueKind::*;
        match (left, right) {
            (Int, Int) => Int,
            (Int | Long, Int | Long) => Long,
            (Float, Int | Long | Float) | (Int | Long, Float) => Float,
            (Str, Str) => Str,
            _ => Unknown,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ValueKind::Int),
            "float" => Ok(ValueKind::Float),
            "str" => Ok(ValueKind::Str),
            "long" => Ok(ValueKind::Long),
            "NA" | "na" => Ok(ValueKind::Na),
            "unknown" | "any" => Ok(ValueKind::Unknown),
            "func" | "function" => Ok(ValueKind::Function),
            other => Err(format!("unknown column kind '{}'", other)),
        }
    }
}

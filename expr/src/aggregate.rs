//! Aggregate operators.
//!
//! Aggregates consume the collection of values an expression took over the
//! rows of one group, rather than a tuple of operands.

use std::fmt;

use sqllike_core::{Value, ValueKind, ValueResult};

/// Group-level operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    /// Number of values in the group.
    Len,
    /// Arithmetic mean; NA for an empty group.
    Avg,
    /// Sum; `0` for an empty group.
    Sum,
    Min,
    Max,
}

impl AggregateOp {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateOp::Len => "len",
            AggregateOp::Avg => "avg",
            AggregateOp::Sum => "sum",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
        }
    }

    /// Textual form; aggregates are written as calls.
    pub fn symbol(&self) -> &'static str {
        self.name()
    }

    /// Resolve an aggregate by name. `count` is an alias of `len`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "len" | "count" => Some(AggregateOp::Len),
            "avg" => Some(AggregateOp::Avg),
            "sum" => Some(AggregateOp::Sum),
            "min" => Some(AggregateOp::Min),
            "max" => Some(AggregateOp::Max),
            _ => None,
        }
    }

    pub fn result_kind(&self, input: ValueKind) -> ValueKind {
        match self {
            AggregateOp::Len => ValueKind::Int,
            AggregateOp::Avg => ValueKind::Float,
            AggregateOp::Sum | AggregateOp::Min | AggregateOp::Max => input,
        }
    }

    /// Reduce a group's collection to one value.
    ///
    /// NA anywhere in the collection makes every aggregate but `len` NA.
    pub fn apply(&self, values: &[Value]) -> ValueResult<Value> {
        match self {
            AggregateOp::Len => Ok(Value::Int(values.len() as i64)),
            _ if values.iter().any(Value::is_na) => Ok(Value::Na),
            AggregateOp::Sum => compute_sum(values),
            AggregateOp::Avg => {
                if values.is_empty() {
                    return Ok(Value::Na);
                }
                compute_sum(values)?.div(&Value::Int(values.len() as i64))
            }
            AggregateOp::Min => compute_extreme(values, Value::lt),
            AggregateOp::Max => compute_extreme(values, Value::gt),
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn compute_sum(values: &[Value]) -> ValueResult<Value> {
    values
        .iter()
        .try_fold(Value::Int(0), |acc, v| acc.add(v))
}

fn compute_extreme(
    values: &[Value],
    better: impl Fn(&Value, &Value) -> ValueResult<Value>,
) -> ValueResult<Value> {
    let mut best: Option<&Value> = None;
    for v in values {
        best = match best {
            Some(current) if !better(v, current)?.is_truthy() => Some(current),
            _ => Some(v),
        };
    }
    Ok(best.cloned().unwrap_or(Value::Na))
}

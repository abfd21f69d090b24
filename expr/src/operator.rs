//! Scalar operators.
//!
//! A scalar operator is a pure function over the already-evaluated values of
//! a node's parents. Operators never see columns, only values.

use std::fmt;
use std::rc::Rc;

use sqllike_core::{Value, ValueError, ValueKind, ValueResult};

/// Number of operands an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == *n,
            Arity::AtLeast(n) => count >= *n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "at least {}", n),
        }
    }
}

type FunctionBody = dyn Fn(&[Value]) -> ValueResult<Value>;

/// A named, caller-supplied pure function usable as a column operator.
#[derive(Clone)]
pub struct Function {
    name: String,
    arity: usize,
    body: Rc<FunctionBody>,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        arity: usize,
        body: impl Fn(&[Value]) -> ValueResult<Value> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            body: Rc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, args: &[Value]) -> ValueResult<Value> {
        (self.body)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity == other.arity
    }
}

/// Row-level operators.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarOp {
    /// Identity; the operator of a copied column.
    Id,
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Neg,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    Func(Function),
}

impl ScalarOp {
    /// Name of the operator in the symbol table.
    pub fn name(&self) -> &str {
        match self {
            ScalarOp::Id => "id",
            ScalarOp::Add => "add",
            ScalarOp::Sub => "sub",
            ScalarOp::Mul => "mul",
            ScalarOp::Div => "div",
            ScalarOp::FloorDiv => "floordiv",
            ScalarOp::Mod => "mod",
            ScalarOp::Pow => "pow",
            ScalarOp::Neg => "neg",
            ScalarOp::Eq => "eq",
            ScalarOp::Ne => "ne",
            ScalarOp::Lt => "lt",
            ScalarOp::Le => "le",
            ScalarOp::Gt => "gt",
            ScalarOp::Ge => "ge",
            ScalarOp::And => "and",
            ScalarOp::Or => "or",
            ScalarOp::Not => "not",
            ScalarOp::Func(f) => f.name(),
        }
    }

    /// Textual form of the operator.
    pub fn symbol(&self) -> &str {
        match self {
            ScalarOp::Id => "=",
            ScalarOp::Add => "+",
            ScalarOp::Sub | ScalarOp::Neg => "-",
            ScalarOp::Mul => "*",
            ScalarOp::Div => "/",
            ScalarOp::FloorDiv => "//",
            ScalarOp::Mod => "%",
            ScalarOp::Pow => "**",
            ScalarOp::Eq => "==",
            ScalarOp::Ne => "!=",
            ScalarOp::Lt => "<",
            ScalarOp::Le => "<=",
            ScalarOp::Gt => ">",
            ScalarOp::Ge => ">=",
            ScalarOp::And => "and",
            ScalarOp::Or => "or",
            ScalarOp::Not => "not",
            ScalarOp::Func(f) => f.name(),
        }
    }

    /// Whether the operator may take a group result as an operand.
    /// Comparisons and connectives may; arithmetic and functions may not.
    pub fn accepts_group_results(&self) -> bool {
        matches!(
            self,
            ScalarOp::Id
                | ScalarOp::Eq
                | ScalarOp::Ne
                | ScalarOp::Lt
                | ScalarOp::Le
                | ScalarOp::Gt
                | ScalarOp::Ge
                | ScalarOp::And
                | ScalarOp::Or
                | ScalarOp::Not
        )
    }

    pub fn arity(&self) -> Arity {
        match self {
            ScalarOp::Add | ScalarOp::Mul => Arity::AtLeast(1),
            ScalarOp::Id | ScalarOp::Neg | ScalarOp::Not => Arity::Exactly(1),
            ScalarOp::Func(f) => Arity::Exactly(f.arity()),
            _ => Arity::Exactly(2),
        }
    }

    /// Declared kind of a node applying this operator to operands of the
    /// given kinds.
    pub fn result_kind(&self, operands: &[ValueKind]) -> ValueKind {
        let first = operands.first().copied().unwrap_or(ValueKind::Unknown);
        match self {
            ScalarOp::Id | ScalarOp::Neg => first,
            ScalarOp::Add
            | ScalarOp::Sub
            | ScalarOp::Mul
            | ScalarOp::FloorDiv
            | ScalarOp::Mod
            | ScalarOp::Pow => operands
                .iter()
                .skip(1)
                .fold(first, |acc, k| ValueKind::promote(acc, *k)),
            ScalarOp::Div => ValueKind::Float,
            ScalarOp::Eq
            | ScalarOp::Ne
            | ScalarOp::Lt
            | ScalarOp::Le
            | ScalarOp::Gt
            | ScalarOp::Ge
            | ScalarOp::And
            | ScalarOp::Or
            | ScalarOp::Not => ValueKind::Int,
            ScalarOp::Func(_) => ValueKind::Function,
        }
    }

    /// Apply the operator to evaluated operand values.
    pub fn apply(&self, args: &[Value]) -> ValueResult<Value> {
        match self {
            ScalarOp::Id => Ok(unary(self, args)?.clone()),
            ScalarOp::Neg => unary(self, args)?.neg(),
            ScalarOp::Not => Ok(unary(self, args)?.not()),
            ScalarOp::Add => fold(self, args, Value::add),
            ScalarOp::Mul => fold(self, args, Value::mul),
            ScalarOp::Sub => binary(self, args, Value::sub),
            ScalarOp::Div => binary(self, args, Value::div),
            ScalarOp::FloorDiv => binary(self, args, Value::floor_div),
            ScalarOp::Mod => binary(self, args, Value::rem),
            ScalarOp::Pow => binary(self, args, Value::pow),
            ScalarOp::Lt => binary(self, args, Value::lt),
            ScalarOp::Le => binary(self, args, Value::le),
            ScalarOp::Gt => binary(self, args, Value::gt),
            ScalarOp::Ge => binary(self, args, Value::ge),
            ScalarOp::Eq => binary(self, args, |a, b| Ok(a.eq_value(b))),
            ScalarOp::Ne => binary(self, args, |a, b| Ok(a.ne_value(b))),
            ScalarOp::And => binary(self, args, |a, b| Ok(a.and(b))),
            ScalarOp::Or => binary(self, args, |a, b| Ok(a.or(b))),
            ScalarOp::Func(f) => {
                if args.len() != f.arity() {
                    return Err(arity_error(self, args.len()));
                }
                f.call(args)
            }
        }
    }
}

impl fmt::Display for ScalarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

fn arity_error(op: &ScalarOp, got: usize) -> ValueError {
    ValueError::invalid_operand(
        op.symbol(),
        format!("expected {} operand(s), got {}", op.arity(), got),
    )
}

fn unary<'a>(op: &ScalarOp, args: &'a [Value]) -> ValueResult<&'a Value> {
    match args {
        [a] => Ok(a),
        _ => Err(arity_error(op, args.len())),
    }
}

fn binary(
    op: &ScalarOp,
    args: &[Value],
    f: impl Fn(&Value, &Value) -> ValueResult<Value>,
) -> ValueResult<Value> {
    match args {
        [a, b] => f(a, b),
        _ => Err(arity_error(op, args.len())),
    }
}

fn fold(
    op: &ScalarOp,
    args: &[Value],
    f: impl Fn(&Value, &Value) -> ValueResult<Value>,
) -> ValueResult<Value> {
    let (first, rest) = args
        .split_first()
        .ok_or_else(|| arity_error(op, 0))?;
    rest.iter().try_fold(first.clone(), |acc, v| f(&acc, v))
}

//! Operator symbol table.
//!
//! Code generators translating pipelines into another language need each
//! operator's textual form and how it is written. The table is the single
//! place listing them.

use crate::{AggregateOp, ScalarOp};

/// How an operator is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// `a + b`
    Infix,
    /// `-a`, `not a`
    Prefix,
    /// `len(a)`
    Call,
}

/// Whether an operator works on row values or group collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Scalar,
    Aggregate,
}

/// One entry of the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub name: &'static str,
    pub text: &'static str,
    pub notation: Notation,
    pub class: OperatorClass,
}

const fn scalar(name: &'static str, text: &'static str, notation: Notation) -> Symbol {
    Symbol {
        name,
        text,
        notation,
        class: OperatorClass::Scalar,
    }
}

const fn aggregate(name: &'static str) -> Symbol {
    Symbol {
        name,
        text: name,
        notation: Notation::Call,
        class: OperatorClass::Aggregate,
    }
}

static SYMBOLS: &[Symbol] = &[
    scalar("id", "=", Notation::Prefix),
    scalar("mul", "*", Notation::Infix),
    scalar("add", "+", Notation::Infix),
    scalar("sub", "-", Notation::Infix),
    scalar("div", "/", Notation::Infix),
    scalar("floordiv", "//", Notation::Infix),
    scalar("mod", "%", Notation::Infix),
    scalar("pow", "**", Notation::Infix),
    scalar("neg", "-", Notation::Prefix),
    scalar("eq", "==", Notation::Infix),
    scalar("ne", "!=", Notation::Infix),
    scalar("lt", "<", Notation::Infix),
    scalar("le", "<=", Notation::Infix),
    scalar("gt", ">", Notation::Infix),
    scalar("ge", ">=", Notation::Infix),
    scalar("or", "or", Notation::Infix),
    scalar("and", "and", Notation::Infix),
    scalar("not", "not", Notation::Prefix),
    aggregate("len"),
    aggregate("count"),
    aggregate("avg"),
    aggregate("sum"),
    aggregate("min"),
    aggregate("max"),
];

/// Every built-in operator.
pub fn symbol_table() -> &'static [Symbol] {
    SYMBOLS
}

/// Find an operator by name.
pub fn lookup(name: &str) -> Option<&'static Symbol> {
    SYMBOLS.iter().find(|s| s.name == name)
}

const FUNCTION: Symbol = Symbol {
    name: "func",
    text: "func",
    notation: Notation::Call,
    class: OperatorClass::Scalar,
};

/// Symbol of a scalar operator. Caller functions are written as calls.
pub fn of_scalar(op: &ScalarOp) -> Symbol {
    match op {
        ScalarOp::Func(_) => FUNCTION,
        other => lookup(other.name()).copied().unwrap_or(FUNCTION),
    }
}

/// Symbol of an aggregate operator.
pub fn of_aggregate(op: AggregateOp) -> Symbol {
    lookup(op.name()).copied().unwrap_or_else(|| aggregate(op.name()))
}

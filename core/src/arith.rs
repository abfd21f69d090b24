//! Arithmetic, comparison and boolean operators over values.
//!
//! Every operator is NA-absorbing: if either operand is NA the result is NA.
//! Integer arithmetic that overflows i64 continues in a big integer.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::{Value, ValueError, ValueResult};

/// Longest string a repetition may produce, in bytes.
pub const MAX_REPEAT_LEN: usize = 1 << 30;

fn repeat_str(s: &str, count: i64) -> ValueResult<String> {
    let count = usize::try_from(count.max(0))
        .map_err(|_| ValueError::invalid_operand("*", "repeat count too large"))?;
    match s.len().checked_mul(count) {
        Some(len) if len <= MAX_REPEAT_LEN => Ok(s.repeat(count)),
        _ => Err(ValueError::invalid_operand("*", "repeat count too large")),
    }
}

impl Value {
    /// `self + other`. Strings concatenate.
    pub fn add(&self, other: &Value) -> ValueResult<Value> {
        match (self, other) {
            (Value::Na, _) | (_, Value::Na) => Ok(Value::Na),
            (Value::Int(a), Value::Int(b)) => Ok(a
                .checked_add(*b)
                .map(Value::Int)
                .unwrap_or_else(|| Value::Long(BigInt::from(*a) + BigInt::from(*b)))),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
            _ => self.numeric(other, "+", |a, b| Ok(a + b), |a, b| Ok(a + b)),
        }
    }

    /// `self - other`.
    pub fn sub(&self, other: &Value) -> ValueResult<Value> {
        match (self, other) {
            (Value::Na, _) | (_, Value::Na) => Ok(Value::Na),
            (Value::Int(a), Value::Int(b)) => Ok(a
                .checked_sub(*b)
                .map(Value::Int)
                .unwrap_or_else(|| Value::Long(BigInt::from(*a) - BigInt::from(*b)))),
            _ => self.numeric(other, "-", |a, b| Ok(a - b), |a, b| Ok(a - b)),
        }
    }

    /// `self * other`. A string times an integer repeats the string.
    pub fn mul(&self, other: &Value) -> ValueResult<Value> {
        match (self, other) {
            (Value::Na, _) | (_, Value::Na) => Ok(Value::Na),
            (Value::Int(a), Value::Int(b)) => Ok(a
                .checked_mul(*b)
                .map(Value::Int)
                .unwrap_or_else(|| Value::Long(BigInt::from(*a) * BigInt::from(*b)))),
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                repeat_str(s, *n).map(Value::Str)
            }
            _ => self.numeric(other, "*", |a, b| Ok(a * b), |a, b| Ok(a * b)),
        }
    }

    /// True division, always a float.
    pub fn div(&self, other: &Value) -> ValueResult<Value> {
        if self.is_na() || other.is_na() {
            return Ok(Value::Na);
        }
        let (a, b) = self.float_pair(other, "/")?;
        if b == 0.0 {
            return Err(ValueError::DivisionByZero);
        }
        Ok(Value::Float(a / b))
    }

    /// Floor division; the quotient is rounded toward negative infinity.
    pub fn floor_div(&self, other: &Value) -> ValueResult<Value> {
        match (self, other) {
            (Value::Na, _) | (_, Value::Na) => Ok(Value::Na),
            (Value::Int(_), Value::Int(0)) => Err(ValueError::DivisionByZero),
            (Value::Int(a), Value::Int(b)) => match a.checked_div(*b) {
                Some(q) => Ok(Value::Int(if a % b != 0 && ((a < &0) != (b < &0)) {
                    q - 1
                } else {
                    q
                })),
                None => Ok(Value::Long(-BigInt::from(*a))),
            },
            _ => self.numeric(
                other,
                "//",
                |a, b| a.div_floor_big(b),
                |a, b| {
                    if b == 0.0 {
                        Err(ValueError::DivisionByZero)
                    } else {
                        Ok((a / b).floor())
                    }
                },
            ),
        }
    }

    /// Modulo; the result takes the sign of the divisor.
    pub fn rem(&self, other: &Value) -> ValueResult<Value> {
        match (self, other) {
            (Value::Na, _) | (_, Value::Na) => Ok(Value::Na),
            (Value::Int(_), Value::Int(0)) => Err(ValueError::DivisionByZero),
            (Value::Int(a), Value::Int(b)) => {
                let r = a.checked_rem(*b).unwrap_or(0);
                Ok(Value::Int(if r != 0 && ((r < 0) != (*b < 0)) { r + b } else { r }))
            }
            _ => self.numeric(
                other,
                "%",
                |a, b| a.mod_floor_big(b),
                |a, b| {
                    if b == 0.0 {
                        return Err(ValueError::DivisionByZero);
                    }
                    let r = a % b;
                    Ok(if r != 0.0 && ((r < 0.0) != (b < 0.0)) { r + b } else { r })
                },
            ),
        }
    }

    /// `self ** other`. A negative integer exponent yields a float.
    pub fn pow(&self, other: &Value) -> ValueResult<Value> {
        match (self, other) {
            (Value::Na, _) | (_, Value::Na) => Ok(Value::Na),
            (Value::Int(_) | Value::Long(_), Value::Int(e)) if *e >= 0 => {
                let exp = u32::try_from(*e)
                    .map_err(|_| ValueError::invalid_operand("**", "exponent too large"))?;
                if let Value::Int(base) = self {
                    if let Some(p) = base.checked_pow(exp) {
                        return Ok(Value::Int(p));
                    }
                }
                let base = self.to_bigint().unwrap_or_default();
                Ok(Value::Long(base.pow(exp)))
            }
            _ => {
                let (a, b) = self.float_pair(other, "**")?;
                Ok(Value::Float(a.powf(b)))
            }
        }
    }

    /// Arithmetic negation.
    pub fn neg(&self) -> ValueResult<Value> {
        match self {
            Value::Na => Ok(Value::Na),
            Value::Int(i) => Ok(i
                .checked_neg()
                .map(Value::Int)
                .unwrap_or_else(|| Value::Long(-BigInt::from(*i)))),
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Long(l) => Ok(Value::Long(-l)),
            Value::Str(_) => Err(ValueError::invalid_operand("-", "cannot negate a str")),
        }
    }

    /// Equality; values of unrelated kinds are simply unequal.
    pub fn eq_value(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Na, _) | (_, Value::Na) => Value::Na,
            (Value::Str(a), Value::Str(b)) => Value::from_bool(a == b),
            _ => Value::from_bool(self.cmp_numeric(other) == Some(Ordering::Equal)),
        }
    }

    /// Inequality, the negation of `eq_value`.
    pub fn ne_value(&self, other: &Value) -> Value {
        match self.eq_value(other) {
            Value::Na => Value::Na,
            eq => Value::from_bool(!eq.is_truthy()),
        }
    }

    /// `self < other`.
    pub fn lt(&self, other: &Value) -> ValueResult<Value> {
        self.ordered(other, "<", |o| o == Ordering::Less)
    }

    /// `self <= other`.
    pub fn le(&self, other: &Value) -> ValueResult<Value> {
        self.ordered(other, "<=", |o| o != Ordering::Greater)
    }

    /// `self > other`.
    pub fn gt(&self, other: &Value) -> ValueResult<Value> {
        self.ordered(other, ">", |o| o == Ordering::Greater)
    }

    /// `self >= other`.
    pub fn ge(&self, other: &Value) -> ValueResult<Value> {
        self.ordered(other, ">=", |o| o != Ordering::Less)
    }

    /// Boolean conjunction over truthiness.
    pub fn and(&self, other: &Value) -> Value {
        if self.is_na() || other.is_na() {
            return Value::Na;
        }
        Value::from_bool(self.is_truthy() && other.is_truthy())
    }

    /// Boolean disjunction over truthiness.
    pub fn or(&self, other: &Value) -> Value {
        if self.is_na() || other.is_na() {
            return Value::Na;
        }
        Value::from_bool(self.is_truthy() || other.is_truthy())
    }

    /// Boolean negation over truthiness.
    pub fn not(&self) -> Value {
        if self.is_na() {
            return Value::Na;
        }
        Value::from_bool(!self.is_truthy())
    }

    fn ordered(
        &self,
        other: &Value,
        op: &str,
        test: impl Fn(Ordering) -> bool,
    ) -> ValueResult<Value> {
        match (self, other) {
            (Value::Na, _) | (_, Value::Na) => Ok(Value::Na),
            (Value::Str(a), Value::Str(b)) => Ok(Value::from_bool(test(a.cmp(b)))),
            _ if self.is_numeric() && other.is_numeric() => Ok(Value::from_bool(
                self.cmp_numeric(other).map(test).unwrap_or(false),
            )),
            _ => Err(ValueError::type_mismatch(
                op,
                self.type_name(),
                other.type_name(),
            )),
        }
    }

    /// Shared numeric dispatch once the Int/Int fast path is ruled out:
    /// any float operand computes in f64, otherwise in big integers.
    fn numeric(
        &self,
        other: &Value,
        op: &str,
        big: impl Fn(BigInt, BigInt) -> ValueResult<BigInt>,
        float: impl Fn(f64, f64) -> ValueResult<f64>,
    ) -> ValueResult<Value> {
        if self.is_float() || other.is_float() {
            let (a, b) = self.float_pair(other, op)?;
            return float(a, b).map(Value::Float);
        }
        match (self.to_bigint(), other.to_bigint()) {
            (Some(a), Some(b)) => big(a, b).map(Value::Long),
            _ => Err(ValueError::type_mismatch(
                op,
                self.type_name(),
                other.type_name(),
            )),
        }
    }

    fn float_pair(&self, other: &Value, op: &str) -> ValueResult<(f64, f64)> {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(ValueError::type_mismatch(
                op,
                self.type_name(),
                other.type_name(),
            )),
        }
    }
}

/// Floored division and modulo for big integers.
trait FloorOps: Sized {
    fn div_floor_big(self, other: Self) -> ValueResult<Self>;
    fn mod_floor_big(self, other: Self) -> ValueResult<Self>;
}

impl FloorOps for BigInt {
    fn div_floor_big(self, other: Self) -> ValueResult<Self> {
        if other.is_zero() {
            return Err(ValueError::DivisionByZero);
        }
        let q = &self / &other;
        let r = &self % &other;
        if !r.is_zero() && (r.is_negative() != other.is_negative()) {
            Ok(q - 1)
        } else {
            Ok(q)
        }
    }

    fn mod_floor_big(self, other: Self) -> ValueResult<Self> {
        if other.is_zero() {
            return Err(ValueError::DivisionByZero);
        }
        let r = &self % &other;
        if !r.is_zero() && (r.is_negative() != other.is_negative()) {
            Ok(r + other)
        } else {
            Ok(r)
        }
    }
}

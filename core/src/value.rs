//! Value types for SQLLike rows.
//!
//! Values are the atomic data flowing through a row stream. The domain is
//! closed: a value is an integer, a float, a string, a big integer or the
//! missing-value sentinel `NA`. There is no boolean kind; predicates yield
//! `Int(1)` or `Int(0)`.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

/// A value that can be stored in a row field or a column slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value. Absorbing under every operator.
    Na,
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Arbitrary precision integer.
    Long(BigInt),
}

impl Value {
    /// Returns true if this is the missing value.
    pub fn is_na(&self) -> bool {
        matches!(self, Value::Na)
    }

    /// Returns true if this is an integer value.
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Returns true if this is a float value.
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Returns true if this is a string value.
    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Returns true if this is a big integer value.
    pub fn is_long(&self) -> bool {
        matches!(self, Value::Long(_))
    }

    /// Returns true for any of the numeric kinds.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Long(_))
    }

    /// Get as integer if this is an Int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float if this is a Float value.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string reference if this is a Str value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as big integer reference if this is a Long value.
    pub fn as_long(&self) -> Option<&BigInt> {
        match self {
            Value::Long(l) => Some(l),
            _ => None,
        }
    }

    /// Numeric value widened to f64, for any numeric kind.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Long(l) => l.to_f64(),
            _ => None,
        }
    }

    /// Integer value widened to a big integer, for Int and Long.
    pub fn to_bigint(&self) -> Option<BigInt> {
        match self {
            Value::Int(i) => Some(BigInt::from(*i)),
            Value::Long(l) => Some(l.clone()),
            _ => None,
        }
    }

    /// Encode a predicate outcome.
    pub fn from_bool(b: bool) -> Self {
        Value::Int(b as i64)
    }

    /// Truthiness used by filters and boolean connectives.
    ///
    /// Non-zero numbers and non-empty strings are truthy, NA is not.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Na => false,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Long(l) => !l.is_zero(),
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Na => "NA",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Long(_) => "long",
        }
    }

    /// Compare two numeric values, across kinds.
    ///
    /// Returns None when either side is not numeric, or for NaN.
    pub fn cmp_numeric(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Long(a), Value::Long(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Long(b)) => Some(BigInt::from(*a).cmp(b)),
            (Value::Long(a), Value::Int(b)) => Some(a.cmp(&BigInt::from(*b))),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Float(a), _) => other.as_f64().and_then(|b| a.partial_cmp(&b)),
            (_, Value::Float(b)) => self.as_f64().and_then(|a| a.partial_cmp(b)),
            _ => None,
        }
    }

    /// Compare values for sorting and grouping.
    ///
    /// The order is total: NA sorts first, then numbers (compared across
    /// kinds), then NaN, then strings. All NaNs are equal to each other.
    pub fn cmp_sortable(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Na, Value::Na) => Ordering::Equal,
            (Value::Na, _) => Ordering::Less,
            (_, Value::Na) => Ordering::Greater,
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Str(_), _) => Ordering::Greater,
            (_, Value::Str(_)) => Ordering::Less,
            _ => match (self.is_nan(), other.is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.cmp_numeric(other).unwrap_or(Ordering::Equal),
            },
        }
    }

    /// True for a float NaN.
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_nan())
    }

    /// Compare two key tuples lexicographically with `cmp_sortable`.
    pub fn cmp_keys(a: &[Value], b: &[Value]) -> Ordering {
        for (x, y) in a.iter().zip(b.iter()) {
            let ord = x.cmp_sortable(y);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.len().cmp(&b.len())
    }

    /// Render as JSON for diagnostics and fixtures.
    ///
    /// NA becomes null and big integers become decimal strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Na => serde_json::Value::Null,
            Value::Int(i) => serde_json::json!(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Long(l) => serde_json::Value::String(l.to_string()),
        }
    }

    /// Read a JSON scalar back into a value.
    ///
    /// Booleans become `Int(1)`/`Int(0)`. Arrays and objects have no
    /// counterpart in the value domain and yield None.
    pub fn from_json(json: &serde_json::Value) -> Option<Value> {
        match json {
            serde_json::Value::Null => Some(Value::Na),
            serde_json::Value::Bool(b) => Some(Value::from_bool(*b)),
            serde_json::Value::String(s) => Some(Value::Str(s.clone())),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Value::Long(BigInt::from(u)))
                } else {
                    n.as_f64().map(Value::Float)
                }
            }
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Na => write!(f, "NA"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{:?}", fl),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Long(l) => write!(f, "{}L", l),
        }
    }
}

// Convenient From implementations
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<BigInt> for Value {
    fn from(l: BigInt) -> Self {
        Value::Long(l)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Na)
    }
}

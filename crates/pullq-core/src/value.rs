//! Dynamic value model shared by every layer of the engine.
//!
//! Elements flowing through sequences, keys stored in the associative store,
//! and results produced by selectors are all `Value`s. The scalar variants
//! (`Null`, `Bool`, `Int`, `Float`, `Str`) compare by value; the structured
//! variants (`Record`, `Array`, `Seq`, `Grouping`) are reference-counted and
//! compare by identity under the default policy, so two structurally equal
//! records are distinct keys unless the caller supplies a policy saying
//! otherwise.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::seq::{Grouping, Sequence};

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Record(Rc<Vec<(String, Value)>>),
    Array(Rc<Vec<Value>>),
    Seq(Sequence),
    Grouping(Rc<Grouping>),
}

impl Value {
    pub fn record(fields: Vec<(String, Value)>) -> Value {
        Value::Record(Rc::new(fields))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(items))
    }

    /// True for the scalar key domain: numbers, strings, booleans, null.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        )
    }

    /// Field access on records; `None` for everything else.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Rank used to order values of different variants; numbers share a rank
    /// so `Int` and `Float` compare numerically across the divide.
    pub(crate) fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::Array(_) => 4,
            Value::Record(_) => 5,
            Value::Seq(_) => 6,
            Value::Grouping(_) => 7,
        }
    }
}

/// Default equality: loose, value-based for scalars, identity-based for
/// structured values.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    use Value::*;
    match (a, b) {
        (Null, Null) => true,
        (Bool(x), Bool(y)) => x == y,
        (Int(x), Int(y)) => x == y,
        (Float(x), Float(y)) => x == y,
        (Int(x), Float(y)) | (Float(y), Int(x)) => (*x as f64) == *y,
        (Str(x), Str(y)) => x == y,
        (Record(x), Record(y)) => Rc::ptr_eq(x, y),
        (Array(x), Array(y)) => Rc::ptr_eq(x, y),
        (Seq(x), Seq(y)) => x.same_definition(y),
        (Grouping(x), Grouping(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// Default total order.
///
/// Numbers compare numerically across `Int`/`Float` with NaN sorted last;
/// values of different variants order by rank. Records and arrays compare
/// structurally so sorting over them is deterministic; sequences and
/// groupings carry no orderable state and rank equal among themselves.
pub fn total_cmp(a: &Value, b: &Value) -> Ordering {
    use Value::*;
    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Bool(x), Bool(y)) => x.cmp(y),
        (Int(x), Int(y)) => x.cmp(y),
        (Str(x), Str(y)) => x.cmp(y),
        (Int(_), Float(_)) | (Float(_), Int(_)) | (Float(_), Float(_)) => {
            // Both sides are numeric here; as_f64 cannot miss.
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            float_cmp(x, y)
        }
        (Array(x), Array(y)) => seq_of_values_cmp(x, y),
        (Record(x), Record(y)) => record_cmp(x, y),
        (Seq(_), Seq(_)) | (Grouping(_), Grouping(_)) => Ordering::Equal,
        _ => a.type_rank().cmp(&b.type_rank()),
    }
}

/// NaN sorts last so ordered output stays deterministic.
fn float_cmp(x: f64, y: f64) -> Ordering {
    if x.is_nan() && y.is_nan() {
        Ordering::Equal
    } else if x.is_nan() {
        Ordering::Greater
    } else if y.is_nan() {
        Ordering::Less
    } else {
        x.partial_cmp(&y).unwrap_or(Ordering::Equal)
    }
}

fn seq_of_values_cmp(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match total_cmp(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

fn record_cmp(a: &[(String, Value)], b: &[(String, Value)]) -> Ordering {
    for ((na, va), (nb, vb)) in a.iter().zip(b.iter()) {
        match na.cmp(nb) {
            Ordering::Equal => {}
            other => return other,
        }
        match total_cmp(va, vb) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

// Loose equality doubles as PartialEq so tests and callers can use `==`
// directly; note this is identity for structured values.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        loose_eq(self, other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (n, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", n, v)?;
                }
                write!(f, "}}")
            }
            Value::Seq(_) => write!(f, "<sequence>"),
            Value::Grouping(g) => write!(f, "<grouping {}>", g.key()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Int(i) => write!(f, "Int({})", i),
            Value::Float(x) => write!(f, "Float({})", x),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Array(_) | Value::Record(_) => write!(f, "{}", self),
            Value::Seq(_) => write!(f, "Seq(<deferred>)"),
            Value::Grouping(g) => write!(f, "Grouping(key: {})", g.key()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

//! Eager reductions over a sequence.
//!
//! Every method here runs the sequence to completion (or to the first
//! witness, for the quantifiers) on a fresh cursor, so the sequence itself
//! stays reusable. Numeric folds stay integral while they can and promote
//! to float on overflow or on the first float input.

use pullq_core::error::{Error, Result};
use pullq_core::policy::EqualityPolicy;
use pullq_core::seq::Sequence;
use pullq_core::value::{loose_eq, total_cmp, Value};
use std::cmp::Ordering;

pub trait AggregateOps {
    /// Folds the sequence with its first element as the seed.
    /// Fails with `InvalidState` on an empty sequence.
    fn aggregate(&self, f: impl Fn(Value, &Value) -> Value) -> Result<Value>;

    /// Folds the sequence from an explicit seed.
    fn aggregate_seed(&self, seed: Value, f: impl Fn(Value, &Value) -> Value) -> Value;

    /// Folds from a seed, then maps the final accumulator.
    fn aggregate_seed_result(
        &self,
        seed: Value,
        f: impl Fn(Value, &Value) -> Value,
        result: impl Fn(Value) -> Value,
    ) -> Value;

    fn count(&self) -> usize;
    fn count_where(&self, predicate: impl Fn(&Value) -> bool) -> usize;

    /// Numeric sum; an empty sequence sums to `Int(0)`.
    fn sum(&self) -> Value;
    fn sum_by(&self, selector: impl Fn(&Value) -> Value) -> Value;

    fn min(&self) -> Result<Value>;
    fn min_by(&self, selector: impl Fn(&Value) -> Value) -> Result<Value>;
    fn max(&self) -> Result<Value>;
    fn max_by(&self, selector: impl Fn(&Value) -> Value) -> Result<Value>;

    /// Arithmetic mean as a float; `InvalidState` on an empty sequence.
    fn average(&self) -> Result<Value>;
    fn average_by(&self, selector: impl Fn(&Value) -> Value) -> Result<Value>;

    /// True if the sequence has at least one element.
    fn any(&self) -> bool;
    fn any_where(&self, predicate: impl Fn(&Value) -> bool) -> bool;
    /// True if the predicate holds for every element (vacuously on empty).
    fn all(&self, predicate: impl Fn(&Value) -> bool) -> bool;

    fn contains(&self, value: &Value, policy: Option<EqualityPolicy>) -> bool;

    /// True if both sequences yield equal elements in the same order and
    /// exhaust together.
    fn sequence_equal(&self, second: &Sequence, policy: Option<EqualityPolicy>) -> bool;

    /// Runs the callback for every element, with its position.
    fn each(&self, f: impl FnMut(&Value, usize));
}

impl AggregateOps for Sequence {
    fn aggregate(&self, f: impl Fn(Value, &Value) -> Value) -> Result<Value> {
        let mut cur = self.cursor();
        if !cur.advance() {
            return Err(Error::InvalidState);
        }
        let mut acc = cur.read()?;
        while cur.advance() {
            let v = cur.read()?;
            acc = f(acc, &v);
        }
        Ok(acc)
    }

    fn aggregate_seed(&self, seed: Value, f: impl Fn(Value, &Value) -> Value) -> Value {
        let mut acc = seed;
        let mut cur = self.cursor();
        while cur.advance() {
            if let Ok(v) = cur.read() {
                acc = f(acc, &v);
            }
        }
        acc
    }

    fn aggregate_seed_result(
        &self,
        seed: Value,
        f: impl Fn(Value, &Value) -> Value,
        result: impl Fn(Value) -> Value,
    ) -> Value {
        result(self.aggregate_seed(seed, f))
    }

    fn count(&self) -> usize {
        let mut n = 0;
        let mut cur = self.cursor();
        while cur.advance() {
            n += 1;
        }
        n
    }

    fn count_where(&self, predicate: impl Fn(&Value) -> bool) -> usize {
        let mut n = 0;
        let mut cur = self.cursor();
        while cur.advance() {
            if let Ok(v) = cur.read() {
                if predicate(&v) {
                    n += 1;
                }
            }
        }
        n
    }

    fn sum(&self) -> Value {
        self.aggregate_seed(Value::Int(0), numeric_add)
    }

    fn sum_by(&self, selector: impl Fn(&Value) -> Value) -> Value {
        self.aggregate_seed(Value::Int(0), |acc, v| numeric_add(acc, &selector(v)))
    }

    fn min(&self) -> Result<Value> {
        self.aggregate(|acc, v| pick(acc, v, Ordering::Less))
    }

    fn min_by(&self, selector: impl Fn(&Value) -> Value) -> Result<Value> {
        extremum_by(self, selector, Ordering::Less)
    }

    fn max(&self) -> Result<Value> {
        self.aggregate(|acc, v| pick(acc, v, Ordering::Greater))
    }

    fn max_by(&self, selector: impl Fn(&Value) -> Value) -> Result<Value> {
        extremum_by(self, selector, Ordering::Greater)
    }

    fn average(&self) -> Result<Value> {
        self.average_by(|v| v.clone())
    }

    fn average_by(&self, selector: impl Fn(&Value) -> Value) -> Result<Value> {
        let mut total = 0.0;
        let mut n = 0u64;
        let mut cur = self.cursor();
        while cur.advance() {
            let v = cur.read()?;
            total += selector(&v).as_f64().unwrap_or(f64::NAN);
            n += 1;
        }
        if n == 0 {
            return Err(Error::InvalidState);
        }
        Ok(Value::Float(total / n as f64))
    }

    fn any(&self) -> bool {
        self.cursor().advance()
    }

    fn any_where(&self, predicate: impl Fn(&Value) -> bool) -> bool {
        let mut cur = self.cursor();
        while cur.advance() {
            if let Ok(v) = cur.read() {
                if predicate(&v) {
                    return true;
                }
            }
        }
        false
    }

    fn all(&self, predicate: impl Fn(&Value) -> bool) -> bool {
        let mut cur = self.cursor();
        while cur.advance() {
            match cur.read() {
                Ok(v) if predicate(&v) => continue,
                _ => return false,
            }
        }
        true
    }

    fn contains(&self, value: &Value, policy: Option<EqualityPolicy>) -> bool {
        match policy {
            Some(policy) => self.any_where(|v| policy.equals(v, value)),
            None => self.any_where(|v| loose_eq(v, value)),
        }
    }

    fn sequence_equal(&self, second: &Sequence, policy: Option<EqualityPolicy>) -> bool {
        if self.same_definition(second) {
            return true;
        }
        let eq = policy.unwrap_or_default();
        let mut a = self.cursor();
        let mut b = second.cursor();
        loop {
            let more_a = a.advance();
            let more_b = b.advance();
            if more_a != more_b {
                return false;
            }
            if !more_a {
                return true;
            }
            match (a.read(), b.read()) {
                (Ok(x), Ok(y)) if eq.equals(&x, &y) => continue,
                _ => return false,
            }
        }
    }

    fn each(&self, mut f: impl FnMut(&Value, usize)) {
        let mut index = 0;
        let mut cur = self.cursor();
        while cur.advance() {
            if let Ok(v) = cur.read() {
                f(&v, index);
            }
            index += 1;
        }
    }
}

/// Adds `v` to a running numeric total. Integer addition promotes to float
/// on overflow; any non-integer operand makes the total a float.
fn numeric_add(acc: Value, v: &Value) -> Value {
    match (&acc, v) {
        (Value::Int(a), Value::Int(b)) => match a.checked_add(*b) {
            Some(total) => Value::Int(total),
            None => Value::Float(*a as f64 + *b as f64),
        },
        _ => Value::Float(
            acc.as_f64().unwrap_or(f64::NAN) + v.as_f64().unwrap_or(f64::NAN),
        ),
    }
}

fn pick(acc: Value, v: &Value, wanted: Ordering) -> Value {
    if total_cmp(v, &acc) == wanted {
        v.clone()
    } else {
        acc
    }
}

fn extremum_by(
    seq: &Sequence,
    selector: impl Fn(&Value) -> Value,
    wanted: Ordering,
) -> Result<Value> {
    let mut best: Option<Value> = None;
    let mut cur = seq.cursor();
    while cur.advance() {
        let key = selector(&cur.read()?);
        best = Some(match best {
            Some(current) if total_cmp(&key, &current) != wanted => current,
            _ => key,
        });
    }
    best.ok_or(Error::InvalidState)
}

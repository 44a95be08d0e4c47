//! Element retrieval operators.
//!
//! Each comes in a failing form (`InvalidState` or `OutOfRange`) and an
//! `_or_default` form that substitutes a caller-supplied fallback. `single`
//! additionally fails when more than one element qualifies.

use pullq_core::error::{Error, Result};
use pullq_core::seq::Sequence;
use pullq_core::value::Value;

pub trait ElementOps {
    /// The element at the zero-based position; `OutOfRange` past the end.
    fn element_at(&self, index: usize) -> Result<Value>;
    fn element_at_or_default(&self, index: usize, default: Value) -> Value;

    fn first(&self) -> Result<Value>;
    fn first_where(&self, predicate: impl Fn(&Value) -> bool) -> Result<Value>;
    fn first_or_default(&self, default: Value) -> Value;
    fn first_where_or_default(&self, predicate: impl Fn(&Value) -> bool, default: Value) -> Value;

    fn last(&self) -> Result<Value>;
    fn last_where(&self, predicate: impl Fn(&Value) -> bool) -> Result<Value>;
    fn last_or_default(&self, default: Value) -> Value;
    fn last_where_or_default(&self, predicate: impl Fn(&Value) -> bool, default: Value) -> Value;

    /// The only element; `InvalidState` when empty or when a second element
    /// exists.
    fn single(&self) -> Result<Value>;
    /// The only element satisfying the predicate; `InvalidState` when none
    /// or more than one qualifies.
    fn single_where(&self, predicate: impl Fn(&Value) -> bool) -> Result<Value>;
    /// The default substitutes for every `single` failure: empty source,
    /// no qualifying element, or more than one.
    fn single_or_default(&self, default: Value) -> Value;
    fn single_where_or_default(&self, predicate: impl Fn(&Value) -> bool, default: Value)
        -> Value;
}

impl ElementOps for Sequence {
    fn element_at(&self, index: usize) -> Result<Value> {
        let mut cur = self.cursor();
        for _ in 0..=index {
            if !cur.advance() {
                return Err(Error::OutOfRange("index"));
            }
        }
        cur.read()
    }

    fn element_at_or_default(&self, index: usize, default: Value) -> Value {
        self.element_at(index).unwrap_or(default)
    }

    fn first(&self) -> Result<Value> {
        self.first_where(|_| true)
    }

    fn first_where(&self, predicate: impl Fn(&Value) -> bool) -> Result<Value> {
        let mut cur = self.cursor();
        while cur.advance() {
            let v = cur.read()?;
            if predicate(&v) {
                return Ok(v);
            }
        }
        Err(Error::InvalidState)
    }

    fn first_or_default(&self, default: Value) -> Value {
        self.first().unwrap_or(default)
    }

    fn first_where_or_default(&self, predicate: impl Fn(&Value) -> bool, default: Value) -> Value {
        self.first_where(predicate).unwrap_or(default)
    }

    fn last(&self) -> Result<Value> {
        self.last_where(|_| true)
    }

    fn last_where(&self, predicate: impl Fn(&Value) -> bool) -> Result<Value> {
        let mut found = None;
        let mut cur = self.cursor();
        while cur.advance() {
            let v = cur.read()?;
            if predicate(&v) {
                found = Some(v);
            }
        }
        found.ok_or(Error::InvalidState)
    }

    fn last_or_default(&self, default: Value) -> Value {
        self.last().unwrap_or(default)
    }

    fn last_where_or_default(&self, predicate: impl Fn(&Value) -> bool, default: Value) -> Value {
        self.last_where(predicate).unwrap_or(default)
    }

    fn single(&self) -> Result<Value> {
        self.single_where(|_| true)
    }

    fn single_where(&self, predicate: impl Fn(&Value) -> bool) -> Result<Value> {
        only_match(self, predicate)?.ok_or(Error::InvalidState)
    }

    fn single_or_default(&self, default: Value) -> Value {
        self.single_where_or_default(|_| true, default)
    }

    fn single_where_or_default(
        &self,
        predicate: impl Fn(&Value) -> bool,
        default: Value,
    ) -> Value {
        self.single_where(predicate).unwrap_or(default)
    }
}

/// Scans for at most one qualifying element. `Ok(None)` means none
/// qualified; a second match is an error.
fn only_match(seq: &Sequence, predicate: impl Fn(&Value) -> bool) -> Result<Option<Value>> {
    let mut found = None;
    let mut cur = seq.cursor();
    while cur.advance() {
        let v = cur.read()?;
        if predicate(&v) {
            if found.is_some() {
                return Err(Error::InvalidState);
            }
            found = Some(v);
        }
    }
    Ok(found)
}

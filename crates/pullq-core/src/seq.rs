//! The restartable pull-iteration protocol.
//!
//! A `Sequence` is a cheap, clonable recipe: it owns no iteration state and
//! is never mutated by consumption. All per-consumption state lives in the
//! `Cursor` obtained from it; independently obtained cursors never share
//! position. Operators compose by wrapping one `Source` in another.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::value::Value;

/// One pull-based traversal of a sequence.
///
/// `advance` must be called before the first `read`; `read` fails with
/// `InvalidState` before any advance, after an advance returned false, or
/// after a `restart` with no subsequent successful advance.
pub trait Cursor {
    fn advance(&mut self) -> bool;
    fn read(&self) -> Result<Value>;
    fn restart(&mut self);
}

/// Anything that can hand out fresh, independent cursors.
pub trait Source {
    fn cursor(&self) -> Box<dyn Cursor>;
}

/// Lazy, restartable description of an ordered collection.
#[derive(Clone)]
pub struct Sequence {
    source: Rc<dyn Source>,
}

impl Sequence {
    pub fn new(source: impl Source + 'static) -> Self {
        Sequence {
            source: Rc::new(source),
        }
    }

    /// Obtain a fresh cursor positioned before the first element.
    pub fn cursor(&self) -> Box<dyn Cursor> {
        self.source.cursor()
    }

    /// Two sequences are the same definition iff they share a source.
    pub fn same_definition(&self, other: &Sequence) -> bool {
        Rc::ptr_eq(&self.source, &other.source)
    }

    /// In-memory source over an owned collection.
    pub fn from_values(items: Vec<Value>) -> Self {
        Sequence::new(VecSource {
            items: Rc::new(items),
        })
    }

    /// Live view over a shared, mutable backing vector. Used by containers
    /// that expose the operator library over their current contents.
    pub fn from_shared(items: Rc<RefCell<Vec<Value>>>) -> Self {
        Sequence::new(SharedSource { items })
    }

    pub fn empty() -> Self {
        Sequence::from_values(Vec::new())
    }

    /// One-element sequence.
    pub fn singleton(value: Value) -> Self {
        Sequence::from_values(vec![value])
    }

    /// Consecutive integers `start, start+1, .., start+count-1`.
    pub fn range(start: i64, count: i64) -> Result<Self> {
        if count < 0 {
            return Err(Error::OutOfRange("count"));
        }
        Ok(Sequence::new(RangeSource { start, count }))
    }

    /// The same value, `count` times.
    pub fn repeat(value: Value, count: i64) -> Result<Self> {
        if count < 0 {
            return Err(Error::OutOfRange("count"));
        }
        Ok(Sequence::new(RepeatSource { value, count }))
    }
}

struct VecSource {
    items: Rc<Vec<Value>>,
}

impl Source for VecSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(VecCursor {
            items: Rc::clone(&self.items),
            pos: -1,
        })
    }
}

struct VecCursor {
    items: Rc<Vec<Value>>,
    pos: isize,
}

impl Cursor for VecCursor {
    fn advance(&mut self) -> bool {
        if self.pos < self.items.len() as isize {
            self.pos += 1;
        }
        (self.pos as usize) < self.items.len()
    }

    fn read(&self) -> Result<Value> {
        if self.pos < 0 || self.pos as usize >= self.items.len() {
            return Err(Error::InvalidState);
        }
        Ok(self.items[self.pos as usize].clone())
    }

    fn restart(&mut self) {
        self.pos = -1;
    }
}

struct SharedSource {
    items: Rc<RefCell<Vec<Value>>>,
}

impl Source for SharedSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(SharedCursor {
            items: Rc::clone(&self.items),
            pos: -1,
        })
    }
}

struct SharedCursor {
    items: Rc<RefCell<Vec<Value>>>,
    pos: isize,
}

impl Cursor for SharedCursor {
    fn advance(&mut self) -> bool {
        let len = self.items.borrow().len() as isize;
        if self.pos < len {
            self.pos += 1;
        }
        self.pos < len
    }

    fn read(&self) -> Result<Value> {
        let items = self.items.borrow();
        if self.pos < 0 || self.pos as usize >= items.len() {
            return Err(Error::InvalidState);
        }
        Ok(items[self.pos as usize].clone())
    }

    fn restart(&mut self) {
        self.pos = -1;
    }
}

struct RangeSource {
    start: i64,
    count: i64,
}

impl Source for RangeSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(RangeCursor {
            start: self.start,
            count: self.count,
            offset: -1,
            has_current: false,
        })
    }
}

struct RangeCursor {
    start: i64,
    count: i64,
    offset: i64,
    has_current: bool,
}

impl Cursor for RangeCursor {
    fn advance(&mut self) -> bool {
        self.has_current = false;
        if self.offset < self.count - 1 {
            self.offset += 1;
            self.has_current = true;
        }
        self.has_current
    }

    fn read(&self) -> Result<Value> {
        if !self.has_current {
            return Err(Error::InvalidState);
        }
        Ok(Value::Int(self.start + self.offset))
    }

    fn restart(&mut self) {
        self.offset = -1;
        self.has_current = false;
    }
}

struct RepeatSource {
    value: Value,
    count: i64,
}

impl Source for RepeatSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(RepeatCursor {
            value: self.value.clone(),
            count: self.count,
            offset: -1,
            has_current: false,
        })
    }
}

struct RepeatCursor {
    value: Value,
    count: i64,
    offset: i64,
    has_current: bool,
}

impl Cursor for RepeatCursor {
    fn advance(&mut self) -> bool {
        self.has_current = false;
        if self.offset < self.count - 1 {
            self.offset += 1;
            self.has_current = true;
        }
        self.has_current
    }

    fn read(&self) -> Result<Value> {
        if !self.has_current {
            return Err(Error::InvalidState);
        }
        Ok(self.value.clone())
    }

    fn restart(&mut self) {
        self.offset = -1;
        self.has_current = false;
    }
}

/// A key paired with the elements sharing that key.
///
/// Read-only from the outside; `push` exists for the group/lookup builders
/// that fill a grouping while a single pass over the upstream runs.
pub struct Grouping {
    key: Value,
    items: Rc<RefCell<Vec<Value>>>,
}

impl Grouping {
    pub fn new(key: Value) -> Self {
        Grouping {
            key,
            items: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn from_items(key: Value, items: Vec<Value>) -> Self {
        Grouping {
            key,
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    /// Used internally while the grouping is being built.
    pub fn push(&self, item: Value) {
        self.items.borrow_mut().push(item);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    /// The grouping as a sequence source; the full operator library applies.
    pub fn as_seq(&self) -> Sequence {
        Sequence::from_shared(Rc::clone(&self.items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(seq: &Sequence) -> Vec<Value> {
        let mut cur = seq.cursor();
        let mut out = Vec::new();
        while cur.advance() {
            out.push(cur.read().expect("read after advance"));
        }
        out
    }

    #[test]
    fn read_before_advance_is_invalid() {
        let seq = Sequence::from_values(vec![Value::Int(1)]);
        let cur = seq.cursor();
        assert_eq!(cur.read(), Err(Error::InvalidState));
    }

    #[test]
    fn read_after_exhaustion_is_invalid() {
        let seq = Sequence::from_values(vec![Value::Int(1)]);
        let mut cur = seq.cursor();
        assert!(cur.advance());
        assert!(!cur.advance());
        assert_eq!(cur.read(), Err(Error::InvalidState));
    }

    #[test]
    fn restart_rewinds_to_pre_iteration_position() {
        let seq = Sequence::from_values(vec![Value::Int(1), Value::Int(2)]);
        let mut cur = seq.cursor();
        assert!(cur.advance());
        assert!(cur.advance());
        cur.restart();
        assert_eq!(cur.read(), Err(Error::InvalidState));
        assert!(cur.advance());
        assert_eq!(cur.read(), Ok(Value::Int(1)));
    }

    #[test]
    fn independent_cursors_do_not_share_position() {
        let seq = Sequence::from_values(vec![Value::Int(1), Value::Int(2)]);
        let mut a = seq.cursor();
        let mut b = seq.cursor();
        assert!(a.advance());
        assert!(a.advance());
        assert!(b.advance());
        assert_eq!(b.read(), Ok(Value::Int(1)));
        assert_eq!(a.read(), Ok(Value::Int(2)));
    }

    #[test]
    fn range_produces_consecutive_integers() {
        let seq = Sequence::range(3, 4).expect("non-negative count");
        assert_eq!(
            drain(&seq),
            vec![Value::Int(3), Value::Int(4), Value::Int(5), Value::Int(6)]
        );
    }

    #[test]
    fn range_rejects_negative_count() {
        assert_eq!(Sequence::range(0, -1).err(), Some(Error::OutOfRange("count")));
        assert_eq!(
            Sequence::repeat(Value::Null, -5).err(),
            Some(Error::OutOfRange("count"))
        );
    }

    #[test]
    fn repeat_yields_the_value_count_times() {
        let seq = Sequence::repeat(Value::Str("x".into()), 3).expect("non-negative count");
        assert_eq!(drain(&seq).len(), 3);
    }

    #[test]
    fn empty_and_singleton() {
        assert!(drain(&Sequence::empty()).is_empty());
        assert_eq!(drain(&Sequence::singleton(Value::Int(7))), vec![Value::Int(7)]);
    }

    #[test]
    fn shared_source_sees_later_mutation() {
        let backing = Rc::new(RefCell::new(vec![Value::Int(1)]));
        let seq = Sequence::from_shared(Rc::clone(&backing));
        backing.borrow_mut().push(Value::Int(2));
        assert_eq!(drain(&seq), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn grouping_push_is_visible_through_its_sequence() {
        let g = Grouping::new(Value::Str("k".into()));
        let view = g.as_seq();
        g.push(Value::Int(1));
        g.push(Value::Int(2));
        assert_eq!(drain(&view), vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(g.len(), 2);
    }
}

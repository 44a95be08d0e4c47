//! Ordering operators.
//!
//! `order_by` returns an [`OrderedSequence`], which is a sequence plus the
//! chain of sort criteria so that `then_by` can refine it. Sorting is
//! deferred: a cursor materializes and sorts the source on first `advance`,
//! and keeps that snapshot across `restart`. The sort is stable, so ties
//! under every criterion keep their source order.

use std::cmp::Ordering;
use std::ops::Deref;
use std::rc::Rc;

use pullq_core::error::{Error, Result};
use pullq_core::policy::OrderingPolicy;
use pullq_core::seq::{Cursor, Sequence, Source};
use pullq_core::value::Value;

pub trait OrderOps {
    /// Sorts ascending by the selected key.
    fn order_by(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        policy: Option<OrderingPolicy>,
    ) -> OrderedSequence;

    /// Sorts descending by the selected key.
    fn order_by_descending(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        policy: Option<OrderingPolicy>,
    ) -> OrderedSequence;

    /// Yields the elements in reverse order. Materializes on first advance.
    fn reverse(&self) -> Sequence;
}

impl OrderOps for Sequence {
    fn order_by(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        policy: Option<OrderingPolicy>,
    ) -> OrderedSequence {
        OrderedSequence::make(self.clone(), vec![SortSpec::new(key, policy, false)])
    }

    fn order_by_descending(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        policy: Option<OrderingPolicy>,
    ) -> OrderedSequence {
        OrderedSequence::make(self.clone(), vec![SortSpec::new(key, policy, true)])
    }

    fn reverse(&self) -> Sequence {
        Sequence::new(ReverseSource {
            upstream: self.clone(),
        })
    }
}

/// One sort criterion: a key selector, a direction, and an ordering policy.
#[derive(Clone)]
pub struct SortSpec {
    key: Rc<dyn Fn(&Value) -> Value>,
    policy: OrderingPolicy,
    descending: bool,
}

impl SortSpec {
    fn new(
        key: impl Fn(&Value) -> Value + 'static,
        policy: Option<OrderingPolicy>,
        descending: bool,
    ) -> Self {
        SortSpec {
            key: Rc::new(key),
            policy: policy.unwrap_or_default(),
            descending,
        }
    }

    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ka = (self.key)(a);
        let kb = (self.key)(b);
        let ord = self.policy.compare(&ka, &kb);
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

/// A sequence with an attached chain of sort criteria.
///
/// Derefs to [`Sequence`], so every sequence operator chains off it directly.
/// The newest criterion sits at the front of `specs`; comparison walks the
/// chain back-to-front so the earliest `order_by` dominates.
pub struct OrderedSequence {
    seq: Sequence,
    source: Sequence,
    specs: Rc<Vec<SortSpec>>,
}

impl OrderedSequence {
    fn make(source: Sequence, specs: Vec<SortSpec>) -> Self {
        let specs = Rc::new(specs);
        OrderedSequence {
            seq: Sequence::new(OrderSource {
                source: source.clone(),
                specs: Rc::clone(&specs),
            }),
            source,
            specs,
        }
    }

    /// Refines the current ordering with a subordinate ascending key.
    pub fn then_by(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        policy: Option<OrderingPolicy>,
    ) -> OrderedSequence {
        self.refine(SortSpec::new(key, policy, false))
    }

    /// Refines the current ordering with a subordinate descending key.
    pub fn then_by_descending(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        policy: Option<OrderingPolicy>,
    ) -> OrderedSequence {
        self.refine(SortSpec::new(key, policy, true))
    }

    pub fn as_sequence(&self) -> Sequence {
        self.seq.clone()
    }

    fn refine(&self, spec: SortSpec) -> OrderedSequence {
        let mut specs = Vec::with_capacity(self.specs.len() + 1);
        specs.push(spec);
        specs.extend(self.specs.iter().cloned());
        OrderedSequence::make(self.source.clone(), specs)
    }
}

impl Deref for OrderedSequence {
    type Target = Sequence;

    fn deref(&self) -> &Sequence {
        &self.seq
    }
}

impl Clone for OrderedSequence {
    fn clone(&self) -> Self {
        OrderedSequence {
            seq: self.seq.clone(),
            source: self.source.clone(),
            specs: Rc::clone(&self.specs),
        }
    }
}

fn compare_specs(specs: &[SortSpec], a: &Value, b: &Value) -> Ordering {
    // Walk from the oldest criterion (back) to the newest (front).
    for spec in specs.iter().rev() {
        let ord = spec.compare(a, b);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

struct OrderSource {
    source: Sequence,
    specs: Rc<Vec<SortSpec>>,
}

impl Source for OrderSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(OrderCursor {
            source: self.source.clone(),
            specs: Rc::clone(&self.specs),
            sorted: None,
            pos: -1,
        })
    }
}

struct OrderCursor {
    source: Sequence,
    specs: Rc<Vec<SortSpec>>,
    sorted: Option<Vec<Value>>,
    pos: isize,
}

impl OrderCursor {
    fn materialize(&mut self) {
        let mut items = Vec::new();
        let mut cur = self.source.cursor();
        while cur.advance() {
            if let Ok(v) = cur.read() {
                items.push(v);
            }
        }
        let specs = Rc::clone(&self.specs);
        items.sort_by(|a, b| compare_specs(&specs, a, b));
        #[cfg(feature = "tracing")]
        tracing::trace!(rows = items.len(), criteria = specs.len(), "sorted sequence snapshot");
        self.sorted = Some(items);
    }
}

impl Cursor for OrderCursor {
    fn advance(&mut self) -> bool {
        if self.sorted.is_none() {
            self.materialize();
        }
        let len = self.sorted.as_ref().map(Vec::len).unwrap_or(0) as isize;
        if self.pos < len {
            self.pos += 1;
        }
        self.pos < len
    }

    fn read(&self) -> Result<Value> {
        let sorted = self.sorted.as_ref().ok_or(Error::InvalidState)?;
        if self.pos < 0 || self.pos as usize >= sorted.len() {
            return Err(Error::InvalidState);
        }
        Ok(sorted[self.pos as usize].clone())
    }

    fn restart(&mut self) {
        // The snapshot is kept; only the position rewinds.
        self.pos = -1;
    }
}

struct ReverseSource {
    upstream: Sequence,
}

impl Source for ReverseSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(ReverseCursor {
            upstream: self.upstream.clone(),
            items: None,
            pos: -1,
        })
    }
}

struct ReverseCursor {
    upstream: Sequence,
    items: Option<Vec<Value>>,
    pos: isize,
}

impl Cursor for ReverseCursor {
    fn advance(&mut self) -> bool {
        if self.items.is_none() {
            let mut items = Vec::new();
            let mut cur = self.upstream.cursor();
            while cur.advance() {
                if let Ok(v) = cur.read() {
                    items.push(v);
                }
            }
            items.reverse();
            self.items = Some(items);
        }
        let len = self.items.as_ref().map(Vec::len).unwrap_or(0) as isize;
        if self.pos < len {
            self.pos += 1;
        }
        self.pos < len
    }

    fn read(&self) -> Result<Value> {
        let items = self.items.as_ref().ok_or(Error::InvalidState)?;
        if self.pos < 0 || self.pos as usize >= items.len() {
            return Err(Error::InvalidState);
        }
        Ok(items[self.pos as usize].clone())
    }

    fn restart(&mut self) {
        self.pos = -1;
    }
}

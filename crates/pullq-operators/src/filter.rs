//! Restriction operators: filter, skip/take families, distinct.
//!
//! All of these are lazy pass-through wrappers; `distinct` is the only
//! stateful one, carrying a per-cursor seen-set in an associative store.

use std::rc::Rc;

use pullq_core::error::{Error, Result};
use pullq_core::policy::EqualityPolicy;
use pullq_core::seq::{Cursor, Sequence, Source};
use pullq_core::value::Value;
use pullq_store::Dictionary;

pub trait FilterOps {
    /// Elements for which the predicate holds, in upstream order.
    fn filter(&self, predicate: impl Fn(&Value) -> bool + 'static) -> Sequence;

    /// Discards the first `count` elements, then passes through.
    fn skip(&self, count: usize) -> Sequence;

    /// Discards the leading elements satisfying the predicate; the predicate
    /// sees `(element, index)` and is never consulted again after it fails.
    fn skip_while(&self, predicate: impl Fn(&Value, usize) -> bool + 'static) -> Sequence;

    /// At most the first `count` elements.
    fn take(&self, count: usize) -> Sequence;

    /// Elements until the predicate first fails; `(element, index)`.
    fn take_while(&self, predicate: impl Fn(&Value, usize) -> bool + 'static) -> Sequence;

    /// First-seen elements only, under the given (or default) equality.
    fn distinct(&self, policy: Option<EqualityPolicy>) -> Sequence;
}

impl FilterOps for Sequence {
    fn filter(&self, predicate: impl Fn(&Value) -> bool + 'static) -> Sequence {
        Sequence::new(FilterSource {
            upstream: self.clone(),
            predicate: Rc::new(predicate),
        })
    }

    fn skip(&self, count: usize) -> Sequence {
        if count == 0 {
            return self.clone();
        }
        self.skip_while(move |_, index| index < count)
    }

    fn skip_while(&self, predicate: impl Fn(&Value, usize) -> bool + 'static) -> Sequence {
        Sequence::new(SkipWhileSource {
            upstream: self.clone(),
            predicate: Rc::new(predicate),
        })
    }

    fn take(&self, count: usize) -> Sequence {
        if count == 0 {
            return Sequence::empty();
        }
        self.take_while(move |_, index| index < count)
    }

    fn take_while(&self, predicate: impl Fn(&Value, usize) -> bool + 'static) -> Sequence {
        Sequence::new(TakeWhileSource {
            upstream: self.clone(),
            predicate: Rc::new(predicate),
        })
    }

    fn distinct(&self, policy: Option<EqualityPolicy>) -> Sequence {
        Sequence::new(DistinctSource {
            upstream: self.clone(),
            policy,
        })
    }
}

struct FilterSource {
    upstream: Sequence,
    predicate: Rc<dyn Fn(&Value) -> bool>,
}

impl Source for FilterSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(FilterCursor {
            upstream: self.upstream.cursor(),
            predicate: Rc::clone(&self.predicate),
            current: None,
        })
    }
}

struct FilterCursor {
    upstream: Box<dyn Cursor>,
    predicate: Rc<dyn Fn(&Value) -> bool>,
    current: Option<Value>,
}

impl Cursor for FilterCursor {
    fn advance(&mut self) -> bool {
        self.current = None;
        while self.upstream.advance() {
            if let Ok(v) = self.upstream.read() {
                if (self.predicate)(&v) {
                    self.current = Some(v);
                    return true;
                }
            }
        }
        false
    }

    fn read(&self) -> Result<Value> {
        self.current.clone().ok_or(Error::InvalidState)
    }

    fn restart(&mut self) {
        self.upstream.restart();
        self.current = None;
    }
}

struct SkipWhileSource {
    upstream: Sequence,
    predicate: Rc<dyn Fn(&Value, usize) -> bool>,
}

impl Source for SkipWhileSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(SkipWhileCursor {
            upstream: self.upstream.cursor(),
            predicate: Rc::clone(&self.predicate),
            skipping: true,
            index: 0,
            current: None,
        })
    }
}

struct SkipWhileCursor {
    upstream: Box<dyn Cursor>,
    predicate: Rc<dyn Fn(&Value, usize) -> bool>,
    skipping: bool,
    index: usize,
    current: Option<Value>,
}

impl Cursor for SkipWhileCursor {
    fn advance(&mut self) -> bool {
        self.current = None;
        if self.skipping {
            loop {
                if !self.upstream.advance() {
                    self.skipping = false;
                    return false;
                }
                let Ok(v) = self.upstream.read() else {
                    return false;
                };
                if (self.predicate)(&v, self.index) {
                    self.index += 1;
                    continue;
                }
                self.skipping = false;
                self.current = Some(v);
                return true;
            }
        }
        if self.upstream.advance() {
            self.current = self.upstream.read().ok();
            return self.current.is_some();
        }
        false
    }

    fn read(&self) -> Result<Value> {
        self.current.clone().ok_or(Error::InvalidState)
    }

    fn restart(&mut self) {
        self.upstream.restart();
        self.skipping = true;
        self.index = 0;
        self.current = None;
    }
}

struct TakeWhileSource {
    upstream: Sequence,
    predicate: Rc<dyn Fn(&Value, usize) -> bool>,
}

impl Source for TakeWhileSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(TakeWhileCursor {
            upstream: self.upstream.cursor(),
            predicate: Rc::clone(&self.predicate),
            operational: true,
            index: 0,
            current: None,
        })
    }
}

struct TakeWhileCursor {
    upstream: Box<dyn Cursor>,
    predicate: Rc<dyn Fn(&Value, usize) -> bool>,
    operational: bool,
    index: usize,
    current: Option<Value>,
}

impl Cursor for TakeWhileCursor {
    fn advance(&mut self) -> bool {
        self.current = None;
        if !self.operational {
            return false;
        }
        if self.upstream.advance() {
            if let Ok(v) = self.upstream.read() {
                if (self.predicate)(&v, self.index) {
                    self.index += 1;
                    self.current = Some(v);
                    return true;
                }
            }
        }
        self.operational = false;
        false
    }

    fn read(&self) -> Result<Value> {
        self.current.clone().ok_or(Error::InvalidState)
    }

    fn restart(&mut self) {
        self.upstream.restart();
        self.operational = true;
        self.index = 0;
        self.current = None;
    }
}

struct DistinctSource {
    upstream: Sequence,
    policy: Option<EqualityPolicy>,
}

impl Source for DistinctSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(DistinctCursor {
            upstream: self.upstream.cursor(),
            seen: Dictionary::for_policy(self.policy.clone()),
            current: None,
        })
    }
}

struct DistinctCursor {
    upstream: Box<dyn Cursor>,
    seen: Dictionary,
    current: Option<Value>,
}

impl Cursor for DistinctCursor {
    fn advance(&mut self) -> bool {
        self.current = None;
        while self.upstream.advance() {
            if let Ok(v) = self.upstream.read() {
                if self.seen.try_add(v.clone(), Value::Bool(true)) {
                    self.current = Some(v);
                    return true;
                }
            }
        }
        false
    }

    fn read(&self) -> Result<Value> {
        self.current.clone().ok_or(Error::InvalidState)
    }

    fn restart(&mut self) {
        self.upstream.restart();
        self.seen.clear();
        self.current = None;
    }
}

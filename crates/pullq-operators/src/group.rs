//! Grouping operators.
//!
//! Four entry points cover the selector combinations: key only, key plus
//! element selector, and either of those with a result selector applied to
//! each finished group. All of them defer work to the first `advance`, then
//! memoize the built groups; `restart` rewinds without regrouping.

use std::rc::Rc;

use pullq_core::error::{Error, Result};
use pullq_core::policy::EqualityPolicy;
use pullq_core::seq::{Cursor, Grouping, Sequence, Source};
use pullq_core::value::Value;
use pullq_containers::Lookup;

type KeyFn = Rc<dyn Fn(&Value) -> Value>;
type ResultFn = Rc<dyn Fn(&Value, &Sequence) -> Value>;

pub trait GroupOps {
    /// Groups elements by key; yields one `Value::Grouping` per distinct key,
    /// in first-occurrence order.
    fn group_by(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence;

    /// Groups by key, storing `element(v)` instead of `v` in each group.
    fn group_by_with_element(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        element: impl Fn(&Value) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence;

    /// Groups by key, then maps each `(key, group sequence)` pair through the
    /// result selector.
    fn group_by_with_result(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        result: impl Fn(&Value, &Sequence) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence;

    /// Full form: element selector and result selector.
    fn group_by_with_element_result(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        element: impl Fn(&Value) -> Value + 'static,
        result: impl Fn(&Value, &Sequence) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence;
}

impl GroupOps for Sequence {
    fn group_by(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence {
        self.grouped(Rc::new(key), None, None, policy)
    }

    fn group_by_with_element(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        element: impl Fn(&Value) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence {
        self.grouped(Rc::new(key), Some(Rc::new(element)), None, policy)
    }

    fn group_by_with_result(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        result: impl Fn(&Value, &Sequence) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence {
        self.grouped(Rc::new(key), None, Some(Rc::new(result)), policy)
    }

    fn group_by_with_element_result(
        &self,
        key: impl Fn(&Value) -> Value + 'static,
        element: impl Fn(&Value) -> Value + 'static,
        result: impl Fn(&Value, &Sequence) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence {
        self.grouped(Rc::new(key), Some(Rc::new(element)), Some(Rc::new(result)), policy)
    }
}

trait GroupedExt {
    fn grouped(
        &self,
        key: KeyFn,
        element: Option<KeyFn>,
        result: Option<ResultFn>,
        policy: Option<EqualityPolicy>,
    ) -> Sequence;
}

impl GroupedExt for Sequence {
    fn grouped(
        &self,
        key: KeyFn,
        element: Option<KeyFn>,
        result: Option<ResultFn>,
        policy: Option<EqualityPolicy>,
    ) -> Sequence {
        Sequence::new(GroupSource {
            upstream: self.clone(),
            key,
            element,
            result,
            policy,
        })
    }
}

struct GroupSource {
    upstream: Sequence,
    key: KeyFn,
    element: Option<KeyFn>,
    result: Option<ResultFn>,
    policy: Option<EqualityPolicy>,
}

impl Source for GroupSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(GroupCursor {
            upstream: self.upstream.clone(),
            key: Rc::clone(&self.key),
            element: self.element.clone(),
            result: self.result.clone(),
            policy: self.policy.clone(),
            groups: None,
            pos: -1,
        })
    }
}

struct GroupCursor {
    upstream: Sequence,
    key: KeyFn,
    element: Option<KeyFn>,
    result: Option<ResultFn>,
    policy: Option<EqualityPolicy>,
    groups: Option<Vec<Rc<Grouping>>>,
    pos: isize,
}

impl GroupCursor {
    fn materialize(&mut self) {
        let mut lookup = Lookup::for_policy(self.policy.clone());
        let mut cur = self.upstream.cursor();
        while cur.advance() {
            if let Ok(v) = cur.read() {
                let k = (self.key)(&v);
                let e = match &self.element {
                    Some(element) => element(&v),
                    None => v,
                };
                lookup.push(k, e);
            }
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(groups = lookup.len(), "grouped sequence snapshot");
        self.groups = Some(lookup.groupings());
    }
}

impl Cursor for GroupCursor {
    fn advance(&mut self) -> bool {
        if self.groups.is_none() {
            self.materialize();
        }
        let len = self.groups.as_ref().map(Vec::len).unwrap_or(0) as isize;
        if self.pos < len {
            self.pos += 1;
        }
        self.pos < len
    }

    fn read(&self) -> Result<Value> {
        let groups = self.groups.as_ref().ok_or(Error::InvalidState)?;
        if self.pos < 0 || self.pos as usize >= groups.len() {
            return Err(Error::InvalidState);
        }
        let group = &groups[self.pos as usize];
        match &self.result {
            Some(result) => Ok(result(group.key(), &group.as_seq())),
            None => Ok(Value::Grouping(Rc::clone(group))),
        }
    }

    fn restart(&mut self) {
        self.pos = -1;
    }
}

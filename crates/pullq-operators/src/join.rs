//! Correlation operators: join and group_join.
//!
//! Both build a key-to-grouping index over the inner sequence on the first
//! `advance` and stream the outer side against it. The index survives
//! `restart`; only the outer cursor rewinds.

use std::rc::Rc;

use pullq_core::error::{Error, Result};
use pullq_core::policy::EqualityPolicy;
use pullq_core::seq::{Cursor, Grouping, Sequence, Source};
use pullq_core::value::Value;
use pullq_containers::Lookup;

type KeyFn = Rc<dyn Fn(&Value) -> Value>;

pub trait JoinOps {
    /// Equi-join: one output element per matching (outer, inner) pair, in
    /// outer order, inner matches in their source order. Outer elements with
    /// no match are dropped.
    fn join(
        &self,
        inner: &Sequence,
        outer_key: impl Fn(&Value) -> Value + 'static,
        inner_key: impl Fn(&Value) -> Value + 'static,
        result: impl Fn(&Value, &Value) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence;

    /// One output element per outer element, pairing it with the (possibly
    /// empty) sequence of its inner matches.
    fn group_join(
        &self,
        inner: &Sequence,
        outer_key: impl Fn(&Value) -> Value + 'static,
        inner_key: impl Fn(&Value) -> Value + 'static,
        result: impl Fn(&Value, &Sequence) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence;
}

impl JoinOps for Sequence {
    fn join(
        &self,
        inner: &Sequence,
        outer_key: impl Fn(&Value) -> Value + 'static,
        inner_key: impl Fn(&Value) -> Value + 'static,
        result: impl Fn(&Value, &Value) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence {
        Sequence::new(JoinSource {
            outer: self.clone(),
            inner: inner.clone(),
            outer_key: Rc::new(outer_key),
            inner_key: Rc::new(inner_key),
            result: Rc::new(result),
            policy,
        })
    }

    fn group_join(
        &self,
        inner: &Sequence,
        outer_key: impl Fn(&Value) -> Value + 'static,
        inner_key: impl Fn(&Value) -> Value + 'static,
        result: impl Fn(&Value, &Sequence) -> Value + 'static,
        policy: Option<EqualityPolicy>,
    ) -> Sequence {
        Sequence::new(GroupJoinSource {
            outer: self.clone(),
            inner: inner.clone(),
            outer_key: Rc::new(outer_key),
            inner_key: Rc::new(inner_key),
            result: Rc::new(result),
            policy,
        })
    }
}

fn build_index(
    inner: &Sequence,
    inner_key: &KeyFn,
    policy: Option<EqualityPolicy>,
) -> Lookup {
    let mut index = Lookup::for_policy(policy);
    let mut cur = inner.cursor();
    while cur.advance() {
        if let Ok(v) = cur.read() {
            index.push(inner_key(&v), v);
        }
    }
    #[cfg(feature = "tracing")]
    tracing::trace!(keys = index.len(), "join index built");
    index
}

struct JoinSource {
    outer: Sequence,
    inner: Sequence,
    outer_key: KeyFn,
    inner_key: KeyFn,
    result: Rc<dyn Fn(&Value, &Value) -> Value>,
    policy: Option<EqualityPolicy>,
}

impl Source for JoinSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(JoinCursor {
            outer: self.outer.cursor(),
            inner: self.inner.clone(),
            outer_key: Rc::clone(&self.outer_key),
            inner_key: Rc::clone(&self.inner_key),
            result: Rc::clone(&self.result),
            policy: self.policy.clone(),
            index: None,
            bucket: None,
        })
    }
}

struct JoinCursor {
    outer: Box<dyn Cursor>,
    inner: Sequence,
    outer_key: KeyFn,
    inner_key: KeyFn,
    result: Rc<dyn Fn(&Value, &Value) -> Value>,
    policy: Option<EqualityPolicy>,
    index: Option<Lookup>,
    // The outer element currently being expanded, its match group, and the
    // position of the inner match being read.
    bucket: Option<(Value, Rc<Grouping>, usize)>,
}

impl Cursor for JoinCursor {
    fn advance(&mut self) -> bool {
        if self.index.is_none() {
            self.index = Some(build_index(&self.inner, &self.inner_key, self.policy.clone()));
        }
        if let Some((_, group, pos)) = self.bucket.as_mut() {
            if *pos + 1 < group.len() {
                *pos += 1;
                return true;
            }
        }
        self.bucket = None;
        let index = match self.index.as_ref() {
            Some(index) => index,
            None => return false,
        };
        while self.outer.advance() {
            let Ok(outer) = self.outer.read() else {
                return false;
            };
            let key = (self.outer_key)(&outer);
            if let Ok(group) = index.item(&key) {
                self.bucket = Some((outer, group, 0));
                return true;
            }
        }
        false
    }

    fn read(&self) -> Result<Value> {
        let (outer, group, pos) = self.bucket.as_ref().ok_or(Error::InvalidState)?;
        let inner = group.get(*pos).ok_or(Error::InvalidState)?;
        Ok((self.result)(outer, &inner))
    }

    fn restart(&mut self) {
        self.outer.restart();
        self.bucket = None;
    }
}

struct GroupJoinSource {
    outer: Sequence,
    inner: Sequence,
    outer_key: KeyFn,
    inner_key: KeyFn,
    result: Rc<dyn Fn(&Value, &Sequence) -> Value>,
    policy: Option<EqualityPolicy>,
}

impl Source for GroupJoinSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(GroupJoinCursor {
            outer: self.outer.cursor(),
            inner: self.inner.clone(),
            outer_key: Rc::clone(&self.outer_key),
            inner_key: Rc::clone(&self.inner_key),
            result: Rc::clone(&self.result),
            policy: self.policy.clone(),
            index: None,
            current: None,
        })
    }
}

struct GroupJoinCursor {
    outer: Box<dyn Cursor>,
    inner: Sequence,
    outer_key: KeyFn,
    inner_key: KeyFn,
    result: Rc<dyn Fn(&Value, &Sequence) -> Value>,
    policy: Option<EqualityPolicy>,
    index: Option<Lookup>,
    current: Option<(Value, Sequence)>,
}

impl Cursor for GroupJoinCursor {
    fn advance(&mut self) -> bool {
        if self.index.is_none() {
            self.index = Some(build_index(&self.inner, &self.inner_key, self.policy.clone()));
        }
        self.current = None;
        if !self.outer.advance() {
            return false;
        }
        let Ok(outer) = self.outer.read() else {
            return false;
        };
        let key = (self.outer_key)(&outer);
        let matches = self
            .index
            .as_ref()
            .and_then(|index| index.item(&key).ok())
            .map(|group| group.as_seq())
            .unwrap_or_else(Sequence::empty);
        self.current = Some((outer, matches));
        true
    }

    fn read(&self) -> Result<Value> {
        let (outer, matches) = self.current.as_ref().ok_or(Error::InvalidState)?;
        Ok((self.result)(outer, matches))
    }

    fn restart(&mut self) {
        self.outer.restart();
        self.current = None;
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

    fn pair(owner: &str, pet: &str) -> Value {
        Value::record(vec![
            ("owner".to_string(), Value::Str(owner.into())),
            ("pet".to_string(), Value::Str(pet.into())),
        ])
    }

    fn owner_field(v: &Value) -> Value {
        v.field("owner").cloned().unwrap_or(Value::Null)
    }

    fn owners() -> Sequence {
        Sequence::from_values(vec![
            Value::Str("ann".into()),
            Value::Str("bob".into()),
            Value::Str("cid".into()),
        ])
    }

    fn pets() -> Sequence {
        Sequence::from_values(vec![
            pair("ann", "cat"),
            pair("bob", "dog"),
            pair("ann", "hen"),
        ])
    }

    #[test]
    fn join_pairs_every_match_in_outer_order() {
        let joined = owners().join(
            &pets(),
            |o| o.clone(),
            owner_field,
            |o, p| {
                Value::Str(format!(
                    "{}:{}",
                    o,
                    p.field("pet").cloned().unwrap_or(Value::Null)
                ))
            },
            None,
        );
        assert_eq!(
            drain(&joined),
            vec![
                Value::Str("ann:cat".into()),
                Value::Str("ann:hen".into()),
                Value::Str("bob:dog".into()),
            ]
        );
    }

    #[test]
    fn join_drops_unmatched_outer_elements() {
        let joined = owners().join(
            &pets(),
            |o| o.clone(),
            owner_field,
            |o, _| o.clone(),
            None,
        );
        // "cid" owns nothing and produces no row.
        assert_eq!(drain(&joined).len(), 3);
    }

    #[test]
    fn join_restart_replays_without_rebuilding() {
        let joined = owners().join(
            &pets(),
            |o| o.clone(),
            owner_field,
            |o, _| o.clone(),
            None,
        );
        let mut cur = joined.cursor();
        let mut first_pass = 0;
        while cur.advance() {
            first_pass += 1;
        }
        cur.restart();
        let mut second_pass = 0;
        while cur.advance() {
            second_pass += 1;
        }
        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn group_join_keeps_unmatched_outer_elements() {
        let joined = owners().group_join(
            &pets(),
            |o| o.clone(),
            owner_field,
            |o, matches| {
                let mut n = 0;
                let mut cur = matches.cursor();
                while cur.advance() {
                    n += 1;
                }
                Value::Str(format!("{}={}", o, n))
            },
            None,
        );
        assert_eq!(
            drain(&joined),
            vec![
                Value::Str("ann=2".into()),
                Value::Str("bob=1".into()),
                Value::Str("cid=0".into()),
            ]
        );
    }
}

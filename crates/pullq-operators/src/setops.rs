//! Set-flavored operators: concat, union, intersect, except, default_if_empty.
//!
//! Union, intersect and except are compositions over `distinct`, `filter`
//! and `contains` rather than bespoke cursors. Membership probes against the
//! second sequence rescan it, so intersect and except are O(n * m); callers
//! with large inputs should stage the second side through `to_list` first.

use pullq_core::policy::EqualityPolicy;
use pullq_core::seq::{Cursor, Sequence, Source};
use pullq_core::value::Value;
use pullq_core::error::Result;

use crate::aggregate::AggregateOps;
use crate::filter::FilterOps;

pub trait SetOps {
    /// The elements of `self` followed by the elements of `second`.
    fn concat(&self, second: &Sequence) -> Sequence;

    /// Distinct elements appearing in either sequence, first occurrence wins.
    fn union(&self, second: &Sequence, policy: Option<EqualityPolicy>) -> Sequence;

    /// Distinct elements of `self` that also appear in `second`.
    fn intersect(&self, second: &Sequence, policy: Option<EqualityPolicy>) -> Sequence;

    /// Elements of `self` that do not appear in `second`. Duplicates in
    /// `self` are kept.
    fn except(&self, second: &Sequence, policy: Option<EqualityPolicy>) -> Sequence;

    /// `self` if it has any element, otherwise a singleton of `value`.
    /// The emptiness probe runs when this is called, not when enumerated.
    fn default_if_empty(&self, value: Value) -> Sequence;
}

impl SetOps for Sequence {
    fn concat(&self, second: &Sequence) -> Sequence {
        Sequence::new(ConcatSource {
            first: self.clone(),
            second: second.clone(),
        })
    }

    fn union(&self, second: &Sequence, policy: Option<EqualityPolicy>) -> Sequence {
        self.concat(second).distinct(policy)
    }

    fn intersect(&self, second: &Sequence, policy: Option<EqualityPolicy>) -> Sequence {
        let second = second.clone();
        let probe = policy.clone();
        self.distinct(policy)
            .filter(move |item| second.contains(item, probe.clone()))
    }

    fn except(&self, second: &Sequence, policy: Option<EqualityPolicy>) -> Sequence {
        let second = second.clone();
        self.filter(move |item| !second.contains(item, policy.clone()))
    }

    fn default_if_empty(&self, value: Value) -> Sequence {
        if self.any() {
            self.clone()
        } else {
            Sequence::singleton(value)
        }
    }
}

struct ConcatSource {
    first: Sequence,
    second: Sequence,
}

impl Source for ConcatSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(ConcatCursor {
            first: self.first.cursor(),
            second: self.second.cursor(),
            on_second: false,
        })
    }
}

struct ConcatCursor {
    first: Box<dyn Cursor>,
    second: Box<dyn Cursor>,
    on_second: bool,
}

impl Cursor for ConcatCursor {
    fn advance(&mut self) -> bool {
        if !self.on_second {
            if self.first.advance() {
                return true;
            }
            self.on_second = true;
        }
        self.second.advance()
    }

    fn read(&self) -> Result<Value> {
        if self.on_second {
            self.second.read()
        } else {
            self.first.read()
        }
    }

    fn restart(&mut self) {
        self.first.restart();
        self.second.restart();
        self.on_second = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Sequence {
        Sequence::from_values(values.iter().map(|&n| Value::Int(n)).collect())
    }

    fn int_vec(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&n| Value::Int(n)).collect()
    }

    fn drain(seq: &Sequence) -> Vec<Value> {
        let mut cur = seq.cursor();
        let mut out = Vec::new();
        while cur.advance() {
            out.push(cur.read().expect("read after advance"));
        }
        out
    }

    #[test]
    fn concat_preserves_both_orders() {
        let seq = ints(&[1, 2]).concat(&ints(&[3, 4]));
        assert_eq!(drain(&seq), int_vec(&[1, 2, 3, 4]));
    }

    #[test]
    fn concat_restart_rewinds_both_sides() {
        let seq = ints(&[1]).concat(&ints(&[2]));
        let mut cur = seq.cursor();
        while cur.advance() {}
        cur.restart();
        let mut out = Vec::new();
        while cur.advance() {
            out.push(cur.read().expect("read after advance"));
        }
        assert_eq!(out, int_vec(&[1, 2]));
    }

    #[test]
    fn union_deduplicates_across_both_inputs() {
        let seq = ints(&[1, 2, 2]).union(&ints(&[2, 3]), None);
        assert_eq!(drain(&seq), int_vec(&[1, 2, 3]));
    }

    #[test]
    fn intersect_keeps_shared_distinct_elements() {
        let seq = ints(&[1, 1, 2, 4]).intersect(&ints(&[1, 4, 5]), None);
        assert_eq!(drain(&seq), int_vec(&[1, 4]));
    }

    #[test]
    fn except_keeps_duplicates_on_the_left() {
        let seq = ints(&[1, 1, 2, 3]).except(&ints(&[2]), None);
        assert_eq!(drain(&seq), int_vec(&[1, 1, 3]));
    }

    #[test]
    fn default_if_empty_substitutes_the_fallback() {
        assert_eq!(
            drain(&Sequence::empty().default_if_empty(Value::Int(42))),
            int_vec(&[42])
        );
        assert_eq!(
            drain(&ints(&[1]).default_if_empty(Value::Int(42))),
            int_vec(&[1])
        );
    }
}

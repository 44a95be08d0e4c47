//! Projection operators: select, select_many and zip.

use std::rc::Rc;

use pullq_core::error::{Error, Result};
use pullq_core::seq::{Cursor, Sequence, Source};
use pullq_core::value::Value;

pub trait ProjectOps {
    /// Maps every element through the selector; the selector also receives
    /// the zero-based position of the element.
    fn select(&self, selector: impl Fn(&Value, usize) -> Value + 'static) -> Sequence;

    /// Flattens the sequences produced by the collection selector.
    fn select_many(&self, collection: impl Fn(&Value, usize) -> Sequence + 'static) -> Sequence;

    /// Like `select_many`, but maps each inner element together with the
    /// outer element that produced it.
    fn select_many_with_result(
        &self,
        collection: impl Fn(&Value, usize) -> Sequence + 'static,
        result: impl Fn(&Value, &Value) -> Value + 'static,
    ) -> Sequence;

    /// Pairs elements positionally with `second`; stops at the shorter side.
    fn zip(&self, second: &Sequence, result: impl Fn(&Value, &Value) -> Value + 'static)
        -> Sequence;
}

impl ProjectOps for Sequence {
    fn select(&self, selector: impl Fn(&Value, usize) -> Value + 'static) -> Sequence {
        Sequence::new(SelectSource {
            upstream: self.clone(),
            selector: Rc::new(selector),
        })
    }

    fn select_many(&self, collection: impl Fn(&Value, usize) -> Sequence + 'static) -> Sequence {
        Sequence::new(SelectManySource {
            upstream: self.clone(),
            collection: Rc::new(collection),
            result: None,
        })
    }

    fn select_many_with_result(
        &self,
        collection: impl Fn(&Value, usize) -> Sequence + 'static,
        result: impl Fn(&Value, &Value) -> Value + 'static,
    ) -> Sequence {
        Sequence::new(SelectManySource {
            upstream: self.clone(),
            collection: Rc::new(collection),
            result: Some(Rc::new(result)),
        })
    }

    fn zip(
        &self,
        second: &Sequence,
        result: impl Fn(&Value, &Value) -> Value + 'static,
    ) -> Sequence {
        Sequence::new(ZipSource {
            first: self.clone(),
            second: second.clone(),
            result: Rc::new(result),
        })
    }
}

struct SelectSource {
    upstream: Sequence,
    selector: Rc<dyn Fn(&Value, usize) -> Value>,
}

impl Source for SelectSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(SelectCursor {
            upstream: self.upstream.cursor(),
            selector: Rc::clone(&self.selector),
            index: -1,
        })
    }
}

struct SelectCursor {
    upstream: Box<dyn Cursor>,
    selector: Rc<dyn Fn(&Value, usize) -> Value>,
    index: isize,
}

impl Cursor for SelectCursor {
    fn advance(&mut self) -> bool {
        if self.upstream.advance() {
            self.index += 1;
            return true;
        }
        false
    }

    fn read(&self) -> Result<Value> {
        let element = self.upstream.read()?;
        if self.index < 0 {
            return Err(Error::InvalidState);
        }
        Ok((self.selector)(&element, self.index as usize))
    }

    fn restart(&mut self) {
        self.upstream.restart();
        self.index = -1;
    }
}

struct SelectManySource {
    upstream: Sequence,
    collection: Rc<dyn Fn(&Value, usize) -> Sequence>,
    result: Option<Rc<dyn Fn(&Value, &Value) -> Value>>,
}

impl Source for SelectManySource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(SelectManyCursor {
            upstream: self.upstream.cursor(),
            collection: Rc::clone(&self.collection),
            result: self.result.clone(),
            index: 0,
            outer: None,
            inner: None,
        })
    }
}

struct SelectManyCursor {
    upstream: Box<dyn Cursor>,
    collection: Rc<dyn Fn(&Value, usize) -> Sequence>,
    result: Option<Rc<dyn Fn(&Value, &Value) -> Value>>,
    index: usize,
    outer: Option<Value>,
    inner: Option<Box<dyn Cursor>>,
}

impl Cursor for SelectManyCursor {
    fn advance(&mut self) -> bool {
        loop {
            if let Some(inner) = self.inner.as_mut() {
                if inner.advance() {
                    return true;
                }
            }
            if !self.upstream.advance() {
                self.outer = None;
                self.inner = None;
                return false;
            }
            let Ok(outer) = self.upstream.read() else {
                return false;
            };
            let inner_seq = (self.collection)(&outer, self.index);
            self.index += 1;
            self.outer = Some(outer);
            self.inner = Some(inner_seq.cursor());
        }
    }

    fn read(&self) -> Result<Value> {
        let inner = self.inner.as_ref().ok_or(Error::InvalidState)?;
        let element = inner.read()?;
        match (&self.result, &self.outer) {
            (Some(result), Some(outer)) => Ok(result(outer, &element)),
            _ => Ok(element),
        }
    }

    fn restart(&mut self) {
        self.upstream.restart();
        self.index = 0;
        self.outer = None;
        self.inner = None;
    }
}

struct ZipSource {
    first: Sequence,
    second: Sequence,
    result: Rc<dyn Fn(&Value, &Value) -> Value>,
}

impl Source for ZipSource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(ZipCursor {
            first: self.first.cursor(),
            second: self.second.cursor(),
            result: Rc::clone(&self.result),
            has_current: false,
        })
    }
}

struct ZipCursor {
    first: Box<dyn Cursor>,
    second: Box<dyn Cursor>,
    result: Rc<dyn Fn(&Value, &Value) -> Value>,
    has_current: bool,
}

impl Cursor for ZipCursor {
    fn advance(&mut self) -> bool {
        // Both sides move in lockstep; the shorter one ends the pairing.
        self.has_current = self.first.advance() && self.second.advance();
        self.has_current
    }

    fn read(&self) -> Result<Value> {
        if !self.has_current {
            return Err(Error::InvalidState);
        }
        let a = self.first.read()?;
        let b = self.second.read()?;
        Ok((self.result)(&a, &b))
    }

    fn restart(&mut self) {
        self.first.restart();
        self.second.restart();
        self.has_current = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Sequence {
        Sequence::from_values(values.iter().map(|&n| Value::Int(n)).collect())
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
    fn select_maps_with_position() {
        let seq = ints(&[5, 6]).select(|v, i| match v {
            Value::Int(n) => Value::Int(n + i as i64),
            other => other.clone(),
        });
        assert_eq!(drain(&seq), vec![Value::Int(5), Value::Int(7)]);
    }

    #[test]
    fn select_is_reevaluated_after_restart() {
        let seq = ints(&[1]).select(|v, _| v.clone());
        let mut cur = seq.cursor();
        assert!(cur.advance());
        cur.restart();
        assert!(cur.advance());
        assert_eq!(cur.read(), Ok(Value::Int(1)));
    }

    #[test]
    fn select_many_flattens_in_order() {
        let seq = ints(&[2, 3]).select_many(|v, _| match v {
            Value::Int(n) => Sequence::range(0, *n).expect("count is non-negative"),
            _ => Sequence::empty(),
        });
        assert_eq!(
            drain(&seq),
            vec![
                Value::Int(0),
                Value::Int(1),
                Value::Int(0),
                Value::Int(1),
                Value::Int(2),
            ]
        );
    }

    #[test]
    fn select_many_skips_empty_inner_sequences() {
        let seq = ints(&[0, 2, 0]).select_many(|v, _| match v {
            Value::Int(n) => Sequence::range(10, *n).expect("count is non-negative"),
            _ => Sequence::empty(),
        });
        assert_eq!(drain(&seq), vec![Value::Int(10), Value::Int(11)]);
    }

    #[test]
    fn select_many_with_result_sees_the_outer_element() {
        let seq = ints(&[1, 2]).select_many_with_result(
            |_, _| ints(&[100]),
            |outer, inner| match (outer, inner) {
                (Value::Int(a), Value::Int(b)) => Value::Int(a + b),
                _ => Value::Null,
            },
        );
        assert_eq!(drain(&seq), vec![Value::Int(101), Value::Int(102)]);
    }

    #[test]
    fn zip_stops_at_the_shorter_side() {
        let seq = ints(&[1, 2, 3]).zip(&ints(&[10, 20]), |a, b| match (a, b) {
            (Value::Int(x), Value::Int(y)) => Value::Int(x * y),
            _ => Value::Null,
        });
        assert_eq!(drain(&seq), vec![Value::Int(10), Value::Int(40)]);
    }
}

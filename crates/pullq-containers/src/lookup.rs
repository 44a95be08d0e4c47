//! Immutable key-to-grouping map.
//!
//! A lookup is filled once by a builder (`push` per element) and read
//! thereafter. Groups enumerate in first-occurrence order because the
//! underlying store is insertion-ordered.

use std::rc::Rc;

use pullq_core::error::{Error, Result};
use pullq_core::policy::EqualityPolicy;
use pullq_core::seq::{Cursor, Grouping, Sequence, Source};
use pullq_core::value::Value;
use pullq_store::Dictionary;

pub struct Lookup {
    dict: Dictionary,
}

impl Lookup {
    pub fn new() -> Self {
        Lookup {
            dict: Dictionary::new(),
        }
    }

    pub fn with_policy(policy: EqualityPolicy) -> Self {
        Lookup {
            dict: Dictionary::with_policy(policy),
        }
    }

    pub fn for_policy(policy: Option<EqualityPolicy>) -> Self {
        Lookup {
            dict: Dictionary::for_policy(policy),
        }
    }

    /// Used internally while the lookup is being built: appends `element`
    /// to the grouping for `key`, creating the grouping on first sight.
    pub fn push(&mut self, key: Value, element: Value) {
        match self.dict.item(&key) {
            Ok(Value::Grouping(group)) => group.push(element),
            _ => {
                let group = Rc::new(Grouping::new(key.clone()));
                group.push(element);
                // The key was just probed absent; add cannot collide.
                let _ = self.dict.add(key, Value::Grouping(group));
            }
        }
    }

    pub fn contains(&self, key: &Value) -> bool {
        self.dict.contains_key(key)
    }

    pub fn item(&self, key: &Value) -> Result<Rc<Grouping>> {
        match self.dict.item(key)? {
            Value::Grouping(group) => Ok(group),
            _ => Err(Error::KeyNotFound),
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    pub fn groupings(&self) -> Vec<Rc<Grouping>> {
        self.dict
            .to_pairs()
            .into_iter()
            .filter_map(|(_, v)| match v {
                Value::Grouping(group) => Some(group),
                _ => None,
            })
            .collect()
    }

    /// The groupings as a sequence of `Value::Grouping` elements.
    pub fn as_seq(&self) -> Sequence {
        self.dict.values()
    }

    /// Lazily maps every (key, element) pair across all groups, in
    /// group-then-element order.
    pub fn apply_result_selector(
        &self,
        selector: impl Fn(&Value, &Value) -> Value + 'static,
    ) -> Sequence {
        Sequence::new(ApplySource {
            groups: Rc::new(self.groupings()),
            selector: Rc::new(selector),
        })
    }
}

impl Default for Lookup {
    fn default() -> Self {
        Self::new()
    }
}

struct ApplySource {
    groups: Rc<Vec<Rc<Grouping>>>,
    selector: Rc<dyn Fn(&Value, &Value) -> Value>,
}

impl Source for ApplySource {
    fn cursor(&self) -> Box<dyn Cursor> {
        Box::new(ApplyCursor {
            groups: Rc::clone(&self.groups),
            selector: Rc::clone(&self.selector),
            group_pos: -1,
            inner: None,
        })
    }
}

struct ApplyCursor {
    groups: Rc<Vec<Rc<Grouping>>>,
    selector: Rc<dyn Fn(&Value, &Value) -> Value>,
    group_pos: isize,
    inner: Option<Box<dyn Cursor>>,
}

impl Cursor for ApplyCursor {
    fn advance(&mut self) -> bool {
        loop {
            if let Some(inner) = self.inner.as_mut() {
                if inner.advance() {
                    return true;
                }
            }
            let next = self.group_pos + 1;
            if next as usize >= self.groups.len() {
                self.inner = None;
                return false;
            }
            self.group_pos = next;
            self.inner = Some(self.groups[next as usize].as_seq().cursor());
        }
    }

    fn read(&self) -> Result<Value> {
        let inner = self.inner.as_ref().ok_or(Error::InvalidState)?;
        let element = inner.read()?;
        let key = self.groups[self.group_pos as usize].key();
        Ok((self.selector)(key, &element))
    }

    fn restart(&mut self) {
        self.group_pos = -1;
        self.inner = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Lookup {
        let mut lookup = Lookup::new();
        lookup.push(Value::Str("odd".into()), Value::Int(1));
        lookup.push(Value::Str("even".into()), Value::Int(2));
        lookup.push(Value::Str("odd".into()), Value::Int(3));
        lookup
    }

    #[test]
    fn groups_accumulate_per_key() {
        let lookup = sample();
        assert_eq!(lookup.len(), 2);
        assert!(lookup.contains(&Value::Str("odd".into())));
        let odd = lookup.item(&Value::Str("odd".into())).expect("present");
        assert_eq!(odd.len(), 2);
        assert_eq!(odd.get(0), Some(Value::Int(1)));
        assert_eq!(odd.get(1), Some(Value::Int(3)));
    }

    #[test]
    fn missing_key_is_key_not_found() {
        assert_eq!(
            sample().item(&Value::Str("none".into())).err(),
            Some(Error::KeyNotFound)
        );
    }

    #[test]
    fn groupings_are_in_first_occurrence_order() {
        let groups = sample().groupings();
        assert_eq!(groups[0].key(), &Value::Str("odd".into()));
        assert_eq!(groups[1].key(), &Value::Str("even".into()));
    }

    #[test]
    fn apply_result_selector_walks_group_then_element() {
        let seq = sample().apply_result_selector(|key, element| {
            Value::Str(format!("{}:{}", key, element))
        });
        let mut cur = seq.cursor();
        let mut out = Vec::new();
        while cur.advance() {
            out.push(cur.read().expect("read after advance"));
        }
        assert_eq!(
            out,
            vec![
                Value::Str("odd:1".into()),
                Value::Str("odd:3".into()),
                Value::Str("even:2".into()),
            ]
        );
    }
}

//! Materializing conversions: vectors, lists, dictionaries and lookups.

use pullq_core::error::Result;
use pullq_core::policy::EqualityPolicy;
use pullq_core::seq::Sequence;
use pullq_core::value::Value;
use pullq_containers::{List, Lookup};
use pullq_store::Dictionary;

pub trait ConvertOps {
    fn to_vec(&self) -> Vec<Value>;
    fn to_list(&self) -> List;

    /// Builds a dictionary keyed by the selector; a repeated key fails with
    /// `DuplicateKey`.
    fn to_dictionary(
        &self,
        key: impl Fn(&Value) -> Value,
        policy: Option<EqualityPolicy>,
    ) -> Result<Dictionary>;

    /// Like `to_dictionary`, storing `element(v)` as the value.
    fn to_dictionary_with_element(
        &self,
        key: impl Fn(&Value) -> Value,
        element: impl Fn(&Value) -> Value,
        policy: Option<EqualityPolicy>,
    ) -> Result<Dictionary>;

    /// Builds a lookup keyed by the selector; repeated keys accumulate.
    fn to_lookup(&self, key: impl Fn(&Value) -> Value, policy: Option<EqualityPolicy>) -> Lookup;

    fn to_lookup_with_element(
        &self,
        key: impl Fn(&Value) -> Value,
        element: impl Fn(&Value) -> Value,
        policy: Option<EqualityPolicy>,
    ) -> Lookup;
}

impl ConvertOps for Sequence {
    fn to_vec(&self) -> Vec<Value> {
        let mut out = Vec::new();
        let mut cur = self.cursor();
        while cur.advance() {
            if let Ok(v) = cur.read() {
                out.push(v);
            }
        }
        out
    }

    fn to_list(&self) -> List {
        List::from_seq(self)
    }

    fn to_dictionary(
        &self,
        key: impl Fn(&Value) -> Value,
        policy: Option<EqualityPolicy>,
    ) -> Result<Dictionary> {
        self.to_dictionary_with_element(key, |v| v.clone(), policy)
    }

    fn to_dictionary_with_element(
        &self,
        key: impl Fn(&Value) -> Value,
        element: impl Fn(&Value) -> Value,
        policy: Option<EqualityPolicy>,
    ) -> Result<Dictionary> {
        let mut dict = Dictionary::for_policy(policy);
        let mut cur = self.cursor();
        while cur.advance() {
            let v = cur.read()?;
            dict.add(key(&v), element(&v))?;
        }
        Ok(dict)
    }

    fn to_lookup(&self, key: impl Fn(&Value) -> Value, policy: Option<EqualityPolicy>) -> Lookup {
        self.to_lookup_with_element(key, |v| v.clone(), policy)
    }

    fn to_lookup_with_element(
        &self,
        key: impl Fn(&Value) -> Value,
        element: impl Fn(&Value) -> Value,
        policy: Option<EqualityPolicy>,
    ) -> Lookup {
        let mut lookup = Lookup::for_policy(policy);
        let mut cur = self.cursor();
        while cur.advance() {
            if let Ok(v) = cur.read() {
                lookup.push(key(&v), element(&v));
            }
        }
        lookup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pullq_core::error::Error;

    fn ints(values: &[i64]) -> Sequence {
        Sequence::from_values(values.iter().map(|&n| Value::Int(n)).collect())
    }

    #[test]
    fn to_vec_and_to_list_materialize_in_order() {
        let seq = ints(&[1, 2]);
        assert_eq!(seq.to_vec(), vec![Value::Int(1), Value::Int(2)]);
        let list = seq.to_list();
        assert_eq!(list.len(), 2);
        assert_eq!(list.item(1), Ok(Value::Int(2)));
    }

    #[test]
    fn to_dictionary_round_trips_values() {
        let dict = ints(&[1, 2, 3])
            .to_dictionary(|v| v.clone(), None)
            .expect("keys are unique");
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.item(&Value::Int(2)), Ok(Value::Int(2)));
    }

    #[test]
    fn to_dictionary_rejects_duplicate_keys() {
        let err = ints(&[1, 1]).to_dictionary(|v| v.clone(), None).err();
        assert_eq!(err, Some(Error::DuplicateKey("1".to_string())));
    }

    #[test]
    fn to_lookup_accumulates_duplicates() {
        let lookup = ints(&[1, 3, 2]).to_lookup(
            |v| match v {
                Value::Int(n) => Value::Int(n % 2),
                other => other.clone(),
            },
            None,
        );
        assert_eq!(lookup.len(), 2);
        let odd = lookup.item(&Value::Int(1)).expect("present");
        assert_eq!(odd.len(), 2);
    }

    #[test]
    fn to_lookup_with_element_stores_projected_values() {
        let lookup = ints(&[4]).to_lookup_with_element(
            |_| Value::Str("k".into()),
            |v| match v {
                Value::Int(n) => Value::Int(n * n),
                other => other.clone(),
            },
            None,
        );
        let group = lookup.item(&Value::Str("k".into())).expect("present");
        assert_eq!(group.get(0), Some(Value::Int(16)));
    }
}

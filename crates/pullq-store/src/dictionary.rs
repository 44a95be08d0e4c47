//! The associative store.
//!
//! Keys are partitioned into two domains. Scalars with no custom policy take
//! the fast path: a map keyed by the scalar's own canonical value. Everything
//! else lands in a structured bucket keyed by a structural fingerprint and is
//! resolved inside the bucket by a linear scan with the active equality: the
//! fingerprint is a partition hint only.
//!
//! When a caller supplies an equality policy, fingerprinting is disabled
//! entirely (the policy may equate structurally different keys, so structure
//! cannot drive bucketing) and all keys share one bucket. Lookups then
//! degrade to O(n) in the entry count. That cost is deliberate and documented,
//! not hidden.
//!
//! Entries live in a slot arena with tombstones so enumeration is always in
//! insertion order; the group/lookup builders rely on that for deterministic
//! first-occurrence group ordering.

use std::collections::HashMap;

use pullq_core::config::StoreConfig;
use pullq_core::error::{Error, Result};
use pullq_core::fingerprint::{fingerprint, Hash256};
use pullq_core::policy::EqualityPolicy;
use pullq_core::seq::Sequence;
use pullq_core::value::{loose_eq, Value};

use crate::key::ScalarKey;

/// Bucket key for the policy-supplied case: structure cannot be trusted, so
/// every key hashes to the same bucket.
const OPAQUE_BUCKET: Hash256 = Hash256([0u8; 32]);

pub struct Dictionary {
    policy: Option<EqualityPolicy>,
    config: StoreConfig,
    /// Insertion-ordered slots; `None` marks a removed entry.
    slots: Vec<Option<(Value, Value)>>,
    scalar: HashMap<ScalarKey, usize>,
    structured: HashMap<Hash256, Vec<usize>>,
    live: usize,
}

enum Route {
    Scalar(ScalarKey),
    Structured(Hash256),
}

impl Dictionary {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Dictionary {
            policy: None,
            scalar: HashMap::with_capacity(config.scalar_capacity),
            structured: HashMap::with_capacity(config.structured_capacity),
            config,
            slots: Vec::new(),
            live: 0,
        }
    }

    /// A store whose keys are compared exclusively through `policy`.
    pub fn with_policy(policy: EqualityPolicy) -> Self {
        let mut dict = Self::new();
        dict.policy = Some(policy);
        dict
    }

    /// Optional-policy constructor used by operators that thread a caller's
    /// `Option<EqualityPolicy>` straight through.
    pub fn for_policy(policy: Option<EqualityPolicy>) -> Self {
        match policy {
            Some(p) => Self::with_policy(p),
            None => Self::new(),
        }
    }

    /// The caller-supplied policy, if any.
    pub fn policy(&self) -> Option<&EqualityPolicy> {
        self.policy.as_ref()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn is_read_only(&self) -> bool {
        false
    }

    /// Fails with `DuplicateKey` if the key already denotes an entry.
    pub fn add(&mut self, key: Value, value: Value) -> Result<()> {
        if self.try_add(key.clone(), value) {
            Ok(())
        } else {
            Err(Error::DuplicateKey(key.to_string()))
        }
    }

    /// Adds unless present; returns whether the entry was inserted. No
    /// mutation happens on the `false` path.
    pub fn try_add(&mut self, key: Value, value: Value) -> bool {
        let route = self.route(&key);
        if self.find(&route, &key).is_some() {
            return false;
        }
        self.insert(route, key, value);
        true
    }

    /// Upserts: replaces the value of an existing entry or adds a new one.
    pub fn set(&mut self, key: Value, value: Value) {
        let route = self.route(&key);
        match self.find(&route, &key) {
            Some(idx) => {
                if let Some(slot) = self.slots[idx].as_mut() {
                    slot.1 = value;
                }
            }
            None => self.insert(route, key, value),
        }
    }

    /// Fails with `KeyNotFound` when absent.
    pub fn item(&self, key: &Value) -> Result<Value> {
        let route = self.route(key);
        match self.find(&route, key) {
            Some(idx) => self.slots[idx]
                .as_ref()
                .map(|(_, v)| v.clone())
                .ok_or(Error::KeyNotFound),
            None => Err(Error::KeyNotFound),
        }
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        let route = self.route(key);
        self.find(&route, key).is_some()
    }

    /// Value search is a full O(n) scan under loose equality.
    pub fn contains_value(&self, value: &Value) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|(_, v)| loose_eq(v, value))
    }

    pub fn remove(&mut self, key: &Value) -> bool {
        match self.route(key) {
            Route::Scalar(sk) => match self.scalar.remove(&sk) {
                Some(idx) => {
                    self.slots[idx] = None;
                    self.live -= 1;
                    true
                }
                None => false,
            },
            Route::Structured(fp) => {
                let pos = self.structured.get(&fp).and_then(|bucket| {
                    bucket.iter().position(|&idx| {
                        self.slots[idx]
                            .as_ref()
                            .map(|(k, _)| match &self.policy {
                                Some(p) => p.equals(k, key),
                                None => loose_eq(k, key),
                            })
                            .unwrap_or(false)
                    })
                });
                match pos {
                    Some(pos) => {
                        let idx = match self.structured.get_mut(&fp) {
                            Some(bucket) => {
                                let idx = bucket.remove(pos);
                                if bucket.is_empty() {
                                    self.structured.remove(&fp);
                                }
                                idx
                            }
                            None => return false,
                        };
                        self.slots[idx] = None;
                        self.live -= 1;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Drops every entry; the store keeps its policy and configuration.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.scalar.clear();
        self.structured.clear();
        self.live = 0;
    }

    /// Insertion-ordered snapshot of the live entries.
    pub fn to_pairs(&self) -> Vec<(Value, Value)> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// Entries as a sequence of `{key, value}` records.
    pub fn entries(&self) -> Sequence {
        let items = self
            .to_pairs()
            .into_iter()
            .map(|(k, v)| Value::record(vec![("key".to_string(), k), ("value".to_string(), v)]))
            .collect();
        Sequence::from_values(items)
    }

    pub fn keys(&self) -> Sequence {
        Sequence::from_values(self.to_pairs().into_iter().map(|(k, _)| k).collect())
    }

    pub fn values(&self) -> Sequence {
        Sequence::from_values(self.to_pairs().into_iter().map(|(_, v)| v).collect())
    }

    fn route(&self, key: &Value) -> Route {
        if self.policy.is_none() {
            if let Some(sk) = ScalarKey::of(key) {
                return Route::Scalar(sk);
            }
            Route::Structured(fingerprint(key, &self.config))
        } else {
            Route::Structured(OPAQUE_BUCKET)
        }
    }

    fn find(&self, route: &Route, key: &Value) -> Option<usize> {
        match route {
            Route::Scalar(sk) => self.scalar.get(sk).copied(),
            Route::Structured(fp) => {
                let bucket = self.structured.get(fp)?;
                bucket.iter().copied().find(|&idx| {
                    self.slots[idx]
                        .as_ref()
                        .map(|(k, _)| match &self.policy {
                            Some(p) => p.equals(k, key),
                            None => loose_eq(k, key),
                        })
                        .unwrap_or(false)
                })
            }
        }
    }

    fn insert(&mut self, route: Route, key: Value, value: Value) {
        let idx = self.slots.len();
        self.slots.push(Some((key, value)));
        self.live += 1;
        match route {
            Route::Scalar(sk) => {
                self.scalar.insert(sk, idx);
            }
            Route::Structured(fp) => {
                let bucket = self.structured.entry(fp).or_default();
                bucket.push(idx);
                #[cfg(feature = "tracing")]
                if bucket.len() > 1 {
                    tracing::trace!(bucket = %fp, depth = bucket.len(), "fingerprint collision");
                }
            }
        }
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_a(n: i64) -> Value {
        Value::record(vec![("a".to_string(), Value::Int(n))])
    }

    #[test]
    fn add_then_item_round_trips() {
        let mut dict = Dictionary::new();
        dict.add(Value::Str("k".into()), Value::Int(7)).expect("fresh key");
        assert_eq!(dict.item(&Value::Str("k".into())), Ok(Value::Int(7)));
        assert_eq!(dict.len(), 1);
        assert!(!dict.is_read_only());
    }

    #[test]
    fn add_duplicate_key_fails() {
        let mut dict = Dictionary::new();
        dict.add(Value::Int(1), Value::Str("x".into())).expect("fresh key");
        let err = dict.add(Value::Int(1), Value::Str("y".into())).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey(_)));
        // The original value survives a failed add.
        assert_eq!(dict.item(&Value::Int(1)), Ok(Value::Str("x".into())));
    }

    #[test]
    fn try_add_reports_presence_without_mutating() {
        let mut dict = Dictionary::new();
        assert!(dict.try_add(Value::Int(1), Value::Int(10)));
        assert!(!dict.try_add(Value::Int(1), Value::Int(20)));
        assert_eq!(dict.item(&Value::Int(1)), Ok(Value::Int(10)));
    }

    #[test]
    fn set_upserts() {
        let mut dict = Dictionary::new();
        dict.set(Value::Int(1), Value::Int(10));
        dict.set(Value::Int(1), Value::Int(20));
        assert_eq!(dict.item(&Value::Int(1)), Ok(Value::Int(20)));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn missing_key_is_key_not_found() {
        let dict = Dictionary::new();
        assert_eq!(dict.item(&Value::Int(9)), Err(Error::KeyNotFound));
    }

    #[test]
    fn loose_scalar_keys_unify_int_and_float() {
        let mut dict = Dictionary::new();
        dict.set(Value::Int(1), Value::Str("one".into()));
        assert!(dict.contains_key(&Value::Float(1.0)));
        assert_eq!(dict.item(&Value::Float(1.0)), Ok(Value::Str("one".into())));
    }

    #[test]
    fn structured_key_is_identity_under_default_policy() {
        let mut dict = Dictionary::new();
        let key = record_a(1);
        dict.add(key.clone(), Value::Str("x".into())).expect("fresh key");
        // A structurally equal but distinct record is a different key.
        assert!(!dict.contains_key(&record_a(1)));
        assert!(dict.contains_key(&key));
    }

    #[test]
    fn structured_key_matches_under_field_policy() {
        let by_a = EqualityPolicy::from_fn(|x, y| x.field("a") == y.field("a"));
        let mut dict = Dictionary::with_policy(by_a);
        dict.add(record_a(1), Value::Str("x".into())).expect("fresh key");
        assert!(dict.contains_key(&record_a(1)));
        assert!(!dict.contains_key(&record_a(2)));
        assert_eq!(dict.item(&record_a(1)), Ok(Value::Str("x".into())));
    }

    #[test]
    fn colliding_fingerprints_fall_back_to_linear_scan() {
        // Truncated renderings make these two keys indistinguishable to the
        // fingerprint; retrieval must still resolve them via the scan.
        let cfg = StoreConfig {
            max_fingerprint_parts: 2,
            max_part_len: 1,
            ..StoreConfig::default()
        };
        let mut dict = Dictionary::with_config(cfg);
        let k1 = Value::record(vec![("a".to_string(), Value::Str("x1".into()))]);
        let k2 = Value::record(vec![("a".to_string(), Value::Str("x2".into()))]);
        dict.add(k1.clone(), Value::Int(100)).expect("fresh key");
        dict.add(k2.clone(), Value::Int(200)).expect("fresh key");
        assert_eq!(dict.item(&k1), Ok(Value::Int(100)));
        assert_eq!(dict.item(&k2), Ok(Value::Int(200)));
    }

    #[test]
    fn remove_and_clear() {
        let mut dict = Dictionary::new();
        dict.set(Value::Int(1), Value::Int(10));
        dict.set(Value::Int(2), Value::Int(20));
        assert!(dict.remove(&Value::Int(1)));
        assert!(!dict.remove(&Value::Int(1)));
        assert_eq!(dict.len(), 1);
        dict.clear();
        assert!(dict.is_empty());
        assert_eq!(dict.item(&Value::Int(2)), Err(Error::KeyNotFound));
    }

    #[test]
    fn remove_structured_key() {
        let mut dict = Dictionary::new();
        let key = record_a(5);
        dict.set(key.clone(), Value::Int(50));
        assert!(dict.remove(&key));
        assert!(dict.is_empty());
    }

    #[test]
    fn enumeration_is_insertion_ordered_across_domains() {
        let mut dict = Dictionary::new();
        dict.set(Value::Int(2), Value::Str("two".into()));
        let rec = record_a(9);
        dict.set(rec.clone(), Value::Str("rec".into()));
        dict.set(Value::Str("z".into()), Value::Str("zed".into()));
        let keys: Vec<Value> = dict.to_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys[0], Value::Int(2));
        assert!(loose_eq(&keys[1], &rec));
        assert_eq!(keys[2], Value::Str("z".into()));
    }

    #[test]
    fn removal_keeps_order_of_survivors() {
        let mut dict = Dictionary::new();
        for i in 0..5 {
            dict.set(Value::Int(i), Value::Int(i * 10));
        }
        dict.remove(&Value::Int(2));
        let keys: Vec<Value> = dict.to_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![Value::Int(0), Value::Int(1), Value::Int(3), Value::Int(4)]
        );
    }

    #[test]
    fn contains_value_scans_loosely() {
        let mut dict = Dictionary::new();
        dict.set(Value::Int(1), Value::Float(10.0));
        assert!(dict.contains_value(&Value::Int(10)));
        assert!(!dict.contains_value(&Value::Int(11)));
    }
}

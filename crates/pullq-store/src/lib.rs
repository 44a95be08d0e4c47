#![forbid(unsafe_code)]
//! pullq-store: the associative store backing distinct/group/join/lookup.
//!
//! Arbitrary values are accepted as keys. Scalars take an O(1) fast path;
//! structured keys are partitioned by a bounded structural fingerprint and
//! resolved by a linear scan inside the bucket, so the store stays correct
//! under fingerprint collisions. Supplying a custom equality policy disables
//! fingerprinting (one bucket, O(n) lookups) because the policy may equate
//! structurally different keys.

pub mod dictionary;
pub mod key;

pub use dictionary::Dictionary;
pub use key::ScalarKey;

#![forbid(unsafe_code)]
//! pullq: a deferred, pull-based sequence query engine.
//!
//! Queries are composed as chains of lazy operators over a restartable
//! cursor protocol and evaluated only when enumerated. The workspace splits
//! into four layers, re-exported here:
//!
//! - `core`: the dynamic [`Value`] model, comparison policies, errors, and
//!   the [`Sequence`]/[`Cursor`] protocol
//! - `store`: the keyed [`Dictionary`] with structural key fingerprinting
//! - `containers`: [`List`], [`ReadOnlyView`] and [`Lookup`]
//! - `operators`: the operator library, as extension traits
//!
//! ```
//! use pullq::prelude::*;
//! use pullq::Value;
//!
//! let seq = pullq::Sequence::from_values(
//!     (1..=6).map(Value::Int).collect(),
//! );
//! let evens: Vec<Value> = seq
//!     .filter(|v| matches!(v, Value::Int(n) if n % 2 == 0))
//!     .select(|v, _| v.clone())
//!     .to_vec();
//! assert_eq!(evens, vec![Value::Int(2), Value::Int(4), Value::Int(6)]);
//! ```

pub use pullq_containers::{List, Lookup, ReadOnlyView};
pub use pullq_core::config::StoreConfig;
pub use pullq_core::error::{Error, Result};
pub use pullq_core::policy::{EqualityPolicy, OrderingPolicy};
pub use pullq_core::seq::{Cursor, Grouping, Sequence, Source};
pub use pullq_core::value::Value;
pub use pullq_operators::OrderedSequence;
pub use pullq_store::Dictionary;

pub mod prelude {
    pub use pullq_core::prelude::*;
    pub use pullq_operators::prelude::*;
}

//! Convenient re-exports for downstream crates.

pub use crate::config::StoreConfig;
pub use crate::error::{Error, Result};
pub use crate::fingerprint::{fingerprint, Hash256};
pub use crate::policy::{EqualityPolicy, OrderingPolicy};
pub use crate::seq::{Cursor, Grouping, Sequence, Source};
pub use crate::value::{loose_eq, total_cmp, Value};

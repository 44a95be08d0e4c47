#![forbid(unsafe_code)]
//! pullq-core: value model, comparison policies, errors, and the pull-based
//! sequence protocol.
//!
//! Design intent:
//! - Sequences are pure definitions; only cursors hold iteration state.
//! - Everything is single-threaded and synchronous; suspension happens only
//!   at `advance`/`read` call boundaries.
//! - No I/O, no runtime. Higher crates (store, operators, containers) build
//!   on these types without ever reaching back in.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod policy;
pub mod prelude;
pub mod seq;
pub mod value;

pub use error::{Error, Result};
pub use policy::{EqualityPolicy, OrderingPolicy};
pub use seq::{Cursor, Grouping, Sequence, Source};
pub use value::Value;

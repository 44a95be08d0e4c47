#![forbid(unsafe_code)]
//! pullq-containers: concrete collections layered on the sequence protocol.
//!
//! Each container exposes the operator library by being a sequence *source*
//! (`as_seq()`), not by re-implementing operators. `Grouping` itself lives in
//! core because groupings flow through sequences as elements.

pub mod list;
pub mod lookup;
pub mod read_only;

pub use list::List;
pub use lookup::Lookup;
pub use read_only::ReadOnlyView;

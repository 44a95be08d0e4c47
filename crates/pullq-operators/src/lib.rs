#![forbid(unsafe_code)]
//! pullq-operators: the sequence operator library.
//!
//! Operators are extension traits over [`pullq_core::seq::Sequence`], split
//! by concern:
//!
//! - [`FilterOps`]: filter, skip, skip_while, take, take_while, distinct
//! - [`ProjectOps`]: select, select_many, zip
//! - [`OrderOps`]: order_by, order_by_descending, reverse (plus `then_by`
//!   on [`OrderedSequence`])
//! - [`GroupOps`]: the group_by family
//! - [`JoinOps`]: join, group_join
//! - [`SetOps`]: concat, union, intersect, except, default_if_empty
//! - [`AggregateOps`]: folds, counts, numeric reductions, quantifiers
//! - [`ElementOps`]: first/last/single/element_at families
//! - [`ConvertOps`]: to_vec, to_list, to_dictionary, to_lookup
//!
//! Lazy operators return a new `Sequence` and do no work until a cursor
//! advances; eager ones run a private cursor to completion. Bring the whole
//! surface into scope with `use pullq_operators::prelude::*`.

pub mod aggregate;
pub mod convert;
pub mod element;
pub mod filter;
pub mod group;
pub mod join;
pub mod map;
pub mod setops;
pub mod sort;

pub use aggregate::AggregateOps;
pub use convert::ConvertOps;
pub use element::ElementOps;
pub use filter::FilterOps;
pub use group::GroupOps;
pub use join::JoinOps;
pub use map::ProjectOps;
pub use setops::SetOps;
pub use sort::{OrderOps, OrderedSequence, SortSpec};

pub mod prelude {
    pub use crate::aggregate::AggregateOps;
    pub use crate::convert::ConvertOps;
    pub use crate::element::ElementOps;
    pub use crate::filter::FilterOps;
    pub use crate::group::GroupOps;
    pub use crate::join::JoinOps;
    pub use crate::map::ProjectOps;
    pub use crate::setops::SetOps;
    pub use crate::sort::{OrderOps, OrderedSequence};
}

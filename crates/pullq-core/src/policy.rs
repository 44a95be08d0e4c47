//! Pluggable equality/ordering policies.
//!
//! Every operator that compares values accepts an optional policy; absence
//! always means "use the default policy", never "compare nothing". Callers
//! holding a bare two-argument closure normalize it once at the boundary via
//! `from_fn`.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::value::{loose_eq, total_cmp, Value};

/// Equality half of the comparison abstraction. Must be reflexive and
/// symmetric; the engine does not verify this.
#[derive(Clone)]
pub struct EqualityPolicy {
    equals: Rc<dyn Fn(&Value, &Value) -> bool>,
}

impl EqualityPolicy {
    /// Loose value equality for scalars, identity for structured values.
    pub fn default_policy() -> Self {
        Self::from_fn(loose_eq)
    }

    pub fn from_fn(f: impl Fn(&Value, &Value) -> bool + 'static) -> Self {
        EqualityPolicy { equals: Rc::new(f) }
    }

    pub fn equals(&self, a: &Value, b: &Value) -> bool {
        (self.equals)(a, b)
    }
}

impl Default for EqualityPolicy {
    fn default() -> Self {
        Self::default_policy()
    }
}

/// Ordering half. `compare` must be a total order consistent with the
/// equality the caller intends; inconsistent policies produce undefined
/// operator ordering, not errors.
#[derive(Clone)]
pub struct OrderingPolicy {
    compare: Rc<dyn Fn(&Value, &Value) -> Ordering>,
}

impl OrderingPolicy {
    pub fn default_policy() -> Self {
        Self::from_fn(total_cmp)
    }

    pub fn from_fn(f: impl Fn(&Value, &Value) -> Ordering + 'static) -> Self {
        OrderingPolicy { compare: Rc::new(f) }
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        (self.compare)(a, b)
    }
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self::default_policy()
    }
}

//! Read-only wrapper over a list.
//!
//! Reads forward to the wrapped list; every mutating operation fails with
//! `Unsupported`. The wrapper shares the list's backing storage, so changes
//! made through the original list remain visible here.

use std::fmt;

use pullq_core::error::{Error, Result};
use pullq_core::seq::Sequence;
use pullq_core::value::Value;

use crate::list::List;

pub struct ReadOnlyView {
    list: List,
}

impl ReadOnlyView {
    pub fn new(list: List) -> Self {
        ReadOnlyView { list }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn is_read_only(&self) -> bool {
        true
    }

    pub fn item(&self, index: usize) -> Result<Value> {
        self.list.item(index)
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.list.contains(value)
    }

    pub fn index_of(&self, item: &Value) -> Option<usize> {
        self.list.index_of(item)
    }

    pub fn copy_to(&self, dest: &mut [Value], dest_index: usize) -> Result<()> {
        self.list.copy_to(dest, dest_index)
    }

    pub fn as_seq(&self) -> Sequence {
        self.list.as_seq()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.list.to_vec()
    }

    // Mutating surface: present, but always refused.

    pub fn add(&self, _item: Value) -> Result<()> {
        Err(Error::Unsupported)
    }

    pub fn set(&self, _index: usize, _value: Value) -> Result<()> {
        Err(Error::Unsupported)
    }

    pub fn insert(&self, _index: usize, _item: Value) -> Result<()> {
        Err(Error::Unsupported)
    }

    pub fn remove(&self, _item: &Value) -> Result<bool> {
        Err(Error::Unsupported)
    }

    pub fn remove_at(&self, _index: usize) -> Result<()> {
        Err(Error::Unsupported)
    }

    pub fn clear(&self) -> Result<()> {
        Err(Error::Unsupported)
    }
}

impl fmt::Display for ReadOnlyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.list)
    }
}

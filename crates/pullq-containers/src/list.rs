//! Mutable, index-addressable ordered collection.
//!
//! A `List` shares its backing vector with the sequence views it hands out,
//! so the whole operator library applies to a list through `as_seq()` and
//! observes the list's current contents. Composition, not inheritance.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use pullq_core::error::{Error, Result};
use pullq_core::policy::OrderingPolicy;
use pullq_core::seq::Sequence;
use pullq_core::value::{loose_eq, total_cmp, Value};

#[derive(Clone, Default)]
pub struct List {
    items: Rc<RefCell<Vec<Value>>>,
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the sequence into a fresh list.
    pub fn from_seq(seq: &Sequence) -> Self {
        let list = List::new();
        list.add_range(seq);
        list
    }

    pub fn from_values(items: Vec<Value>) -> Self {
        List {
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn is_read_only(&self) -> bool {
        false
    }

    /// Live sequence view over the current contents.
    pub fn as_seq(&self) -> Sequence {
        Sequence::from_shared(Rc::clone(&self.items))
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    pub fn as_read_only(&self) -> super::ReadOnlyView {
        super::ReadOnlyView::new(self.clone())
    }

    pub fn add(&self, item: Value) {
        self.items.borrow_mut().push(item);
    }

    pub fn add_range(&self, seq: &Sequence) {
        let mut cur = seq.cursor();
        while cur.advance() {
            if let Ok(v) = cur.read() {
                self.items.borrow_mut().push(v);
            }
        }
    }

    pub fn item(&self, index: usize) -> Result<Value> {
        self.items
            .borrow()
            .get(index)
            .cloned()
            .ok_or(Error::OutOfRange("index"))
    }

    pub fn set(&self, index: usize, value: Value) -> Result<()> {
        let mut items = self.items.borrow_mut();
        match items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::OutOfRange("index")),
        }
    }

    pub fn insert(&self, index: usize, item: Value) -> Result<()> {
        let mut items = self.items.borrow_mut();
        if index > items.len() {
            return Err(Error::OutOfRange("index"));
        }
        items.insert(index, item);
        Ok(())
    }

    pub fn insert_range(&self, index: usize, seq: &Sequence) -> Result<()> {
        if index > self.items.borrow().len() {
            return Err(Error::OutOfRange("index"));
        }
        let mut cur = seq.cursor();
        let mut offset = 0;
        while cur.advance() {
            if let Ok(v) = cur.read() {
                self.items.borrow_mut().insert(index + offset, v);
                offset += 1;
            }
        }
        Ok(())
    }

    /// Removes the first occurrence under loose equality.
    pub fn remove(&self, item: &Value) -> bool {
        match self.index_of(item) {
            Some(idx) => {
                self.items.borrow_mut().remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&self, index: usize) -> Result<()> {
        let mut items = self.items.borrow_mut();
        if index >= items.len() {
            return Err(Error::OutOfRange("index"));
        }
        items.remove(index);
        Ok(())
    }

    pub fn remove_range(&self, index: usize, count: usize) -> Result<()> {
        let mut items = self.items.borrow_mut();
        if index >= items.len() {
            return Err(Error::OutOfRange("index"));
        }
        if index + count > items.len() {
            return Err(Error::OutOfRange("count"));
        }
        items.drain(index..index + count);
        Ok(())
    }

    pub fn remove_all(&self, pred: impl Fn(&Value) -> bool) -> usize {
        let mut items = self.items.borrow_mut();
        let before = items.len();
        items.retain(|v| !pred(v));
        before - items.len()
    }

    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items.borrow().iter().any(|v| loose_eq(v, value))
    }

    pub fn exists(&self, pred: impl Fn(&Value) -> bool) -> bool {
        self.items.borrow().iter().any(|v| pred(v))
    }

    pub fn find(&self, pred: impl Fn(&Value) -> bool) -> Option<Value> {
        self.items.borrow().iter().find(|v| pred(v)).cloned()
    }

    pub fn find_all(&self, pred: impl Fn(&Value) -> bool) -> List {
        List::from_values(
            self.items
                .borrow()
                .iter()
                .filter(|v| pred(v))
                .cloned()
                .collect(),
        )
    }

    pub fn find_index(&self, pred: impl Fn(&Value) -> bool) -> Option<usize> {
        self.items.borrow().iter().position(|v| pred(v))
    }

    pub fn find_index_range(
        &self,
        start: usize,
        count: usize,
        pred: impl Fn(&Value) -> bool,
    ) -> Result<Option<usize>> {
        let items = self.items.borrow();
        check_scan_range(items.len(), start, count)?;
        Ok(items[start..start + count]
            .iter()
            .position(|v| pred(v))
            .map(|i| start + i))
    }

    pub fn find_last(&self, pred: impl Fn(&Value) -> bool) -> Option<Value> {
        self.items.borrow().iter().rev().find(|v| pred(v)).cloned()
    }

    pub fn find_last_index(&self, pred: impl Fn(&Value) -> bool) -> Option<usize> {
        self.items.borrow().iter().rposition(|v| pred(v))
    }

    pub fn find_last_index_range(
        &self,
        start: usize,
        count: usize,
        pred: impl Fn(&Value) -> bool,
    ) -> Result<Option<usize>> {
        let items = self.items.borrow();
        check_scan_range(items.len(), start, count)?;
        Ok(items[start..start + count]
            .iter()
            .rposition(|v| pred(v))
            .map(|i| start + i))
    }

    pub fn index_of(&self, item: &Value) -> Option<usize> {
        self.find_index(|v| loose_eq(v, item))
    }

    pub fn index_of_range(&self, item: &Value, start: usize, count: usize) -> Result<Option<usize>> {
        self.find_index_range(start, count, |v| loose_eq(v, item))
    }

    pub fn last_index_of(&self, item: &Value) -> Option<usize> {
        self.find_last_index(|v| loose_eq(v, item))
    }

    pub fn last_index_of_range(
        &self,
        item: &Value,
        start: usize,
        count: usize,
    ) -> Result<Option<usize>> {
        self.find_last_index_range(start, count, |v| loose_eq(v, item))
    }

    pub fn for_each(&self, f: impl FnMut(&Value)) {
        self.items.borrow().iter().for_each(f);
    }

    /// Empty lists satisfy nothing, matching the original semantics rather
    /// than the vacuous-truth convention.
    pub fn true_for_all(&self, pred: impl Fn(&Value) -> bool) -> bool {
        let items = self.items.borrow();
        !items.is_empty() && items.iter().all(|v| pred(v))
    }

    pub fn copy_to(&self, dest: &mut [Value], dest_index: usize) -> Result<()> {
        let len = self.len();
        self.copy_to_range(0, dest, dest_index, len)
    }

    pub fn copy_to_range(
        &self,
        index: usize,
        dest: &mut [Value],
        dest_index: usize,
        count: usize,
    ) -> Result<()> {
        let items = self.items.borrow();
        if index + count > items.len() {
            return Err(Error::OutOfRange("count"));
        }
        if dest_index + count > dest.len() {
            return Err(Error::OutOfRange("arrayIndex"));
        }
        for (i, v) in items[index..index + count].iter().enumerate() {
            dest[dest_index + i] = v.clone();
        }
        Ok(())
    }

    /// Shallow copy of a subrange.
    pub fn get_range(&self, index: usize, count: usize) -> Result<List> {
        let items = self.items.borrow();
        if index >= items.len() && !(index == 0 && count == 0) {
            return Err(Error::OutOfRange("index"));
        }
        if index + count > items.len() {
            return Err(Error::OutOfRange("count"));
        }
        Ok(List::from_values(items[index..index + count].to_vec()))
    }

    /// Binary search over a sorted list with the default ordering. Not-found
    /// results are the bitwise complement of the insertion point.
    pub fn binary_search(&self, item: &Value) -> isize {
        self.binary_search_by(item, &OrderingPolicy::default_policy())
    }

    pub fn binary_search_by(&self, item: &Value, policy: &OrderingPolicy) -> isize {
        let items = self.items.borrow();
        bsearch(&items, 0, items.len(), item, policy)
    }

    pub fn binary_search_range(
        &self,
        index: usize,
        count: usize,
        item: &Value,
        policy: &OrderingPolicy,
    ) -> Result<isize> {
        let items = self.items.borrow();
        if index + count > items.len() {
            return Err(Error::OutOfRange("count"));
        }
        Ok(bsearch(&items, index, count, item, policy))
    }

    /// In-place stable sort with the default ordering.
    pub fn sort(&self) {
        self.items.borrow_mut().sort_by(total_cmp);
    }

    pub fn sort_by(&self, policy: &OrderingPolicy) {
        self.items.borrow_mut().sort_by(|a, b| policy.compare(a, b));
    }

    pub fn sort_range(&self, index: usize, count: usize, policy: &OrderingPolicy) -> Result<()> {
        let mut items = self.items.borrow_mut();
        if index + count > items.len() {
            return Err(Error::OutOfRange("count"));
        }
        items[index..index + count].sort_by(|a, b| policy.compare(a, b));
        Ok(())
    }

    pub fn reverse(&self) {
        self.items.borrow_mut().reverse();
    }

    pub fn reverse_range(&self, index: usize, count: usize) -> Result<()> {
        let mut items = self.items.borrow_mut();
        if index + count > items.len() {
            return Err(Error::OutOfRange("count"));
        }
        items[index..index + count].reverse();
        Ok(())
    }
}

fn check_scan_range(len: usize, start: usize, count: usize) -> Result<()> {
    if len > 0 && start >= len {
        return Err(Error::OutOfRange("startIndex"));
    }
    if start + count > len {
        return Err(Error::OutOfRange("count"));
    }
    Ok(())
}

fn bsearch(items: &[Value], index: usize, count: usize, item: &Value, policy: &OrderingPolicy) -> isize {
    let mut left = index as isize;
    let mut right = index as isize + count as isize - 1;
    while left <= right {
        let middle = (left + right) / 2;
        match policy.compare(item, &items[middle as usize]) {
            Ordering::Greater => left = middle + 1,
            Ordering::Less => right = middle - 1,
            Ordering::Equal => return middle,
        }
    }
    !left
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = self.items.borrow();
        for (i, v) in items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(ns: &[i64]) -> List {
        List::from_values(ns.iter().map(|&n| Value::Int(n)).collect())
    }

    #[test]
    fn add_item_set_round_trip() {
        let list = List::new();
        list.add(Value::Int(1));
        list.add(Value::Int(2));
        assert_eq!(list.item(1), Ok(Value::Int(2)));
        list.set(1, Value::Int(9)).expect("in range");
        assert_eq!(list.item(1), Ok(Value::Int(9)));
        assert_eq!(list.item(5), Err(Error::OutOfRange("index")));
    }

    #[test]
    fn insert_and_remove() {
        let list = ints(&[1, 3]);
        list.insert(1, Value::Int(2)).expect("in range");
        assert_eq!(list.to_vec(), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert!(list.remove(&Value::Int(2)));
        assert!(!list.remove(&Value::Int(42)));
        list.remove_at(0).expect("in range");
        assert_eq!(list.to_vec(), vec![Value::Int(3)]);
        assert_eq!(list.insert(5, Value::Int(0)), Err(Error::OutOfRange("index")));
    }

    #[test]
    fn range_operations() {
        let list = ints(&[1, 2, 3, 4, 5]);
        let mid = list.get_range(1, 3).expect("in range");
        assert_eq!(mid.to_vec(), vec![Value::Int(2), Value::Int(3), Value::Int(4)]);
        list.remove_range(1, 3).expect("in range");
        assert_eq!(list.to_vec(), vec![Value::Int(1), Value::Int(5)]);
        assert_eq!(list.remove_range(1, 5), Err(Error::OutOfRange("count")));
    }

    #[test]
    fn remove_all_counts_removals() {
        let list = ints(&[1, 2, 3, 4, 5, 6]);
        let removed = list.remove_all(|v| matches!(v, Value::Int(n) if n % 2 == 0));
        assert_eq!(removed, 3);
        assert_eq!(list.to_vec(), vec![Value::Int(1), Value::Int(3), Value::Int(5)]);
    }

    #[test]
    fn find_family() {
        let list = ints(&[5, 8, 13, 8]);
        assert!(list.exists(|v| *v == Value::Int(13)));
        assert_eq!(list.find_index(|v| *v == Value::Int(8)), Some(1));
        assert_eq!(list.find_last_index(|v| *v == Value::Int(8)), Some(3));
        assert_eq!(list.index_of(&Value::Int(13)), Some(2));
        assert_eq!(list.index_of(&Value::Int(99)), None);
        assert_eq!(
            list.find_index_range(2, 2, |v| *v == Value::Int(8)).expect("in range"),
            Some(3)
        );
        assert_eq!(
            list.find_index_range(9, 1, |_| true),
            Err(Error::OutOfRange("startIndex"))
        );
    }

    #[test]
    fn true_for_all_is_false_on_empty() {
        assert!(!List::new().true_for_all(|_| true));
        assert!(ints(&[2, 4]).true_for_all(|v| matches!(v, Value::Int(n) if n % 2 == 0)));
    }

    #[test]
    fn sort_and_reverse_full_and_partial() {
        let list = ints(&[3, 1, 2]);
        list.sort();
        assert_eq!(list.to_vec(), vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        list.reverse();
        assert_eq!(list.to_vec(), vec![Value::Int(3), Value::Int(2), Value::Int(1)]);

        let list = ints(&[9, 4, 1, 7, 0]);
        list.sort_range(1, 3, &OrderingPolicy::default_policy()).expect("in range");
        assert_eq!(
            list.to_vec(),
            vec![Value::Int(9), Value::Int(1), Value::Int(4), Value::Int(7), Value::Int(0)]
        );
        list.reverse_range(0, 2).expect("in range");
        assert_eq!(list.item(0), Ok(Value::Int(1)));
        assert_eq!(list.item(1), Ok(Value::Int(9)));
    }

    #[test]
    fn binary_search_found_and_complement() {
        let list = ints(&[10, 20, 30, 40]);
        assert_eq!(list.binary_search(&Value::Int(30)), 2);
        // 25 would insert at index 2: complement convention.
        assert_eq!(list.binary_search(&Value::Int(25)), !2);
        assert_eq!(list.binary_search(&Value::Int(5)), !0);
        assert_eq!(list.binary_search(&Value::Int(99)), !4);
        assert_eq!(List::new().binary_search(&Value::Int(1)), !0);
    }

    #[test]
    fn binary_search_over_subrange() {
        let list = ints(&[99, 10, 20, 30, 99]);
        let policy = OrderingPolicy::default_policy();
        assert_eq!(list.binary_search_range(1, 3, &Value::Int(20), &policy), Ok(2));
        assert_eq!(list.binary_search_range(1, 3, &Value::Int(25), &policy), Ok(!3));
        assert_eq!(
            list.binary_search_range(3, 9, &Value::Int(1), &policy),
            Err(Error::OutOfRange("count"))
        );
    }

    #[test]
    fn copy_to_writes_into_destination() {
        let list = ints(&[1, 2, 3]);
        let mut dest = vec![Value::Null; 5];
        list.copy_to(&mut dest, 1).expect("fits");
        assert_eq!(dest[1], Value::Int(1));
        assert_eq!(dest[3], Value::Int(3));
        assert!(list.copy_to(&mut dest, 4).is_err());
    }

    #[test]
    fn sequence_view_is_live() {
        let list = ints(&[1]);
        let seq = list.as_seq();
        list.add(Value::Int(2));
        let mut cur = seq.cursor();
        let mut seen = 0;
        while cur.advance() {
            seen += 1;
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn display_joins_elements() {
        assert_eq!(ints(&[1, 2, 3]).to_string(), "1, 2, 3");
    }
}

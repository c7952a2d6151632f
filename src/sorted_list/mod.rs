//! An array-backed list that stays sorted under an injected comparator.
//!
//! [`SortedKeyList`] wraps a `Vec<T>` and guarantees that, between calls, the
//! elements are ordered by its [`KeyOrder`]. Read access is transparent via
//! `Deref<Target = [T]>`; every mutation goes through a method that preserves
//! the order.
//!
//! Two optional insertion gates can be configured:
//! - `unique`: reject values whose key already exists.
//! - `filter`: a predicate receiving the value and its binary-search position.

mod error;
mod order;

pub use error::SortedListError;
pub use order::{KeyOrder, NumericOrder, StringOrder};

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Insertion gate: `(value, bsearch position) -> accept?`.
pub type InsertFilter<T> = Arc<dyn Fn(&T, Option<usize>) -> bool + Send + Sync>;

/// A sorted, optionally unique list with binary-search insert and lookup.
///
/// # Performance
///
/// - `bsearch`, `key`: O(log n) (plus the length of an equal-key run for `key`).
/// - `insert_one`, `remove`: O(n) worst-case due to the element shift.
/// - Read access: O(1) via `Deref`.
#[derive(Clone)]
pub struct SortedKeyList<T, O> {
    items: Vec<T>,
    order: O,
    unique: bool,
    filter: Option<InsertFilter<T>>,
}

// ─────────────────────────────────────────────────────────────────────
// Constructors
// ─────────────────────────────────────────────────────────────────────

impl<T, O: KeyOrder<T>> SortedKeyList<T, O> {
    /// Creates an empty list ordered by `order`.
    pub fn new(order: O) -> Self {
        Self {
            items: Vec::new(),
            order,
            unique: false,
            filter: None,
        }
    }

    /// Rejects values whose key is already present.
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Installs an insertion filter.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&T, Option<usize>) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Builds a gate-free list by inserting every value one at a time.
    ///
    /// To seed through `unique` or `filter`, set them first and call
    /// [`seeded`](Self::seeded).
    pub fn from_values<I>(values: I, order: O) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::new(order).seeded(values)
    }

    /// Inserts `values` one at a time through the configured gates; rejected
    /// values are dropped.
    pub fn seeded<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.insert(values);
        self
    }

    /// Seeds the list with a single sort, without consulting `unique` or `filter`.
    ///
    /// Use this to resume from data that is known to be acceptable.
    pub fn from_unsorted(mut values: Vec<T>, order: O) -> Self {
        values.sort_by(|a, b| order.compare(a, b));
        Self {
            items: values,
            order,
            unique: false,
            filter: None,
        }
    }
}

impl<T, O: KeyOrder<T> + Default> Default for SortedKeyList<T, O> {
    fn default() -> Self {
        Self::new(O::default())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Lookup
// ─────────────────────────────────────────────────────────────────────

impl<T, O: KeyOrder<T>> SortedKeyList<T, O> {
    #[inline]
    fn cmp(&self, a: &T, b: &T) -> Ordering {
        self.order.compare(a, b)
    }

    /// Finds the "insert after" position for `value`.
    ///
    /// Returns the index of an element equal to `value` if one is hit, else the
    /// index of the rightmost element strictly less than `value`, else `None`
    /// when `value` sorts before every element (or the list is empty).
    /// Within a run of equal keys, which index is returned is unspecified.
    pub fn bsearch(&self, value: &T) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let mut lo = 0;
        let mut hi = self.items.len();
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            match self.cmp(value, &self.items[mid]) {
                Ordering::Equal => return Some(mid),
                Ordering::Greater => lo = mid,
                Ordering::Less => hi = mid,
            }
        }
        if lo == 0 && self.cmp(&self.items[0], value) == Ordering::Greater {
            None
        } else {
            Some(lo)
        }
    }

    fn key_from(&self, value: &T, found: Option<usize>) -> Option<usize> {
        let Some(mut pos) = found else {
            return self
                .items
                .first()
                .filter(|first| self.cmp(first, value) == Ordering::Equal)
                .map(|_| 0);
        };
        if self.cmp(&self.items[pos], value) == Ordering::Less {
            let next = pos + 1;
            return (next < self.items.len()
                && self.cmp(&self.items[next], value) == Ordering::Equal)
                .then_some(next);
        }
        while pos >= 1 && self.cmp(&self.items[pos - 1], value) == Ordering::Equal {
            pos -= 1;
        }
        Some(pos)
    }

    /// Returns the first index whose element compares equal to `value`.
    pub fn key(&self, value: &T) -> Option<usize> {
        self.key_from(value, self.bsearch(value))
    }

    /// Returns every index whose element compares equal to `value`, ascending.
    ///
    /// An empty vector means the key is absent.
    pub fn keys(&self, value: &T) -> Vec<usize> {
        let Some(found) = self.bsearch(value) else {
            return Vec::new();
        };
        let is_equal = |i: usize| self.cmp(&self.items[i], value) == Ordering::Equal;

        let mut first = found;
        if !is_equal(first) {
            return Vec::new();
        }
        while first > 0 && is_equal(first - 1) {
            first -= 1;
        }
        let mut last = found;
        while last + 1 < self.items.len() && is_equal(last + 1) {
            last += 1;
        }
        (first..=last).collect()
    }

    /// Returns true if an element with the same key as `value` exists.
    pub fn contains_key(&self, value: &T) -> bool {
        self.key(value).is_some()
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn order(&self) -> &O {
        &self.order
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Copies the elements out, in order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.clone()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

// ─────────────────────────────────────────────────────────────────────
// Mutation
// ─────────────────────────────────────────────────────────────────────

impl<T, O: KeyOrder<T>> SortedKeyList<T, O> {
    /// Inserts one value, keeping the list sorted.
    ///
    /// Returns the index the value landed at, or `None` if it was rejected by
    /// the `unique` gate or the filter. A rejected insert leaves the list
    /// untouched.
    pub fn insert_one(&mut self, value: T) -> Option<usize> {
        let found = self.bsearch(&value);
        if self.unique && self.key_from(&value, found).is_some() {
            return None;
        }
        if let Some(filter) = &self.filter {
            if !filter(&value, found) {
                return None;
            }
        }
        let index = found.map_or(0, |pos| pos + 1);
        self.items.insert(index, value);
        Some(index)
    }

    /// Inserts every value in order, returning each [`insert_one`](Self::insert_one) result.
    ///
    /// Each position reflects the list as mutated by the earlier values of
    /// the same batch.
    pub fn insert<I>(&mut self, values: I) -> Vec<Option<usize>>
    where
        I: IntoIterator<Item = T>,
    {
        values
            .into_iter()
            .map(|value| self.insert_one(value))
            .collect()
    }

    /// Removes and returns the element at `position`.
    pub fn remove(&mut self, position: usize) -> Result<T, SortedListError> {
        if position >= self.items.len() {
            return Err(SortedListError::PositionOutOfBounds {
                position,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(position))
    }

    /// Drops later duplicates of every equal-key run, in place.
    ///
    /// Returns how many elements were removed.
    pub fn dedup(&mut self) -> usize {
        let before = self.items.len();
        let order = &self.order;
        self.items
            .dedup_by(|later, earlier| order.compare(earlier, later) == Ordering::Equal);
        before - self.items.len()
    }

    /// Returns a copy holding the first element of every equal-key run.
    pub fn to_unique(&self) -> Self
    where
        T: Clone,
        O: Clone,
    {
        let mut copy = self.clone();
        copy.dedup();
        copy
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────
// Trait implementations
// ─────────────────────────────────────────────────────────────────────

impl<T, O> Deref for SortedKeyList<T, O> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T, O> IntoIterator for &'a SortedKeyList<T, O> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug, O> fmt::Debug for SortedKeyList<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedKeyList")
            .field("items", &self.items)
            .field("unique", &self.unique)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

//! Thread-safe handle around an [`IntervalTree`].

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::config::TreeConfig;
use super::error::IntervalTreeError;
use super::payload::Endpoints;
use super::tree::IntervalTree;
use crate::Id;

/// An [`IntervalTree`] behind a reader-writer lock.
///
/// Searches take the read lock and may run concurrently; `add` and `remove`
/// take the write lock, so the tree, the id map and the endpoint index are
/// always observed in a consistent state. Clones share the same tree.
#[derive(Debug)]
pub struct SharedIntervalTree<P> {
    inner: Arc<RwLock<IntervalTree<P>>>,
}

impl<P> Clone for SharedIntervalTree<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P> From<IntervalTree<P>> for SharedIntervalTree<P> {
    fn from(tree: IntervalTree<P>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }
}

impl<P: Endpoints> SharedIntervalTree<P> {
    pub fn new(center: f64) -> Result<Self, IntervalTreeError> {
        IntervalTree::new(center).map(Self::from)
    }

    pub fn with_config(center: f64, config: TreeConfig) -> Result<Self, IntervalTreeError> {
        IntervalTree::with_config(center, config).map(Self::from)
    }

    pub fn add(&self, payload: P) -> Result<Id, IntervalTreeError> {
        self.inner.write().add(payload)
    }

    pub fn add_with_id(&self, payload: P, id: impl Into<Id>) -> Result<Id, IntervalTreeError> {
        self.inner.write().add_with_id(payload, id)
    }
}

impl<P> SharedIntervalTree<P> {
    pub fn remove(&self, id: &str) -> Result<P, IntervalTreeError> {
        self.inner.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Ids of the intervals containing `point`.
    pub fn search_point_ids(&self, point: f64) -> Result<Vec<Id>, IntervalTreeError> {
        let tree = self.inner.read();
        let hits = tree.search_point(point)?;
        Ok(hits.into_iter().map(|hit| hit.id.clone()).collect())
    }

    /// Ids of the intervals overlapping `[start, end]`.
    pub fn search_range_ids(&self, start: f64, end: f64) -> Result<Vec<Id>, IntervalTreeError> {
        let tree = self.inner.read();
        let hits = tree.search_range(start, end)?;
        Ok(hits.into_iter().map(|hit| hit.id.clone()).collect())
    }

    /// Read access for queries that need payloads or coverage ratios.
    pub fn read(&self) -> RwLockReadGuard<'_, IntervalTree<P>> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, IntervalTree<P>> {
        self.inner.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn clones_share_one_tree() {
        let shared = SharedIntervalTree::new(50.0).unwrap();
        let other = shared.clone();
        shared.add_with_id([10.0, 20.0], "a").unwrap();
        assert_eq!(other.len(), 1);
        assert_eq!(other.search_point_ids(15.0).unwrap(), vec!["a"]);
    }

    #[test]
    fn read_guard_exposes_payloads() {
        let shared = SharedIntervalTree::new(0.0).unwrap();
        shared.add_with_id([-5.0, 5.0], "z").unwrap();
        let tree = shared.read();
        let hits = tree.search_range(-1.0, 1.0).unwrap();
        assert_eq!(hits[0].payload, &[-5.0, 5.0]);
        assert!((hits[0].query_coverage - 1.0).abs() < 1e-12);
    }

    #[test]
    fn concurrent_writers_and_readers() {
        let shared: SharedIntervalTree<[f64; 2]> = SharedIntervalTree::new(500.0).unwrap();
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let tree = shared.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        let start = (w * 50 + i) as f64 * 5.0;
                        tree.add([start, start + 2.0]).unwrap();
                    }
                })
            })
            .collect();
        let reader = {
            let tree = shared.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    tree.search_range_ids(0.0, 1_000.0).unwrap();
                }
            })
        };
        for handle in writers {
            handle.join().unwrap();
        }
        reader.join().unwrap();

        assert_eq!(shared.len(), 200);
        assert_eq!(shared.search_range_ids(0.0, 1_000.0).unwrap().len(), 200);
        assert_eq!(shared.read().stats().endpoints, 400);
    }

    #[test]
    fn remove_through_handle() {
        let shared = SharedIntervalTree::new(10.0).unwrap();
        let id = shared.add([1.0, 2.0]).unwrap();
        assert_eq!(shared.remove(&id).unwrap(), [1.0, 2.0]);
        assert!(shared.is_empty());
        assert_eq!(
            shared.remove(&id),
            Err(IntervalTreeError::NotFound(id.clone()))
        );
    }
}

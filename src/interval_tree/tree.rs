use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::config::{IdStrategy, TreeConfig};
use super::error::IntervalTreeError;
use super::node::{IntervalNode, NodeEntry};
use super::payload::Endpoints;
use super::record::{midpoint, IntervalRecord, RangeHit, SearchHit};
use crate::sorted_list::SortedKeyList;
use crate::{generate_id, Id};

/// One endpoint of a registered interval, as kept in the endpoint index.
#[derive(Debug, Clone, PartialEq)]
struct Endpoint {
    coordinate: f64,
    id: Id,
}

impl Endpoint {
    fn probe(coordinate: f64) -> Self {
        Self {
            coordinate,
            id: Id::new(),
        }
    }
}

type EndpointOrder = fn(&Endpoint, &Endpoint) -> Ordering;

fn by_coordinate(a: &Endpoint, b: &Endpoint) -> Ordering {
    a.coordinate.total_cmp(&b.coordinate)
}

/// Shape summary of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub intervals: usize,
    pub endpoints: usize,
    pub nodes: usize,
    pub depth: usize,
}

/// Centered interval tree over numeric intervals, with a sorted endpoint index.
///
/// Point queries walk the tree from the root. Range queries probe the tree at
/// the window midpoint and add every interval with an endpoint inside the
/// window, found by binary search in the endpoint index.
///
/// # Internal Structure
/// - `root`: centered tree; each node stores the intervals spanning its center
/// - `records`: `HashMap` from id to [`IntervalRecord`]
/// - `point_index`: [`SortedKeyList`] of `(coordinate, id)`, two per interval
///
/// # Complexity
/// - `add`: O(depth + n) (list insertion shifts)
/// - `remove`: O(depth + n)
/// - `search_point`: O(depth + k)
/// - `search_range`: O(depth + log n + m) where m is the number of endpoints
///   inside the window
///
/// The tree never rebalances. Inserting disjoint intervals in increasing order
/// yields depth O(n); [`stats`](Self::stats) exposes the current depth.
///
/// # Examples
///
/// ```
/// use timephase::IntervalTree;
///
/// let mut tree = IntervalTree::new(50.0).unwrap();
/// tree.add_with_id([10.0, 20.0], "a").unwrap();
/// tree.add_with_id([15.0, 60.0], "b").unwrap();
/// tree.add_with_id([70.0, 90.0], "c").unwrap();
/// tree.add_with_id([45.0, 55.0], "d").unwrap();
///
/// let mut at_50: Vec<_> = tree.search_point(50.0).unwrap().iter().map(|h| h.id.clone()).collect();
/// at_50.sort();
/// assert_eq!(at_50, ["b", "d"]);
///
/// let window = tree.search_range(12.0, 18.0).unwrap();
/// assert_eq!(window.len(), 2);
///
/// assert!(tree.search_range(0.0, 5.0).unwrap().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct IntervalTree<P> {
    root: IntervalNode,
    records: HashMap<Id, IntervalRecord<P>>,
    point_index: SortedKeyList<Endpoint, EndpointOrder>,
    next_auto_id: u64,
    config: TreeConfig,
}

impl<P: Endpoints> IntervalTree<P> {
    /// Creates an empty tree whose root node is centered at `center`.
    ///
    /// The root center is fixed for the tree's lifetime; pick a value near the
    /// middle of the expected data.
    pub fn new(center: f64) -> Result<Self, IntervalTreeError> {
        Self::with_config(center, TreeConfig::default())
    }

    pub fn with_config(center: f64, config: TreeConfig) -> Result<Self, IntervalTreeError> {
        if !center.is_finite() {
            return Err(IntervalTreeError::Configuration(format!(
                "center must be a finite number, got {center}"
            )));
        }
        Ok(Self {
            root: IntervalNode::new(center),
            records: HashMap::new(),
            point_index: SortedKeyList::new(by_coordinate as EndpointOrder),
            next_auto_id: 0,
            config,
        })
    }

    fn next_id(&self) -> (Id, u64) {
        match self.config.id_strategy {
            IdStrategy::Sequential => {
                let mut n = self.next_auto_id;
                while self.records.contains_key(&n.to_string()) {
                    n += 1;
                }
                (n.to_string(), n + 1)
            }
            IdStrategy::Uuid => {
                let mut id = generate_id();
                while self.records.contains_key(&id) {
                    id = generate_id();
                }
                (id, self.next_auto_id)
            }
        }
    }

    /// Registers `payload` under a generated id and returns that id.
    ///
    /// Fails with [`IntervalTreeError::InvalidInterval`] if the payload does
    /// not describe an interval with `start < end`; the tree is unchanged.
    pub fn add(&mut self, payload: P) -> Result<Id, IntervalTreeError> {
        let (id, next_auto_id) = self.next_id();
        let id = self.insert_record(payload, id)?;
        self.next_auto_id = next_auto_id;
        Ok(id)
    }

    /// Registers `payload` under `id`.
    ///
    /// Requires:
    /// - `id` not already present
    /// - the payload describes an interval with finite `start < end`
    pub fn add_with_id(&mut self, payload: P, id: impl Into<Id>) -> Result<Id, IntervalTreeError> {
        let id: Id = id.into();
        if self.records.contains_key(&id) {
            return Err(IntervalTreeError::DuplicateId(id));
        }
        self.insert_record(payload, id)
    }

    fn insert_record(&mut self, payload: P, id: Id) -> Result<Id, IntervalTreeError> {
        let record =
            IntervalRecord::new(payload, id, &self.config.start_key, &self.config.end_key)?;
        let (start, end) = (record.start(), record.end());
        let id = record.id().clone();

        self.point_index.insert([
            Endpoint {
                coordinate: start,
                id: id.clone(),
            },
            Endpoint {
                coordinate: end,
                id: id.clone(),
            },
        ]);
        let depth = self.root.place(NodeEntry {
            start,
            end,
            id: id.clone(),
        });
        if depth >= self.config.depth_warning {
            log::warn!(
                "interval {id} placed at depth {depth}; the tree is not rebalanced, consider a root center nearer the data"
            );
        }
        log::debug!("added interval {record} at depth {depth}");
        self.records.insert(id.clone(), record);
        Ok(id)
    }
}

impl<P> IntervalTree<P> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn center(&self) -> f64 {
        self.root.center()
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn root(&self) -> &IntervalNode {
        &self.root
    }

    /// Returns true if an interval with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&IntervalRecord<P>> {
        self.records.get(id)
    }

    /// Iterates over all records, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &IntervalRecord<P>> + '_ {
        self.records.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &Id> + '_ {
        self.records.keys()
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            intervals: self.records.len(),
            endpoints: self.point_index.len(),
            nodes: self.root.node_count(),
            depth: self.root.depth(),
        }
    }

    /// Removes every interval, keeping the root center and configuration.
    pub fn clear(&mut self) {
        self.root = IntervalNode::new(self.root.center());
        self.records.clear();
        self.point_index.clear();
        self.next_auto_id = 0;
    }

    fn check_coordinate(value: f64) -> Result<f64, IntervalTreeError> {
        if value.is_nan() {
            Err(IntervalTreeError::NaNCoordinate)
        } else {
            Ok(value)
        }
    }

    fn ids_containing(&self, point: f64) -> Vec<&Id> {
        let mut ids = Vec::new();
        let mut node = Some(&self.root);
        while let Some(current) = node {
            node = current.collect_containing(point, &mut ids);
        }
        ids
    }

    /// Finds every interval containing `point` (bounds included).
    ///
    /// Order follows the tree walk and is stable between calls.
    pub fn search_point(&self, point: f64) -> Result<Vec<SearchHit<'_, P>>, IntervalTreeError> {
        let point = Self::check_coordinate(point)?;
        log::trace!("point search at {point}");
        Ok(self
            .ids_containing(point)
            .into_iter()
            .filter_map(|id| self.records.get(id))
            .map(IntervalRecord::hit)
            .collect())
    }

    /// Index range of endpoints whose coordinate lies in `[start, end]`.
    fn endpoint_window(&self, start: f64, end: f64) -> std::ops::Range<usize> {
        let index = &self.point_index;
        let low_probe = Endpoint::probe(start);
        let first = match index.key(&low_probe) {
            Some(i) => i,
            None => index.bsearch(&low_probe).map_or(0, |i| i + 1),
        };
        let high_probe = Endpoint::probe(end);
        let past_last = match index.keys(&high_probe).last() {
            Some(&i) => i + 1,
            None => index.bsearch(&high_probe).map_or(0, |i| i + 1),
        };
        first..past_last.max(first)
    }

    /// Finds every interval overlapping `[start, end]`, with coverage ratios.
    ///
    /// Intervals that only touch the window at `start` or `end` are not
    /// reported. Fails with [`IntervalTreeError::InvalidRange`] unless
    /// `start < end`.
    pub fn search_range(
        &self,
        start: f64,
        end: f64,
    ) -> Result<Vec<RangeHit<'_, P>>, IntervalTreeError> {
        let start = Self::check_coordinate(start)?;
        let end = Self::check_coordinate(end)?;
        if end <= start {
            return Err(IntervalTreeError::InvalidRange { start, end });
        }
        log::trace!("range search over [{start}, {end}]");

        // Intervals spanning the whole window contain its midpoint.
        let mut candidates = self.ids_containing(midpoint(start, end));
        // The rest have at least one endpoint inside the window.
        candidates.extend(
            self.point_index[self.endpoint_window(start, end)]
                .iter()
                .map(|e| &e.id),
        );

        let mut seen: HashSet<&str> = HashSet::with_capacity(candidates.len());
        Ok(candidates
            .into_iter()
            .filter(|&id| seen.insert(id.as_str()))
            .filter_map(|id| self.records.get(id))
            .filter(|record| record.overlaps(start, end))
            .map(|record| record.hit_within(start, end))
            .collect())
    }

    /// Removes the interval `id` and returns its payload.
    ///
    /// The record leaves the id map, the endpoint index and its tree node;
    /// nodes left empty without children are pruned.
    pub fn remove(&mut self, id: &str) -> Result<P, IntervalTreeError> {
        let record = self
            .records
            .remove(id)
            .ok_or_else(|| IntervalTreeError::NotFound(id.to_string()))?;

        for coordinate in [record.start(), record.end()] {
            let position = self
                .point_index
                .keys(&Endpoint::probe(coordinate))
                .into_iter()
                .find(|&i| self.point_index[i].id == id);
            if let Some(position) = position {
                self.point_index.remove(position)?;
            }
        }
        let detached = self.root.remove(record.start(), record.end(), id);
        debug_assert!(detached, "interval {id} missing from its tree node");
        log::debug!("removed interval {record}");
        Ok(record.into_payload())
    }
}

//! Nodes of the centered interval tree.

use std::cmp::Ordering;
use std::fmt;

use super::record::midpoint;
use crate::sorted_list::SortedKeyList;
use crate::Id;

/// What a node keeps about each interval it stores.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeEntry {
    pub(crate) start: f64,
    pub(crate) end: f64,
    pub(crate) id: Id,
}

impl NodeEntry {
    fn midpoint(&self) -> f64 {
        midpoint(self.start, self.end)
    }
}

type EntryOrder = fn(&NodeEntry, &NodeEntry) -> Ordering;

fn by_start(a: &NodeEntry, b: &NodeEntry) -> Ordering {
    a.start.total_cmp(&b.start)
}

fn by_end_descending(a: &NodeEntry, b: &NodeEntry) -> Ordering {
    b.end.total_cmp(&a.end)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One node of a centered interval tree.
///
/// Every interval stored directly at a node contains its `center`. Intervals
/// that end before the center live in the left subtree, intervals that start
/// after it in the right subtree.
///
/// Ordered insertion can grow the tree into a chain, so every walk over it
/// (drop and clone included) uses an explicit stack instead of recursion.
pub struct IntervalNode {
    center: f64,
    start_order: SortedKeyList<NodeEntry, EntryOrder>,
    end_order: SortedKeyList<NodeEntry, EntryOrder>,
    left: Option<Box<IntervalNode>>,
    right: Option<Box<IntervalNode>>,
}

impl IntervalNode {
    pub(crate) fn new(center: f64) -> Self {
        Self {
            center,
            start_order: SortedKeyList::new(by_start as EntryOrder),
            end_order: SortedKeyList::new(by_end_descending as EntryOrder),
            left: None,
            right: None,
        }
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn left(&self) -> Option<&IntervalNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&IntervalNode> {
        self.right.as_deref()
    }

    /// Number of intervals stored at this node (children excluded).
    pub fn len(&self) -> usize {
        self.start_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_order.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Ids of the intervals stored at this node, by ascending start.
    pub fn ids(&self) -> impl Iterator<Item = &Id> + '_ {
        self.start_order.iter().map(|e| &e.id)
    }

    fn children(&self) -> impl Iterator<Item = &IntervalNode> + '_ {
        self.left().into_iter().chain(self.right())
    }

    fn child(&self, side: Side) -> Option<&IntervalNode> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    fn slot_mut(&mut self, side: Side) -> &mut Option<Box<IntervalNode>> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn descend_mut(&mut self, path: &[Side]) -> Option<&mut IntervalNode> {
        let mut node = self;
        for &side in path {
            node = node.slot_mut(side).as_deref_mut()?;
        }
        Some(node)
    }

    /// Depth of the subtree rooted here; a lone node has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Number of nodes in the subtree rooted here.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }

    /// Stores `entry` here. The caller guarantees `start <= center <= end`.
    pub(crate) fn insert(&mut self, entry: NodeEntry) {
        debug_assert!(entry.start <= self.center && self.center <= entry.end);
        self.start_order.insert_one(entry.clone());
        self.end_order.insert_one(entry);
    }

    fn child_or_insert(&mut self, side: Side, center: f64) -> &mut IntervalNode {
        let parent = self.center;
        self.slot_mut(side).get_or_insert_with(|| {
            log::debug!("creating {side:?} child at {center} under node {parent}");
            Box::new(IntervalNode::new(center))
        })
    }

    /// Descends from this node to the one whose center lies inside `entry`,
    /// creating missing children at the entry's midpoint, and stores it there.
    ///
    /// Returns how many edges were followed.
    pub(crate) fn place(&mut self, entry: NodeEntry) -> usize {
        let mut node = self;
        let mut depth = 0;
        loop {
            let side = if entry.end < node.center {
                Side::Left
            } else if node.center < entry.start {
                Side::Right
            } else {
                node.insert(entry);
                return depth;
            };
            node = node.child_or_insert(side, entry.midpoint());
            depth += 1;
        }
    }

    /// Pushes every interval of this node containing `point`, then returns
    /// the child that may hold more, if any.
    pub(crate) fn collect_containing<'a>(
        &'a self,
        point: f64,
        out: &mut Vec<&'a Id>,
    ) -> Option<&'a IntervalNode> {
        match point.partial_cmp(&self.center) {
            Some(Ordering::Less) => {
                out.extend(
                    self.start_order
                        .iter()
                        .take_while(|e| e.start <= point)
                        .map(|e| &e.id),
                );
                self.left()
            }
            Some(Ordering::Greater) => {
                out.extend(
                    self.end_order
                        .iter()
                        .take_while(|e| e.end >= point)
                        .map(|e| &e.id),
                );
                self.right()
            }
            // Every stored interval contains the center.
            _ => {
                out.extend(self.ids());
                None
            }
        }
    }

    fn remove_here(&mut self, start: f64, end: f64, id: &str) -> bool {
        let probe = NodeEntry {
            start,
            end,
            id: Id::new(),
        };
        let in_starts = self
            .start_order
            .keys(&probe)
            .into_iter()
            .find(|&i| self.start_order[i].id == id);
        let in_ends = self
            .end_order
            .keys(&probe)
            .into_iter()
            .find(|&i| self.end_order[i].id == id);
        match (in_starts, in_ends) {
            (Some(s), Some(e)) => {
                self.start_order.remove(s).is_ok() && self.end_order.remove(e).is_ok()
            }
            _ => false,
        }
    }

    /// Removes the interval `id` spanning `[start, end]` from this subtree.
    ///
    /// Follows the same path as [`place`](Self::place), so no other branch
    /// is visited. Nodes left empty and childless are pruned afterwards.
    pub(crate) fn remove(&mut self, start: f64, end: f64, id: &str) -> bool {
        let mut path = Vec::new();
        let mut node = &*self;
        loop {
            let side = if end < node.center {
                Side::Left
            } else if node.center < start {
                Side::Right
            } else {
                break;
            };
            let Some(child) = node.child(side) else {
                return false;
            };
            path.push(side);
            node = child;
        }
        let removed = self
            .descend_mut(&path)
            .is_some_and(|target| target.remove_here(start, end, id));
        if removed {
            self.prune(&path);
        }
        removed
    }

    /// Cuts off the trailing run of nodes on `path` that hold no intervals
    /// and no children besides the next node on the path.
    fn prune(&mut self, path: &[Side]) {
        let mut cut = None;
        let mut node = &*self;
        for (i, &side) in path.iter().enumerate() {
            let Some(child) = node.child(side) else {
                return;
            };
            let hollow = child.is_empty()
                && match path.get(i + 1) {
                    Some(&next) => child.child(next.opposite()).is_none(),
                    None => child.is_leaf(),
                };
            cut = match (hollow, cut) {
                (false, _) => None,
                (true, None) => Some(i),
                (true, kept) => kept,
            };
            node = child;
        }
        let Some(i) = cut else {
            return;
        };
        if let Some(parent) = self.descend_mut(&path[..i]) {
            log::debug!(
                "pruning {} empty node(s) under node {}",
                path.len() - i,
                parent.center
            );
            *parent.slot_mut(path[i]) = None;
        }
    }
}

impl Drop for IntervalNode {
    fn drop(&mut self) {
        let mut stack: Vec<Box<IntervalNode>> =
            self.left.take().into_iter().chain(self.right.take()).collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl Clone for IntervalNode {
    fn clone(&self) -> Self {
        // Post-order: a node is copied once both of its subtrees are on `built`.
        let mut pending = vec![(self, false)];
        let mut built: Vec<IntervalNode> = Vec::new();
        while let Some((node, children_ready)) = pending.pop() {
            if !children_ready {
                pending.push((node, true));
                pending.extend(node.children().map(|child| (child, false)));
                continue;
            }
            // Children were pushed left then right, so the left copy is on top.
            let left = node.left.as_ref().and_then(|_| built.pop()).map(Box::new);
            let right = node.right.as_ref().and_then(|_| built.pop()).map(Box::new);
            built.push(IntervalNode {
                center: node.center,
                start_order: node.start_order.clone(),
                end_order: node.end_order.clone(),
                left,
                right,
            });
        }
        built.pop().unwrap_or_else(|| IntervalNode::new(self.center))
    }
}

impl fmt::Debug for IntervalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalNode")
            .field("center", &self.center)
            .field("ids", &self.ids().collect::<Vec<_>>())
            .field("left", &self.left().map(IntervalNode::center))
            .field("right", &self.right().map(IntervalNode::center))
            .field("nodes", &self.node_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: f64, end: f64, id: &str) -> NodeEntry {
        NodeEntry {
            start,
            end,
            id: id.to_string(),
        }
    }

    fn containing(root: &IntervalNode, point: f64) -> Vec<String> {
        let mut out = Vec::new();
        let mut node = Some(root);
        while let Some(current) = node {
            node = current.collect_containing(point, &mut out);
        }
        let mut ids: Vec<String> = out.into_iter().cloned().collect();
        ids.sort();
        ids
    }

    #[test]
    fn insert_keeps_both_orderings() {
        let mut node = IntervalNode::new(50.0);
        node.insert(entry(40.0, 60.0, "a"));
        node.insert(entry(10.0, 90.0, "b"));
        node.insert(entry(45.0, 55.0, "c"));

        let starts: Vec<f64> = node.start_order.iter().map(|e| e.start).collect();
        let ends: Vec<f64> = node.end_order.iter().map(|e| e.end).collect();
        assert_eq!(starts, vec![10.0, 40.0, 45.0]);
        assert_eq!(ends, vec![90.0, 60.0, 55.0]);
        assert_eq!(node.len(), 3);
    }

    #[test]
    fn place_routes_by_center() {
        let mut root = IntervalNode::new(50.0);
        assert_eq!(root.place(entry(45.0, 55.0, "mid")), 0);
        assert_eq!(root.place(entry(10.0, 20.0, "low")), 1);
        assert_eq!(root.place(entry(70.0, 90.0, "high")), 1);

        assert_eq!(root.len(), 1);
        let left = root.left().unwrap();
        assert_eq!(left.center(), 15.0);
        assert_eq!(left.ids().collect::<Vec<_>>(), vec!["low"]);
        assert_eq!(root.right().unwrap().center(), 80.0);
        assert_eq!(root.depth(), 2);
        assert_eq!(root.node_count(), 3);
    }

    #[test]
    fn intervals_touching_center_stay_at_node() {
        let mut root = IntervalNode::new(50.0);
        assert_eq!(root.place(entry(40.0, 50.0, "ends-at")), 0);
        assert_eq!(root.place(entry(50.0, 60.0, "starts-at")), 0);
        assert_eq!(root.len(), 2);
        assert!(root.is_leaf());
    }

    #[test]
    fn collect_containing_uses_orderings() {
        let mut root = IntervalNode::new(50.0);
        root.place(entry(10.0, 20.0, "a"));
        root.place(entry(15.0, 60.0, "b"));
        root.place(entry(70.0, 90.0, "c"));
        root.place(entry(45.0, 55.0, "d"));

        assert_eq!(containing(&root, 50.0), vec!["b", "d"]);
        assert_eq!(containing(&root, 17.0), vec!["a", "b"]);
        assert_eq!(containing(&root, 58.0), vec!["b"]);
        assert_eq!(containing(&root, 80.0), vec!["c"]);
        assert!(containing(&root, 5.0).is_empty());
    }

    #[test]
    fn remove_prunes_empty_leaves() {
        let mut root = IntervalNode::new(50.0);
        root.place(entry(10.0, 20.0, "a"));
        root.place(entry(12.0, 14.0, "b"));
        assert_eq!(root.depth(), 3);

        assert!(root.remove(12.0, 14.0, "b"));
        assert_eq!(root.depth(), 2);
        assert!(!root.remove(12.0, 14.0, "b"));

        assert!(root.remove(10.0, 20.0, "a"));
        assert!(root.left().is_none());
        assert!(root.is_empty());
    }

    /// Right-leaning chain of `len` nodes centered at 0, 1, 2, ... with one
    /// interval at the bottom.
    fn chain(len: usize) -> IntervalNode {
        let last = (len - 1) as f64;
        let mut node = IntervalNode::new(last);
        node.insert(entry(last - 0.25, last + 0.25, "bottom"));
        for center in (0..len - 1).rev() {
            let mut parent = IntervalNode::new(center as f64);
            parent.right = Some(Box::new(node));
            node = parent;
        }
        node
    }

    #[test]
    fn deep_chain_is_walked_without_recursion() {
        const LEN: usize = 100_000;
        let root = chain(LEN);
        assert_eq!(root.depth(), LEN);
        assert_eq!(root.node_count(), LEN);

        let copy = root.clone();
        assert_eq!(copy.node_count(), LEN);
        assert_eq!(containing(&copy, (LEN - 1) as f64), vec!["bottom"]);
        drop(copy);
        drop(root);
    }

    #[test]
    fn removing_from_deep_chain_prunes_whole_run() {
        const LEN: usize = 100_000;
        let mut root = chain(LEN);
        let last = (LEN - 1) as f64;
        assert!(root.remove(last - 0.25, last + 0.25, "bottom"));
        assert!(root.is_leaf());
        assert_eq!(root.node_count(), 1);
    }

    #[test]
    fn prune_stops_at_node_with_other_child() {
        let mut root = IntervalNode::new(50.0);
        root.place(entry(10.0, 20.0, "a"));
        root.place(entry(12.0, 14.0, "b"));
        root.place(entry(16.0, 18.0, "c"));
        assert!(root.remove(10.0, 20.0, "a"));
        assert_eq!(root.node_count(), 4);

        assert!(root.remove(12.0, 14.0, "b"));
        assert_eq!(root.node_count(), 3);
        assert!(root.remove(16.0, 18.0, "c"));
        assert_eq!(root.node_count(), 1);
    }

    #[test]
    fn remove_matches_id_among_equal_keys() {
        let mut root = IntervalNode::new(5.0);
        root.place(entry(0.0, 10.0, "x"));
        root.place(entry(0.0, 10.0, "y"));

        assert!(root.remove(0.0, 10.0, "y"));
        assert_eq!(root.ids().collect::<Vec<_>>(), vec!["x"]);
        assert!(!root.remove(0.0, 10.0, "z"));
    }
}

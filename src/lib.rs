//! timephase - centered interval tree for time-phase range queries
//!
//! A Gantt-style view needs to know which bars overlap the visible time
//! window, or which bars sit under the cursor. This crate provides the data
//! structure behind those questions:
//!
//! - [`sorted_list::SortedKeyList`]: a binary-search list kept ordered by an
//!   injected comparator.
//! - [`interval_tree::IntervalTree`]: a centered interval tree with a global
//!   sorted endpoint index for point and range queries.

pub mod interval_tree;
pub mod sorted_list;

pub use interval_tree::{IntervalTree, IntervalTreeError, SharedIntervalTree, TreeConfig};
pub use sorted_list::SortedKeyList;

/// Identifier type used for intervals.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

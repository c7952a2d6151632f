//! Centered interval tree with a sorted endpoint index.
//!
//! An [`IntervalTree`] stores numeric intervals taken from caller payloads and
//! answers two questions:
//!
//! - which intervals contain a point ([`IntervalTree::search_point`]), and
//! - which intervals overlap a window ([`IntervalTree::search_range`]), with
//!   the fraction of the window and of each interval that the overlap covers.
//!
//! The tree is built from a fixed root center and never rebalances. For shared
//! use across threads wrap it in a [`SharedIntervalTree`].

mod config;
mod error;
mod node;
mod payload;
mod record;
mod shared;
mod tree;

pub use config::{IdStrategy, TreeConfig};
pub use error::{IntervalFault, IntervalTreeError};
pub use node::IntervalNode;
pub use payload::{Endpoints, FieldKey};
pub use record::{IntervalRecord, RangeHit, SearchHit};
pub use shared::SharedIntervalTree;
pub use tree::{IntervalTree, TreeStats};

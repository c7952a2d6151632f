//! Extraction of interval endpoints from caller payloads.
//!
//! The tree never interprets payloads beyond two numeric fields. Which fields
//! those are is configured with a pair of [`FieldKey`]s (positional indices
//! `0` and `1` by default), and a payload type opts in by implementing
//! [`Endpoints`].

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Range;

use qtty::{Quantity, Unit};

/// Selects one numeric field of a payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldKey {
    /// Position in an array-like payload.
    Index(usize),
    /// Name in a record-like payload.
    Name(String),
}

impl From<usize> for FieldKey {
    fn from(index: usize) -> Self {
        FieldKey::Index(index)
    }
}

impl From<&str> for FieldKey {
    fn from(name: &str) -> Self {
        FieldKey::Name(name.to_string())
    }
}

impl From<String> for FieldKey {
    fn from(name: String) -> Self {
        FieldKey::Name(name)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Index(i) => write!(f, "index {i}"),
            FieldKey::Name(name) => write!(f, "field `{name}`"),
        }
    }
}

/// A payload carrying numeric interval endpoints.
///
/// Returning `None` means the field does not exist or is not a number; the
/// tree reports that as an invalid interval.
///
/// ```
/// use timephase::interval_tree::{Endpoints, FieldKey};
///
/// struct Bar {
///     row: usize,
///     begin: f64,
///     finish: f64,
/// }
///
/// impl Endpoints for Bar {
///     fn coordinate(&self, key: &FieldKey) -> Option<f64> {
///         match key {
///             FieldKey::Name(n) if n == "begin" => Some(self.begin),
///             FieldKey::Name(n) if n == "finish" => Some(self.finish),
///             _ => None,
///         }
///     }
/// }
///
/// let bar = Bar { row: 3, begin: 1.0, finish: 4.0 };
/// assert_eq!(bar.coordinate(&"finish".into()), Some(4.0));
/// assert_eq!(bar.coordinate(&FieldKey::Index(0)), None);
/// # let _ = bar.row;
/// ```
pub trait Endpoints {
    fn coordinate(&self, key: &FieldKey) -> Option<f64>;
}

impl<T: Endpoints + ?Sized> Endpoints for &T {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        (**self).coordinate(key)
    }
}

impl<T: Endpoints + ?Sized> Endpoints for Box<T> {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        (**self).coordinate(key)
    }
}

impl Endpoints for [f64] {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        match key {
            FieldKey::Index(i) => self.get(*i).copied(),
            FieldKey::Name(_) => None,
        }
    }
}

impl<const N: usize> Endpoints for [f64; N] {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        self.as_slice().coordinate(key)
    }
}

impl Endpoints for Vec<f64> {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        self.as_slice().coordinate(key)
    }
}

impl Endpoints for (f64, f64) {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        match key {
            FieldKey::Index(0) => Some(self.0),
            FieldKey::Index(1) => Some(self.1),
            _ => None,
        }
    }
}

/// `start`/`end` are reachable by position (`0`, `1`) and by name.
impl Endpoints for Range<f64> {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        match key {
            FieldKey::Index(0) => Some(self.start),
            FieldKey::Index(1) => Some(self.end),
            FieldKey::Name(n) if n == "start" => Some(self.start),
            FieldKey::Name(n) if n == "end" => Some(self.end),
            _ => None,
        }
    }
}

impl<S: std::hash::BuildHasher> Endpoints for HashMap<String, f64, S> {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        match key {
            FieldKey::Name(name) => self.get(name).copied(),
            FieldKey::Index(_) => None,
        }
    }
}

impl Endpoints for BTreeMap<String, f64> {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        match key {
            FieldKey::Name(name) => self.get(name).copied(),
            FieldKey::Index(_) => None,
        }
    }
}

/// Quantities are indexed by their raw value in `U`; mixing units inside one
/// tree is the caller's responsibility.
impl<U: Unit> Endpoints for (Quantity<U>, Quantity<U>) {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        match key {
            FieldKey::Index(0) => Some(self.0.value()),
            FieldKey::Index(1) => Some(self.1.value()),
            _ => None,
        }
    }
}

impl<U: Unit, const N: usize> Endpoints for [Quantity<U>; N] {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        match key {
            FieldKey::Index(i) => self.get(*i).map(|q| q.value()),
            FieldKey::Name(_) => None,
        }
    }
}

#[cfg(feature = "serde")]
impl Endpoints for serde_json::Value {
    fn coordinate(&self, key: &FieldKey) -> Option<f64> {
        match key {
            FieldKey::Index(i) => self.get(*i)?.as_f64(),
            FieldKey::Name(name) => self.get(name.as_str())?.as_f64(),
        }
    }
}

use thiserror::Error;

use super::payload::FieldKey;
use crate::sorted_list::SortedListError;
use crate::Id;

/// Why a payload could not be turned into an interval.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntervalFault {
    #[error("no numeric value at {0}")]
    MissingField(FieldKey),

    #[error("value at {field} is not finite: {value}")]
    NotFinite { field: FieldKey, value: f64 },

    #[error("start ({start}) must be smaller than end ({end})")]
    NotIncreasing { start: f64, end: f64 },
}

/// Errors that can occur during interval tree operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntervalTreeError {
    #[error("Invalid tree configuration: {0}")]
    Configuration(String),

    #[error("Invalid interval {id}: {fault}")]
    InvalidInterval { id: Id, fault: IntervalFault },

    #[error("Interval ID already exists: {0}")]
    DuplicateId(Id),

    #[error("Invalid range: end ({end}) must be greater than start ({start})")]
    InvalidRange { start: f64, end: f64 },

    #[error("Query coordinate cannot be NaN")]
    NaNCoordinate,

    #[error("Interval ID not found: {0}")]
    NotFound(Id),

    #[error("Endpoint index is inconsistent: {0}")]
    Index(#[from] SortedListError),
}

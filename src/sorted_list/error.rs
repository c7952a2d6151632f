use thiserror::Error;

/// Errors raised by [`SortedKeyList`](super::SortedKeyList) mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SortedListError {
    #[error("Position {position} is out of bounds for a list of length {len}")]
    PositionOutOfBounds { position: usize, len: usize },
}

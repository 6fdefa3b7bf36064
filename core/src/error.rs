//! Error types for protocol parsing and record reordering.

use thiserror::Error;

/// Errors raised while decoding a widget request.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The `request` query parameter was not present.
    #[error("missing request parameter")]
    MissingRequest,

    /// The request payload was not valid JSON for the expected shape.
    #[error("invalid request: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Errors raised by [`crate::reorder::reorder`] and [`crate::reorder::reorder_many`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    /// Nothing to reorder.
    #[error("slice is empty")]
    Empty,

    /// The record being moved is not in the list.
    #[error("id {0} not found in slice")]
    IdNotFound(i64),

    /// The record to move before is not in the list.
    #[error("moveBefore {0} not found in slice")]
    TargetNotFound(i64),

    /// A record cannot be moved before itself.
    #[error("moveBefore {0} is one of the moved ids")]
    TargetIsMoved(i64),
}

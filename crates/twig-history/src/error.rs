//! Error types for ancestry queries and log rendering.

use twig_store::StoreError;
use twig_types::ObjectId;

/// Errors that can occur while walking commit history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// A merge base was requested for an empty set of commits.
    #[error("merge base requires at least one commit")]
    EmptyInput,

    /// The first-parent chains of the inputs never meet.
    #[error("no common ancestor for {0:?}")]
    NoCommonAncestor(Vec<ObjectId>),

    /// A commit lacks a field the operation depends on.
    #[error("commit {id} has no {field} field")]
    MissingField {
        /// The commit being read.
        id: ObjectId,
        /// The missing header key.
        field: &'static str,
    },

    /// A commit field is present but cannot be interpreted.
    #[error("commit {id} has a malformed {field} field: {reason}")]
    MalformedField {
        /// The commit being read.
        id: ObjectId,
        /// The offending header key.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The queue does not contain the requested item.
    #[error("{0} is not in the ancestor queue")]
    NotQueued(ObjectId),

    /// Reading from the object store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for history results.
pub type HistoryResult<T> = Result<T, HistoryError>;

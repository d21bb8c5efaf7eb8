use twig_types::{ObjectId, TypeError};

use crate::object::ObjectKind;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// The frame is corrupt: bad compression, missing separators, or a
    /// declared length that disagrees with the payload.
    #[error("malformed object {id}: {reason}")]
    MalformedObject { id: ObjectId, reason: String },

    /// The type tag is not one of the recognized object kinds.
    #[error("unknown object type: {0}")]
    UnknownObjectType(String),

    /// A typed decoder was handed an object of another kind.
    #[error("object {id} is a {actual}, expected {expected}")]
    KindMismatch {
        id: ObjectId,
        expected: ObjectKind,
        actual: ObjectKind,
    },

    /// An object ID could not be parsed.
    #[error("invalid object id: {0}")]
    InvalidId(#[from] TypeError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

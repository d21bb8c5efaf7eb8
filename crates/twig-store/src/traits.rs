use twig_types::ObjectId;

use crate::commit::Commit;
use crate::error::{StoreError, StoreResult};
use crate::object::{Object, StoredObject};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. The same kind and payload always
///   produce the same ID, so rewriting an existing object is a no-op.
/// - Reads validate the frame: a declared length that disagrees with the
///   payload is a [`StoreError::MalformedObject`], never a wrong answer.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Hash an object, persisting it only when `persist` is set.
    ///
    /// The returned ID is the same either way.
    fn hash_object(&self, object: &StoredObject, persist: bool) -> StoreResult<ObjectId> {
        if persist {
            self.write(object)
        } else {
            Ok(object.compute_id())
        }
    }

    /// Read an object that must exist.
    fn require(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }

    /// Read and decode an object of any kind.
    fn read_object(&self, id: &ObjectId) -> StoreResult<Object> {
        Object::from_stored_object(&self.require(id)?)
    }

    /// Read and decode a commit.
    fn read_commit(&self, id: &ObjectId) -> StoreResult<Commit> {
        Commit::from_stored_object(&self.require(id)?)
    }
}

use std::collections::HashMap;
use std::sync::RwLock;

use twig_types::ObjectId;

use crate::error::StoreResult;
use crate::frame::{compress, decode_frame, decompress};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. Objects are held as compressed frames,
/// exactly as the loose store writes them, so reads go through the same
/// frame validation.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Store raw compressed bytes under an arbitrary ID, bypassing hashing.
    ///
    /// Only useful for simulating corruption.
    pub fn insert_raw(&self, id: ObjectId, compressed: Vec<u8>) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(id, compressed);
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let map = self.objects.read().expect("lock poisoned");
        let Some(compressed) = map.get(id) else {
            return Ok(None);
        };
        let frame = decompress(id, compressed)?;
        let (kind, data) = decode_frame(id, &frame)?;
        Ok(Some(StoredObject::new(kind, data)))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let frame = object.frame();
        let id = ObjectId::from_bytes(&frame);
        let mut map = self.objects.write().expect("lock poisoned");
        if !map.contains_key(&id) {
            map.insert(id, compress(&frame)?);
        }
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}

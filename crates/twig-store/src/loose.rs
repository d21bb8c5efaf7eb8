//! Filesystem object store.
//!
//! Objects live at `objects/<hash[0:2]>/<hash[2:]>` as zlib-compressed
//! frames, the same loose-object layout git uses.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use twig_types::ObjectId;

use crate::error::StoreResult;
use crate::frame::{compress, decode_frame, decompress};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// Loose-object store rooted at an `objects/` directory.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
}

impl LooseObjectStore {
    /// Open a store rooted at `objects_dir`. The directory is created lazily
    /// on first write.
    pub fn new(objects_dir: impl Into<PathBuf>) -> Self {
        Self {
            objects_dir: objects_dir.into(),
        }
    }

    /// The `objects/` directory this store writes into.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Path of the file holding `id`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.fanout();
        self.objects_dir.join(dir).join(file)
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let path = self.object_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let frame = decompress(id, &compressed)?;
        let (kind, data) = decode_frame(id, &frame)?;
        trace!(id = %id.short_hex(), %kind, size = data.len(), "read object");
        Ok(Some(StoredObject::new(kind, data)))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let frame = object.frame();
        let id = ObjectId::from_bytes(&frame);
        let path = self.object_path(&id);

        if path.is_file() {
            debug!(id = %id.short_hex(), "object already stored");
            return Ok(id);
        }

        // The fan-out directory is shared by many objects.
        let dir = path.parent().unwrap_or(self.objects_dir.as_path());
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&compress(&frame)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(id = %id.short_hex(), kind = %object.kind, size = object.size, "wrote object");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }
}

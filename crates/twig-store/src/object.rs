use std::str::FromStr;

use serde::{Deserialize, Serialize};
use twig_types::ObjectId;

use crate::commit::Commit;
use crate::error::{StoreError, StoreResult};
use crate::frame::encode_frame;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Opaque content.
    Blob,
    /// Structured commit record.
    Commit,
}

impl ObjectKind {
    /// The type tag written into the frame header.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Commit => "commit",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ObjectKind {
    type Err = StoreError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "blob" => Ok(Self::Blob),
            "commit" => Ok(Self::Commit),
            other => Err(StoreError::UnknownObjectType(other.to_string())),
        }
    }
}

/// A stored object: kind tag + payload bytes + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// payload; decoding into a [`Blob`] or [`Commit`] happens on top of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The payload bytes (without the frame header).
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// The framed bytes that are hashed and compressed.
    pub fn frame(&self) -> Vec<u8> {
        encode_frame(self.kind, &self.data)
    }

    /// Compute the content-addressed ID for this object.
    ///
    /// The hash covers the whole frame, so the kind tag and length take part
    /// in the identity.
    pub fn compute_id(&self) -> ObjectId {
        ObjectId::from_bytes(&self.frame())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Blob {
            return Err(StoreError::KindMismatch {
                id: obj.compute_id(),
                expected: ObjectKind::Blob,
                actual: obj.kind,
            });
        }
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

impl Commit {
    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Commit, self.serialize().into_bytes())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Commit {
            return Err(StoreError::KindMismatch {
                id: obj.compute_id(),
                expected: ObjectKind::Commit,
                actual: obj.kind,
            });
        }
        let text = std::str::from_utf8(&obj.data).map_err(|e| StoreError::MalformedObject {
            id: obj.compute_id(),
            reason: format!("commit is not UTF-8: {e}"),
        })?;
        Ok(Self::parse(text))
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// Any decoded object, tagged by kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Commit(Commit),
}

impl Object {
    /// Decode payload bytes for the named type tag.
    ///
    /// Fails with [`StoreError::UnknownObjectType`] for anything other than
    /// `blob` or `commit`.
    pub fn from_tag(tag: &str, data: &[u8]) -> StoreResult<Self> {
        let kind: ObjectKind = tag.parse()?;
        Self::deserialize(kind, data)
    }

    /// Decode payload bytes of a known kind.
    pub fn deserialize(kind: ObjectKind, data: &[u8]) -> StoreResult<Self> {
        Self::from_stored_object(&StoredObject::new(kind, data.to_vec()))
    }

    /// Decode a stored object.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        match obj.kind {
            ObjectKind::Blob => Blob::from_stored_object(obj).map(Self::Blob),
            ObjectKind::Commit => Commit::from_stored_object(obj).map(Self::Commit),
        }
    }

    /// The kind of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Encode the payload bytes.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Self::Blob(blob) => blob.data.clone(),
            Self::Commit(commit) => commit.serialize().into_bytes(),
        }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(self.kind(), self.serialize())
    }
}

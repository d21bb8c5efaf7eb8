//! Content-addressed object storage for twig.
//!
//! Every object is framed as `"<kind> <len>\0<payload>"`, identified by the
//! SHA-1 of that frame, and stored zlib-compressed under
//! `objects/<hash[0:2]>/<hash[2:]>`, the loose-object layout git uses.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content
//! - [`Commit`] -- ordered header fields plus a message, see [`commit`]
//!
//! [`Object`] is the tagged union over both; [`Object::from_tag`] is the
//! factory keyed by the frame's type tag.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`LooseObjectStore`] -- one compressed file per object on disk
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Hashing never depends on whether the object is persisted.
//! 3. Every read re-validates the frame's declared length.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod commit;
pub mod error;
pub mod frame;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use commit::{Commit, FieldValue};
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Object, ObjectKind, StoredObject};
pub use traits::ObjectStore;

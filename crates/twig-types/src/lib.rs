//! Foundation types for twig.
//!
//! Every other twig crate depends on `twig-types`. The only identity in the
//! system is the content hash of a framed object, [`ObjectId`].

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{ObjectId, HEX_LEN, SHORT_HEX_LEN};

//! Commit history for twig.
//!
//! Built on any [`twig_store::ObjectStore`]:
//!
//! - [`AncestorQueue`] -- ordered, duplicate-free queue of commit ids
//! - [`History`] -- first-parent chains, merge bases and the merge-aware log
//! - [`Signature`] -- parsed author lines
//! - [`RenderOptions`] / [`LogEntry`] -- `git log` style output

pub mod ancestry;
pub mod error;
pub mod queue;
pub mod render;
pub mod signature;

pub use ancestry::History;
pub use error::{HistoryError, HistoryResult};
pub use queue::AncestorQueue;
pub use render::{LogEntry, RenderOptions};
pub use signature::{Signature, SignatureError, DATE_FORMAT};

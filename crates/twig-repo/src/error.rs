//! Error types for repository operations.

use std::path::PathBuf;

use thiserror::Error;
use twig_history::HistoryError;
use twig_store::StoreError;

/// Errors that can occur while opening or manipulating a repository.
#[derive(Debug, Error)]
pub enum RepoError {
    /// No `.git` directory at or above the given path.
    #[error("not a twig repository (or any parent): {0}")]
    NotARepository(PathBuf),

    /// The config file is unreadable as TOML or has the wrong shape.
    #[error("invalid config at {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    /// Only format version 0 is understood.
    #[error("unsupported repositoryformatversion {0}")]
    UnsupportedFormatVersion(u32),

    /// The reference name breaks the naming rules.
    #[error("invalid ref name: {name}: {reason}")]
    InvalidRefName { name: String, reason: String },

    /// A reference file holds neither a hash nor a `ref:` line.
    #[error("malformed ref {name}: {reason}")]
    MalformedRef { name: String, reason: String },

    /// Symbolic references nest deeper than allowed, or loop.
    #[error("symbolic ref {0} nests too deeply")]
    SymrefTooDeep(String),

    /// The revision names nothing.
    #[error("unknown revision: {0}")]
    UnknownRevision(String),

    /// An abbreviated hash matches more than one object.
    #[error("ambiguous revision {rev}: {count} objects match")]
    AmbiguousRevision { rev: String, count: usize },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("history error: {0}")]
    History(#[from] HistoryError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

//! On-disk twig repositories.
//!
//! A repository is a work tree containing a `.git` directory laid out the
//! way git lays it out:
//!
//! ```text
//! .git/
//!   HEAD            ref: refs/heads/master
//!   config          [core] settings (TOML)
//!   description
//!   branches/
//!   objects/        loose objects, see twig_store::LooseObjectStore
//!   refs/heads/
//!   refs/tags/
//! ```

pub mod config;
pub mod error;
pub mod refs;
pub mod repository;

pub use config::{CoreConfig, RepoConfig, FORMAT_VERSION};
pub use error::{RepoError, RepoResult};
pub use refs::{validate_ref_name, FileRefStore, RefTarget, HEAD};
pub use repository::{Repository, DEFAULT_BRANCH, GIT_DIR};

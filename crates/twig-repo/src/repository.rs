use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use twig_history::History;
use twig_store::{LooseObjectStore, ObjectStore};
use twig_types::{ObjectId, HEX_LEN};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};
use crate::refs::{FileRefStore, HEAD};

/// Name of the metadata directory inside a work tree.
pub const GIT_DIR: &str = ".git";

/// Branch `HEAD` points at in a fresh repository.
pub const DEFAULT_BRANCH: &str = "refs/heads/master";

/// Abbreviated hashes shorter than this are not looked up.
pub const MIN_ABBREV_LEN: usize = 4;

const DESCRIPTION: &str = "Unnamed repository; edit this file 'description' to name the repository.\n";

/// An on-disk repository: a work tree with a `.git` directory.
#[derive(Debug)]
pub struct Repository {
    work_dir: PathBuf,
    git_dir: PathBuf,
    config: RepoConfig,
    objects: LooseObjectStore,
    refs: FileRefStore,
}

impl Repository {
    /// Create (or re-initialise) a repository at `path`.
    ///
    /// Existing objects and references are kept; `HEAD`, `description`
    /// and `config` are rewritten.
    pub fn init(path: impl AsRef<Path>) -> RepoResult<Self> {
        let work_dir = path.as_ref().to_path_buf();
        let git_dir = work_dir.join(GIT_DIR);

        for sub in ["objects", "branches", "refs/heads", "refs/tags"] {
            fs::create_dir_all(git_dir.join(sub))?;
        }
        fs::write(git_dir.join("description"), DESCRIPTION)?;

        let refs = FileRefStore::new(&git_dir);
        refs.set_symbolic(HEAD, DEFAULT_BRANCH)?;

        let config = RepoConfig::default();
        config.save(&git_dir.join("config"))?;

        info!(path = %git_dir.display(), "initialized repository");
        Ok(Self::assemble(work_dir, git_dir, config))
    }

    /// Open the repository whose work tree is `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let work_dir = path.as_ref().to_path_buf();
        let git_dir = work_dir.join(GIT_DIR);
        if !git_dir.is_dir() {
            return Err(RepoError::NotARepository(work_dir));
        }

        let config_path = git_dir.join("config");
        if !config_path.is_file() {
            return Err(RepoError::InvalidConfig {
                path: config_path,
                reason: "missing".into(),
            });
        }
        let config = RepoConfig::load(&config_path)?;
        config.validate()?;

        debug!(path = %git_dir.display(), "opened repository");
        Ok(Self::assemble(work_dir, git_dir, config))
    }

    /// Open the nearest repository at or above `start`.
    pub fn discover(start: impl AsRef<Path>) -> RepoResult<Self> {
        let start = start.as_ref();
        start
            .ancestors()
            .find(|dir| dir.join(GIT_DIR).is_dir())
            .map(Self::open)
            .unwrap_or_else(|| Err(RepoError::NotARepository(start.to_path_buf())))
    }

    fn assemble(work_dir: PathBuf, git_dir: PathBuf, config: RepoConfig) -> Self {
        Self {
            objects: LooseObjectStore::new(git_dir.join("objects")),
            refs: FileRefStore::new(&git_dir),
            work_dir,
            git_dir,
            config,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn objects(&self) -> &LooseObjectStore {
        &self.objects
    }

    pub fn refs(&self) -> &FileRefStore {
        &self.refs
    }

    pub fn history(&self) -> History<'_, LooseObjectStore> {
        History::new(&self.objects)
    }

    /// The commit `HEAD` points at, or `None` on an unborn branch.
    pub fn head(&self) -> RepoResult<Option<ObjectId>> {
        self.refs.head()
    }

    /// Resolve a revision to an object id.
    ///
    /// Accepts `HEAD`, a full reference name, a short branch or tag name
    /// (tags win), a full hash, or an unambiguous hash prefix.
    pub fn resolve(&self, rev: &str) -> RepoResult<ObjectId> {
        let candidates = [
            rev.to_string(),
            format!("refs/{rev}"),
            format!("refs/tags/{rev}"),
            format!("refs/heads/{rev}"),
        ];
        for name in &candidates {
            if self.refs.exists(name) {
                return self
                    .refs
                    .resolve(name)?
                    .ok_or_else(|| RepoError::UnknownRevision(rev.to_string()));
            }
        }
        if rev == HEAD {
            // Unborn branch.
            return Err(RepoError::UnknownRevision(rev.to_string()));
        }

        if rev.len() == HEX_LEN {
            if let Ok(id) = ObjectId::from_hex(rev) {
                if self.objects.exists(&id)? {
                    return Ok(id);
                }
            }
        }
        self.resolve_prefix(rev)
    }

    fn resolve_prefix(&self, rev: &str) -> RepoResult<ObjectId> {
        let unknown = || RepoError::UnknownRevision(rev.to_string());
        if rev.len() < MIN_ABBREV_LEN
            || rev.len() > HEX_LEN
            || !rev.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(unknown());
        }

        let prefix = rev.to_ascii_lowercase();
        let (dir, rest) = prefix.split_at(2);
        let fanout = self.objects.objects_dir().join(dir);
        let entries = match fs::read_dir(&fanout) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(unknown()),
            Err(e) => return Err(e.into()),
        };

        let mut matches = Vec::new();
        for entry in entries {
            let file_name = entry?.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name.starts_with(rest) {
                if let Ok(id) = ObjectId::from_hex(&format!("{dir}{name}")) {
                    matches.push(id);
                }
            }
        }

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(unknown()),
            _ => Err(RepoError::AmbiguousRevision {
                rev: rev.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Point reference `name` at `id`, which must exist in the store.
    pub fn update_ref(&self, name: &str, id: ObjectId) -> RepoResult<()> {
        self.objects.require(&id)?;
        self.refs.update(name, id)
    }
}

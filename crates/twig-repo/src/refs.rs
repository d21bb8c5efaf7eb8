//! File-backed references under `<git-dir>`.
//!
//! A reference file holds either a 40-hex object id or a symbolic
//! `ref: <name>` line pointing at another reference.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use twig_types::ObjectId;

use crate::error::{RepoError, RepoResult};

pub const HEAD: &str = "HEAD";

/// Prefix of symbolic reference files.
pub const SYMREF_PREFIX: &str = "ref: ";

/// Symbolic references are followed at most this many times.
pub const MAX_SYMREF_DEPTH: usize = 5;

/// Characters that are forbidden anywhere in a reference name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

/// Contents of one reference file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefTarget {
    Direct(ObjectId),
    Symbolic(String),
}

impl RefTarget {
    fn parse(name: &str, text: &str) -> RepoResult<Self> {
        let text = text.trim_end();
        if let Some(target) = text.strip_prefix(SYMREF_PREFIX) {
            return Ok(Self::Symbolic(target.trim().to_string()));
        }
        ObjectId::from_hex(text)
            .map(Self::Direct)
            .map_err(|e| RepoError::MalformedRef {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    fn to_file_contents(&self) -> String {
        match self {
            Self::Direct(id) => format!("{id}\n"),
            Self::Symbolic(name) => format!("{SYMREF_PREFIX}{name}\n"),
        }
    }
}

/// Validate a reference name such as `HEAD`, `master` or `refs/heads/master`.
///
/// Follows git-style naming conventions to prevent ambiguity and filesystem
/// issues.
pub fn validate_ref_name(name: &str) -> RepoResult<()> {
    let reject = |reason: String| {
        Err(RepoError::InvalidRefName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return reject("ref name must not be empty".into());
    }
    if let Some(ch) = FORBIDDEN_CHARS.iter().find(|ch| name.contains(**ch)) {
        return reject(format!("contains forbidden character: {ch:?}"));
    }
    if name.chars().any(char::is_control) {
        return reject("contains a control character".into());
    }
    if name.contains("..") {
        return reject("must not contain '..'".into());
    }
    if name.contains("@{") {
        return reject("must not contain '@{'".into());
    }
    if name.ends_with('.') || name.ends_with('/') || name.starts_with('/') {
        return reject("must not start with '/' or end with '.' or '/'".into());
    }
    if name.ends_with(".lock") {
        return reject("must not end with '.lock'".into());
    }
    // Path components between slashes must be non-empty and not start with `.`.
    for component in name.split('/') {
        if component.is_empty() {
            return reject("path components must not be empty".into());
        }
        if component.starts_with('.') {
            return reject(format!("component must not start with '.': {component:?}"));
        }
    }
    Ok(())
}

/// References stored as plain files inside a git directory.
#[derive(Clone, Debug)]
pub struct FileRefStore {
    git_dir: PathBuf,
}

impl FileRefStore {
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        Self {
            git_dir: git_dir.into(),
        }
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.git_dir.join(name)
    }

    /// Whether a reference file named `name` exists.
    pub fn exists(&self, name: &str) -> bool {
        validate_ref_name(name).is_ok() && self.path(name).is_file()
    }

    /// Read one reference without following symbolic links.
    pub fn read(&self, name: &str) -> RepoResult<Option<RefTarget>> {
        validate_ref_name(name)?;
        match fs::read_to_string(self.path(name)) {
            Ok(text) => RefTarget::parse(name, &text).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Follow symbolic references from `name` to the reference that holds
    /// (or would hold) an object id.
    pub fn peel_name(&self, name: &str) -> RepoResult<String> {
        let mut current = name.to_string();
        for _ in 0..=MAX_SYMREF_DEPTH {
            match self.read(&current)? {
                Some(RefTarget::Symbolic(next)) => current = next,
                _ => return Ok(current),
            }
        }
        Err(RepoError::SymrefTooDeep(name.to_string()))
    }

    /// The object id `name` ultimately points at.
    ///
    /// `Ok(None)` when the reference, or the branch it points to, does not
    /// exist yet.
    pub fn resolve(&self, name: &str) -> RepoResult<Option<ObjectId>> {
        let target = self.peel_name(name)?;
        match self.read(&target)? {
            Some(RefTarget::Direct(id)) => Ok(Some(id)),
            _ => Ok(None),
        }
    }

    /// The commit `HEAD` resolves to, if any.
    pub fn head(&self) -> RepoResult<Option<ObjectId>> {
        self.resolve(HEAD)
    }

    /// Point `name` at `id`. Symbolic references are followed, so updating
    /// `HEAD` moves the current branch.
    pub fn update(&self, name: &str, id: ObjectId) -> RepoResult<()> {
        let target = self.peel_name(name)?;
        self.write(&target, &RefTarget::Direct(id))?;
        debug!(ref_name = name, peeled = %target, id = %id.short_hex(), "updated ref");
        Ok(())
    }

    /// Make `name` a symbolic reference to `target`.
    pub fn set_symbolic(&self, name: &str, target: &str) -> RepoResult<()> {
        validate_ref_name(target)?;
        self.write(name, &RefTarget::Symbolic(target.to_string()))
    }

    fn write(&self, name: &str, target: &RefTarget) -> RepoResult<()> {
        validate_ref_name(name)?;
        let path = self.path(name);
        let dir = path.parent().unwrap_or(self.git_dir.as_path());
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(target.to_file_contents().as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> ObjectId {
        ObjectId::from_bytes(&[n])
    }

    fn temp_refs() -> (tempfile::TempDir, FileRefStore) {
        let dir = tempfile::tempdir().unwrap();
        let refs = FileRefStore::new(dir.path());
        (dir, refs)
    }

    #[test]
    fn valid_names() {
        for name in ["HEAD", "master", "refs/heads/master", "refs/tags/v1.0", "feature/deep/nested"] {
            assert!(validate_ref_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn invalid_names() {
        for name in [
            "",
            "has space",
            "a~b",
            "a^b",
            "a:b",
            "bad..name",
            "a@{1}",
            "/leading",
            "trailing/",
            "trailing.",
            "refs/heads/x.lock",
            "refs//heads",
            "refs/.hidden",
            "a\u{7f}b",
        ] {
            assert!(validate_ref_name(name).is_err(), "{name:?} should be invalid");
        }
    }

    #[test]
    fn missing_ref_reads_none() {
        let (_dir, refs) = temp_refs();
        assert_eq!(refs.read("refs/heads/master").unwrap(), None);
        assert_eq!(refs.resolve("refs/heads/master").unwrap(), None);
    }

    #[test]
    fn update_and_resolve_direct() {
        let (_dir, refs) = temp_refs();
        refs.update("refs/heads/master", id(1)).unwrap();
        assert_eq!(
            refs.read("refs/heads/master").unwrap(),
            Some(RefTarget::Direct(id(1)))
        );
        assert_eq!(refs.resolve("refs/heads/master").unwrap(), Some(id(1)));
    }

    #[test]
    fn file_format_matches_git() {
        let (dir, refs) = temp_refs();
        refs.set_symbolic(HEAD, "refs/heads/master").unwrap();
        refs.update("refs/heads/master", id(2)).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("HEAD")).unwrap(),
            "ref: refs/heads/master\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("refs/heads/master")).unwrap(),
            format!("{}\n", id(2).to_hex())
        );
    }

    #[test]
    fn updating_head_moves_branch() {
        let (_dir, refs) = temp_refs();
        refs.set_symbolic(HEAD, "refs/heads/master").unwrap();
        assert_eq!(refs.head().unwrap(), None);

        refs.update(HEAD, id(3)).unwrap();
        assert_eq!(refs.resolve("refs/heads/master").unwrap(), Some(id(3)));
        assert_eq!(refs.head().unwrap(), Some(id(3)));
        assert_eq!(
            refs.read(HEAD).unwrap(),
            Some(RefTarget::Symbolic("refs/heads/master".into()))
        );
    }

    #[test]
    fn symref_loop_is_detected() {
        let (_dir, refs) = temp_refs();
        refs.set_symbolic("refs/heads/a", "refs/heads/b").unwrap();
        refs.set_symbolic("refs/heads/b", "refs/heads/a").unwrap();
        assert!(matches!(
            refs.resolve("refs/heads/a"),
            Err(RepoError::SymrefTooDeep(_))
        ));
    }

    #[test]
    fn garbage_ref_is_malformed() {
        let (dir, refs) = temp_refs();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        fs::write(dir.path().join("refs/heads/bad"), "not a hash\n").unwrap();
        assert!(matches!(
            refs.read("refs/heads/bad"),
            Err(RepoError::MalformedRef { .. })
        ));
    }

    #[test]
    fn invalid_name_is_rejected_before_io() {
        let (_dir, refs) = temp_refs();
        assert!(matches!(
            refs.update("refs/heads/../../escape", id(1)),
            Err(RepoError::InvalidRefName { .. })
        ));
    }
}

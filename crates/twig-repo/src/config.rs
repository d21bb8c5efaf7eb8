//! Repository configuration, stored as TOML at `<git-dir>/config`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};

/// The only repository format this crate reads.
pub const FORMAT_VERSION: u32 = 0;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default)]
    pub core: CoreConfig,
}

/// The `[core]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    #[serde(rename = "repositoryformatversion")]
    pub format_version: u32,
    pub filemode: bool,
    pub bare: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            filemode: false,
            bare: false,
        }
    }
}

impl RepoConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Read and parse the config file at `path`.
    pub fn load(path: &Path) -> RepoResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|e| RepoError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the config file at `path`, replacing any existing one.
    pub fn save(&self, path: &Path) -> RepoResult<()> {
        let text = self.to_toml_string().map_err(|e| RepoError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Fail unless this config describes a repository we can read.
    pub fn validate(&self) -> RepoResult<()> {
        if self.core.format_version != FORMAT_VERSION {
            return Err(RepoError::UnsupportedFormatVersion(self.core.format_version));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = RepoConfig::default();
        assert_eq!(c.core.format_version, 0);
        assert!(!c.core.filemode);
        assert!(!c.core.bare);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn serializes_core_section() {
        let text = RepoConfig::default().to_toml_string().unwrap();
        assert!(text.contains("[core]"));
        assert!(text.contains("repositoryformatversion = 0"));
        assert!(text.contains("filemode = false"));
        assert!(text.contains("bare = false"));
    }

    #[test]
    fn missing_keys_take_defaults() {
        let c = RepoConfig::from_toml_str("[core]\nbare = true\n").unwrap();
        assert_eq!(c.core.format_version, 0);
        assert!(c.core.bare);

        let c = RepoConfig::from_toml_str("").unwrap();
        assert_eq!(c, RepoConfig::default());
    }

    #[test]
    fn future_version_is_rejected() {
        let c = RepoConfig::from_toml_str("[core]\nrepositoryformatversion = 1\n").unwrap();
        assert!(matches!(c.validate(), Err(RepoError::UnsupportedFormatVersion(1))));
    }

    #[test]
    fn load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        let mut c = RepoConfig::default();
        c.core.filemode = true;
        c.save(&path).unwrap();
        assert_eq!(RepoConfig::load(&path).unwrap(), c);
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "[core\nthis is not toml").unwrap();
        assert!(matches!(
            RepoConfig::load(&path),
            Err(RepoError::InvalidConfig { .. })
        ));
    }
}

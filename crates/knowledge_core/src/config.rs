//! Store configuration.
//!
//! # Responsibility
//! - Describe where the article tree lives and how the store behaves on
//!   identifier collisions and dangling sidecars.
//!
//! # Invariants
//! - Defaults reproduce the documented on-disk layout (`articles/`, `metadata/`).
//! - Defaults never silently overwrite an existing article.

use std::path::{Path, PathBuf};

/// Environment variable consulted by [`StoreConfig::from_env`].
pub const BASE_PATH_ENV: &str = "KNOWLEDGE_BASE_PATH";

const DEFAULT_BASE_PATH: &str = "knowledge";
const DEFAULT_ARTICLES_DIR: &str = "articles";
const DEFAULT_METADATA_DIR: &str = "metadata";

/// How `create` turns the clock into an identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Plain `YYYYMMDD_HHMMSS`. Two creates in the same second share an id
    /// and the second one overwrites the first.
    Timestamp,
    /// `YYYYMMDD_HHMMSS`, then `_2`, `_3`, ... when the id is already taken.
    #[default]
    TimestampWithCounter,
}

/// What `search` does with a sidecar whose body file is gone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingBodyPolicy {
    /// Abort the whole search with `StoreError::MissingBody`.
    #[default]
    Fail,
    /// Log a warning and leave the article out of the results.
    Skip,
}

/// Configuration for [`crate::FsArticleRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_path: PathBuf,
    pub articles_dir: String,
    pub metadata_dir: String,
    pub identifier_policy: IdentifierPolicy,
    pub missing_body_policy: MissingBodyPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PATH)
    }
}

impl StoreConfig {
    /// Creates a config rooted at `base_path` with default layout and policies.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            articles_dir: DEFAULT_ARTICLES_DIR.to_string(),
            metadata_dir: DEFAULT_METADATA_DIR.to_string(),
            identifier_policy: IdentifierPolicy::default(),
            missing_body_policy: MissingBodyPolicy::default(),
        }
    }

    /// Reads the base path from `KNOWLEDGE_BASE_PATH`, falling back to
    /// `./knowledge` when unset or blank.
    pub fn from_env() -> Self {
        match std::env::var(BASE_PATH_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::new(value.trim()),
            _ => Self::default(),
        }
    }

    pub fn with_identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn with_missing_body_policy(mut self, policy: MissingBodyPolicy) -> Self {
        self.missing_body_policy = policy;
        self
    }

    pub fn articles_path(&self) -> PathBuf {
        self.base_path.join(&self.articles_dir)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.base_path.join(&self.metadata_dir)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::{IdentifierPolicy, MissingBodyPolicy, StoreConfig, BASE_PATH_ENV};
    use std::path::PathBuf;

    #[test]
    fn defaults_use_documented_layout() {
        let config = StoreConfig::new("/tmp/kb");
        assert_eq!(config.articles_path(), PathBuf::from("/tmp/kb/articles"));
        assert_eq!(config.metadata_path(), PathBuf::from("/tmp/kb/metadata"));
        assert_eq!(
            config.identifier_policy,
            IdentifierPolicy::TimestampWithCounter
        );
        assert_eq!(config.missing_body_policy, MissingBodyPolicy::Fail);
    }

    #[test]
    fn builder_setters_override_policies() {
        let config = StoreConfig::default()
            .with_identifier_policy(IdentifierPolicy::Timestamp)
            .with_missing_body_policy(MissingBodyPolicy::Skip);
        assert_eq!(config.identifier_policy, IdentifierPolicy::Timestamp);
        assert_eq!(config.missing_body_policy, MissingBodyPolicy::Skip);
        assert_eq!(config.base_path(), PathBuf::from("knowledge").as_path());
    }

    // Only test in this binary that touches the variable.
    #[test]
    fn from_env_reads_trimmed_base_path_and_falls_back_when_blank() {
        std::env::set_var(BASE_PATH_ENV, "  /srv/kb  ");
        let config = StoreConfig::from_env();
        assert_eq!(config.base_path(), PathBuf::from("/srv/kb").as_path());
        assert_eq!(config.metadata_path(), PathBuf::from("/srv/kb/metadata"));

        std::env::set_var(BASE_PATH_ENV, "   ");
        assert_eq!(StoreConfig::from_env().base_path, PathBuf::from("knowledge"));

        std::env::remove_var(BASE_PATH_ENV);
        assert_eq!(StoreConfig::from_env().base_path, PathBuf::from("knowledge"));
    }
}

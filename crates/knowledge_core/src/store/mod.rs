//! Filesystem persistence for articles.
//!
//! # Responsibility
//! - Define the `ArticleRepository` contract and its directory-backed
//!   implementation.
//! - Map I/O and JSON failures into one semantic error type.
//!
//! # Invariants
//! - An article exists only when both its body and its sidecar exist.
//! - Absence is reported as a value (`Ok(None)` / `Ok(false)`), never as an error,
//!   by `get` and `update`.

use crate::model::article::ArticleId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod article_repo;
mod fs_ops;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for article persistence and scan operations.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Content update requested on an empty body, which has no heading line.
    EmptyBody(ArticleId),
    /// Sidecar found during a scan without its body file.
    MissingBody(ArticleId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error at `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid metadata json at `{}`: {source}", path.display())
            }
            Self::EmptyBody(id) => write!(f, "article body is empty: {id}"),
            Self::MissingBody(id) => write!(f, "article body missing for metadata: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::EmptyBody(_) | Self::MissingBody(_) => None,
        }
    }
}

impl StoreError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "io_failed",
            Self::Json { .. } => "json_invalid",
            Self::EmptyBody(_) => "empty_body",
            Self::MissingBody(_) => "missing_body",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use crate::model::article::ArticleId;
    use std::error::Error;
    use std::path::PathBuf;

    #[test]
    fn io_error_exposes_path_and_source() {
        let err = StoreError::Io {
            path: PathBuf::from("/kb/articles/x.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/kb/articles/x.md"));
        assert!(err.source().is_some());
        assert_eq!(err.code(), "io_failed");
    }

    #[test]
    fn missing_body_names_the_article() {
        let id = ArticleId::parse("20240101_000000").unwrap();
        let err = StoreError::MissingBody(id);
        assert_eq!(
            err.to_string(),
            "article body missing for metadata: 20240101_000000"
        );
        assert!(err.source().is_none());
    }
}

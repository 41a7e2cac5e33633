//! Core domain logic for the personal knowledge base.
//! This crate owns the on-disk article layout and every invariant over it.

pub mod config;
pub mod logging;
pub mod model;
pub mod search;
pub mod store;

pub use config::{IdentifierPolicy, MissingBodyPolicy, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::article::{
    compose_body, replace_body_content, Article, ArticleId, ArticleMetadata, ArticleSummary,
    InvalidArticleId, Timestamp,
};
pub use search::matcher::SearchQuery;
pub use store::article_repo::{ArticleRepository, FsArticleRepository};
pub use store::{StoreError, StoreResult};

/// Minimal health-check API for wiring checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

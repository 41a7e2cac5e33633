//! Article repository contract and directory-backed implementation.
//!
//! # Responsibility
//! - Provide create/update/search/get over `<base>/articles/<id>.md` bodies
//!   and `<base>/metadata/<id>.json` sidecars.
//! - Emit metadata-only log events with duration and status.
//!
//! # Invariants
//! - `create` and `search` propagate every I/O and JSON failure.
//! - `get` and `update` report a missing body or sidecar as absence.
//! - `update` never changes `title` or `created_at`.
//! - No locking: concurrent writers against one base path may lose updates.

use super::fs_ops::{
    ensure_dir, list_json_files, read_metadata, read_text, read_text_if_exists, write_metadata,
    write_text,
};
use super::{StoreError, StoreResult};
use crate::config::{IdentifierPolicy, MissingBodyPolicy, StoreConfig};
use crate::model::article::{
    compose_body, now_local, replace_body_content, Article, ArticleId, ArticleMetadata,
    ArticleSummary,
};
use crate::search::matcher::SearchQuery;
use chrono::NaiveDateTime;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

const BODY_EXTENSION: &str = "md";
const METADATA_EXTENSION: &str = "json";

/// Repository interface for knowledge-base articles.
pub trait ArticleRepository {
    /// Creates one article and returns its identifier.
    fn create_article(&self, title: &str, content: &str, tags: &[String])
        -> StoreResult<ArticleId>;
    /// Replaces body content and/or tags. Returns `false` when the article
    /// does not exist.
    fn update_article(
        &self,
        article_id: &str,
        content: Option<&str>,
        tags: Option<&[String]>,
    ) -> StoreResult<bool>;
    /// Scans every sidecar and returns summaries of matching articles in
    /// directory order.
    fn search_articles(&self, query: &SearchQuery) -> StoreResult<Vec<ArticleSummary>>;
    /// Gets one article with its full body.
    fn get_article(&self, article_id: &str) -> StoreResult<Option<Article>>;
}

/// Article repository backed by two sibling directories.
#[derive(Debug, Clone)]
pub struct FsArticleRepository {
    config: StoreConfig,
}

impl FsArticleRepository {
    /// Creates the article and metadata directories if needed and returns a
    /// ready repository.
    ///
    /// Safe to call on an already initialized base path.
    ///
    /// # Side effects
    /// - Emits `store_open` logging events with duration and status.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let started_at = Instant::now();
        info!("event=store_open module=store status=start");

        let result = ensure_dir(&config.articles_path())
            .and_then(|()| ensure_dir(&config.metadata_path()));
        match result {
            Ok(()) => {
                info!(
                    "event=store_open module=store status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { config })
            }
            Err(err) => {
                error!(
                    "event=store_open module=store status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the body file for `article_id`.
    pub fn body_path(&self, article_id: &ArticleId) -> PathBuf {
        self.config
            .articles_path()
            .join(format!("{article_id}.{BODY_EXTENSION}"))
    }

    /// Path of the metadata sidecar for `article_id`.
    pub fn metadata_path(&self, article_id: &ArticleId) -> PathBuf {
        self.config
            .metadata_path()
            .join(format!("{article_id}.{METADATA_EXTENSION}"))
    }

    /// Creates one article stamped with `now` instead of the wall clock.
    ///
    /// The identifier is derived from `now` according to the configured
    /// [`IdentifierPolicy`].
    pub fn create_article_at(
        &self,
        title: &str,
        content: &str,
        tags: &[String],
        now: NaiveDateTime,
    ) -> StoreResult<ArticleId> {
        let started_at = Instant::now();
        let article_id = self.allocate_id(now);

        let result = write_text(&self.body_path(&article_id), &compose_body(title, content))
            .and_then(|()| {
                let metadata = ArticleMetadata::new(title, tags.to_vec(), now);
                write_metadata(&self.metadata_path(&article_id), &metadata)
            });

        match result {
            Ok(()) => {
                info!(
                    "event=article_create module=store status=ok article_id={} tag_count={} duration_ms={}",
                    article_id,
                    tags.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(article_id)
            }
            Err(err) => {
                error!(
                    "event=article_create module=store status=error article_id={} duration_ms={} error_code={} error={}",
                    article_id,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn allocate_id(&self, now: NaiveDateTime) -> ArticleId {
        let base = ArticleId::from_timestamp(now);
        match self.config.identifier_policy {
            IdentifierPolicy::Timestamp => base,
            IdentifierPolicy::TimestampWithCounter => {
                if !self.is_taken(&base) {
                    return base;
                }
                let mut counter = 2;
                loop {
                    let candidate = base.with_suffix(counter);
                    if !self.is_taken(&candidate) {
                        debug!(
                            "event=article_id_collision module=store base_id={} article_id={}",
                            base, candidate
                        );
                        return candidate;
                    }
                    counter += 1;
                }
            }
        }
    }

    /// Either file present means the id is in use, even if the article is
    /// incomplete.
    fn is_taken(&self, article_id: &ArticleId) -> bool {
        self.body_path(article_id).exists() || self.metadata_path(article_id).exists()
    }

    fn exists(&self, article_id: &ArticleId) -> bool {
        self.body_path(article_id).exists() && self.metadata_path(article_id).exists()
    }

    fn apply_update(
        &self,
        article_id: &ArticleId,
        content: Option<&str>,
        tags: Option<&[String]>,
    ) -> StoreResult<()> {
        let now = now_local();
        let metadata_path = self.metadata_path(article_id);
        let mut metadata = read_metadata(&metadata_path)?;

        if let Some(content) = content {
            let body_path = self.body_path(article_id);
            let existing = read_text(&body_path)?;
            let updated = replace_body_content(&existing, content)
                .ok_or_else(|| StoreError::EmptyBody(article_id.clone()))?;
            write_text(&body_path, &updated)?;
        }

        if let Some(tags) = tags {
            metadata.tags = tags.to_vec();
        }
        metadata.touch(now);
        write_metadata(&metadata_path, &metadata)
    }

    fn scan(&self, query: &SearchQuery) -> StoreResult<Vec<ArticleSummary>> {
        let matcher = query.matcher();
        let mut hits = Vec::new();

        for sidecar_path in list_json_files(&self.config.metadata_path())? {
            let Some(stem) = sidecar_path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!(
                    "event=article_search module=store status=skip reason=non_utf8_name path={}",
                    sidecar_path.display()
                );
                continue;
            };
            let article_id = ArticleId::from_stem(stem);

            let metadata = read_metadata(&sidecar_path)?;
            let body = match read_text_if_exists(&self.body_path(&article_id))? {
                Some(body) => body,
                None => match self.config.missing_body_policy {
                    MissingBodyPolicy::Fail => return Err(StoreError::MissingBody(article_id)),
                    MissingBodyPolicy::Skip => {
                        warn!(
                            "event=article_search module=store status=skip reason=missing_body article_id={}",
                            article_id
                        );
                        continue;
                    }
                },
            };

            if matcher.matches(&body, &metadata) {
                hits.push(ArticleSummary::from_metadata(article_id, metadata));
            }
        }

        Ok(hits)
    }

    fn load(&self, article_id: &ArticleId) -> StoreResult<Option<Article>> {
        if !self.exists(article_id) {
            return Ok(None);
        }
        let content = read_text(&self.body_path(article_id))?;
        let metadata = read_metadata(&self.metadata_path(article_id))?;
        Ok(Some(Article { content, metadata }))
    }
}

impl ArticleRepository for FsArticleRepository {
    fn create_article(
        &self,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> StoreResult<ArticleId> {
        self.create_article_at(title, content, tags, now_local())
    }

    fn update_article(
        &self,
        article_id: &str,
        content: Option<&str>,
        tags: Option<&[String]>,
    ) -> StoreResult<bool> {
        let started_at = Instant::now();
        let Some(article_id) = parse_lookup_id(article_id) else {
            return Ok(false);
        };
        if !self.exists(&article_id) {
            debug!(
                "event=article_update module=store status=not_found article_id={}",
                article_id
            );
            return Ok(false);
        }
        if content.is_none() && tags.is_none() {
            return Ok(true);
        }

        match self.apply_update(&article_id, content, tags) {
            Ok(()) => {
                info!(
                    "event=article_update module=store status=ok article_id={} content={} tags={} duration_ms={}",
                    article_id,
                    content.is_some(),
                    tags.is_some(),
                    started_at.elapsed().as_millis()
                );
                Ok(true)
            }
            Err(err) => {
                error!(
                    "event=article_update module=store status=error article_id={} duration_ms={} error_code={} error={}",
                    article_id,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn search_articles(&self, query: &SearchQuery) -> StoreResult<Vec<ArticleSummary>> {
        let started_at = Instant::now();
        match self.scan(query) {
            Ok(hits) => {
                info!(
                    "event=article_search module=store status=ok hits={} tag_filter={} duration_ms={}",
                    hits.len(),
                    query.tags.is_some(),
                    started_at.elapsed().as_millis()
                );
                Ok(hits)
            }
            Err(err) => {
                error!(
                    "event=article_search module=store status=error duration_ms={} error_code={} error={}",
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn get_article(&self, article_id: &str) -> StoreResult<Option<Article>> {
        let Some(article_id) = parse_lookup_id(article_id) else {
            return Ok(None);
        };
        let article = self.load(&article_id)?;
        debug!(
            "event=article_get module=store status={} article_id={}",
            if article.is_some() { "ok" } else { "not_found" },
            article_id
        );
        Ok(article)
    }
}

/// Caller-provided ids that cannot name a file inside the store are simply
/// absent.
fn parse_lookup_id(raw: &str) -> Option<ArticleId> {
    match ArticleId::parse(raw) {
        Ok(article_id) => Some(article_id),
        Err(err) => {
            debug!(
                "event=article_lookup module=store status=not_found reason=invalid_id error={}",
                err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ArticleRepository, FsArticleRepository};
    use crate::config::{IdentifierPolicy, StoreConfig};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn open_repo(policy: IdentifierPolicy) -> (TempDir, FsArticleRepository) {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path()).with_identifier_policy(policy);
        let repo = FsArticleRepository::open(config).unwrap();
        (dir, repo)
    }

    fn noon() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn counter_policy_suffixes_same_second_ids() {
        let (_dir, repo) = open_repo(IdentifierPolicy::TimestampWithCounter);
        let first = repo.create_article_at("a", "one", &[], noon()).unwrap();
        let second = repo.create_article_at("b", "two", &[], noon()).unwrap();
        let third = repo.create_article_at("c", "three", &[], noon()).unwrap();

        assert_eq!(first.as_str(), "20240504_120000");
        assert_eq!(second.as_str(), "20240504_120000_2");
        assert_eq!(third.as_str(), "20240504_120000_3");
        assert!(repo.get_article(first.as_str()).unwrap().is_some());
    }

    #[test]
    fn timestamp_policy_overwrites_same_second_article() {
        let (_dir, repo) = open_repo(IdentifierPolicy::Timestamp);
        let first = repo.create_article_at("a", "one", &[], noon()).unwrap();
        let second = repo.create_article_at("b", "two", &[], noon()).unwrap();
        assert_eq!(first, second);

        let article = repo.get_article(first.as_str()).unwrap().unwrap();
        assert_eq!(article.content, "# b\n\ntwo");
        assert_eq!(article.metadata.title, "b");
    }

    #[test]
    fn invalid_ids_are_not_found() {
        let (_dir, repo) = open_repo(IdentifierPolicy::default());
        assert!(repo.get_article("../metadata/x").unwrap().is_none());
        assert!(!repo.update_article("a/b", Some("x"), None).unwrap());
    }

    #[test]
    fn body_and_metadata_paths_follow_layout() {
        let (dir, repo) = open_repo(IdentifierPolicy::default());
        let id = repo.create_article_at("t", "c", &[], noon()).unwrap();
        assert_eq!(
            repo.body_path(&id),
            dir.path().join("articles").join("20240504_120000.md")
        );
        assert_eq!(
            repo.metadata_path(&id),
            dir.path().join("metadata").join("20240504_120000.json")
        );
    }
}

//! Article domain model.
//!
//! # Responsibility
//! - Define `ArticleId`, `ArticleMetadata`, `Article` and `ArticleSummary`.
//! - Own the body layout (`# {title}` heading, blank line, content).
//!
//! # Invariants
//! - Caller-supplied `ArticleId` values never contain path separators and
//!   never start with `.`.
//! - Timestamps are local naive time. Stored text is written back unchanged;
//!   new values use ISO-8601 with microseconds, dropped when zero.
//! - Unknown sidecar keys survive a load/store cycle through `extra`.

use chrono::{Local, NaiveDateTime, SubsecRound, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

static ARTICLE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^./\\\x00][^/\\\x00]*$").expect("valid article id regex"));

const ID_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Returns the current local time truncated to microseconds.
///
/// Truncation keeps in-memory values equal to what a sidecar round-trip
/// yields.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

/// Rejected identifier input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidArticleId(pub String);

impl Display for InvalidArticleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid article id `{}`", self.0)
    }
}

impl Error for InvalidArticleId {}

/// Key shared by an article body file and its metadata sidecar.
///
/// Generated ids look like `20240131_235959`; a collision suffix (`_2`, `_3`)
/// may follow under [`crate::IdentifierPolicy::TimestampWithCounter`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    /// Validates caller-provided identifier text.
    ///
    /// Anything that could resolve outside the store directories is rejected.
    pub fn parse(value: &str) -> Result<Self, InvalidArticleId> {
        if ARTICLE_ID_RE.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(InvalidArticleId(value.to_string()))
        }
    }

    /// Wraps a file stem read back from the metadata directory.
    ///
    /// Directory entries cannot carry separators, so no validation applies.
    pub(crate) fn from_stem(stem: &str) -> Self {
        Self(stem.to_string())
    }

    /// Builds the second-granularity identifier for `at`.
    pub fn from_timestamp(at: NaiveDateTime) -> Self {
        Self(at.format(ID_TIMESTAMP_FORMAT).to_string())
    }

    /// Returns this id with a numeric collision suffix appended.
    pub fn with_suffix(&self, counter: u32) -> Self {
        Self(format!("{}_{counter}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ArticleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArticleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ArticleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Sidecar timestamp that remembers the exact text it was read from.
///
/// Ordering and equality follow the parsed time; serialization writes the
/// original text, so untouched fields keep their bytes across a rewrite.
#[derive(Debug, Clone)]
pub struct Timestamp {
    at: NaiveDateTime,
    text: String,
}

impl Timestamp {
    const WRITE_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%.6f";
    const WRITE_FORMAT_WHOLE: &'static str = "%Y-%m-%dT%H:%M:%S";
    const READ_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%.f";

    /// Parses ISO-8601 local time with any fractional precision, including none.
    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        let at = NaiveDateTime::parse_from_str(text, Self::READ_FORMAT)?;
        Ok(Self {
            at,
            text: text.to_string(),
        })
    }

    pub fn at(&self) -> NaiveDateTime {
        self.at
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(at: NaiveDateTime) -> Self {
        let format = if at.nanosecond() == 0 {
            Self::WRITE_FORMAT_WHOLE
        } else {
            Self::WRITE_FORMAT
        };
        Self {
            at,
            text: at.format(format).to_string(),
        }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .map_err(|err| serde::de::Error::custom(format!("invalid timestamp `{raw}`: {err}")))
    }
}

/// JSON sidecar stored at `metadata/<id>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    /// Set at creation, never changed by updates.
    pub title: String,
    pub created_at: Timestamp,
    /// Replaced wholesale on update; order is preserved as given.
    pub tags: Vec<String>,
    pub last_modified: Timestamp,
    /// Keys written by other tools. Kept so updates never drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArticleMetadata {
    /// Creates metadata for a fresh article where both timestamps equal `now`.
    pub fn new(title: impl Into<String>, tags: Vec<String>, now: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            created_at: Timestamp::from(now),
            tags,
            last_modified: Timestamp::from(now),
            extra: Map::new(),
        }
    }

    /// Bumps `last_modified`, never moving it backwards.
    pub fn touch(&mut self, now: NaiveDateTime) {
        if now > self.last_modified.at() {
            self.last_modified = Timestamp::from(now);
        }
    }

    /// Returns whether any filter tag equals one of this article's tags.
    ///
    /// Comparison is exact and case-sensitive. An empty filter matches nothing.
    pub fn has_any_tag(&self, filter: &[String]) -> bool {
        filter.iter().any(|wanted| self.tags.contains(wanted))
    }
}

/// Full record returned by `get`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// Entire body file, heading included.
    pub content: String,
    pub metadata: ArticleMetadata,
}

impl Article {
    /// Returns the body without the heading line and its blank separator.
    pub fn content_without_heading(&self) -> &str {
        let rest = match self.content.split_once('\n') {
            Some((_, rest)) => rest,
            None => return "",
        };
        rest.strip_prefix('\n').unwrap_or(rest)
    }
}

/// Search hit: sidecar fields plus identifier, without the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleSummary {
    pub article_id: ArticleId,
    pub title: String,
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub last_modified: Timestamp,
}

impl ArticleSummary {
    pub fn from_metadata(article_id: ArticleId, metadata: ArticleMetadata) -> Self {
        Self {
            article_id,
            title: metadata.title,
            tags: metadata.tags,
            created_at: metadata.created_at,
            last_modified: metadata.last_modified,
        }
    }
}

/// Builds the body written by `create`.
pub fn compose_body(title: &str, content: &str) -> String {
    format!("# {title}\n\n{content}")
}

/// Rewrites `existing` keeping only its first line.
///
/// The first line keeps its own terminator, so a regular body becomes
/// `"{heading}\n\n{content}"`. Returns `None` for an empty body, which has no
/// heading to keep.
pub fn replace_body_content(existing: &str, content: &str) -> Option<String> {
    let first_line = existing.split_inclusive('\n').next()?;
    Some(format!("{first_line}\n{content}"))
}

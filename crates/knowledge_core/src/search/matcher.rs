//! Search query and match rules.
//!
//! # Invariants
//! - Body matching is a case-insensitive substring test; an empty query
//!   matches every body.
//! - Tag matching is exact and case-sensitive; `Some(vec![])` matches nothing,
//!   `None` disables the filter.

use crate::model::article::ArticleMetadata;

/// Search options for one scan over the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Substring looked up in the full body text, heading included.
    pub text: String,
    /// Optional tag filter; at least one tag must overlap.
    pub tags: Option<Vec<String>>,
}

impl SearchQuery {
    /// Creates a text-only query.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: None,
        }
    }

    /// Adds a tag filter to this query.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Prepares the query for repeated matching.
    pub fn matcher(&self) -> QueryMatcher<'_> {
        QueryMatcher {
            needle: self.text.to_lowercase(),
            tags: self.tags.as_deref(),
        }
    }
}

/// Query with its lowercase needle computed once per scan.
#[derive(Debug)]
pub struct QueryMatcher<'q> {
    needle: String,
    tags: Option<&'q [String]>,
}

impl QueryMatcher<'_> {
    pub fn matches_body(&self, body: &str) -> bool {
        self.needle.is_empty() || body.to_lowercase().contains(&self.needle)
    }

    pub fn matches_tags(&self, metadata: &ArticleMetadata) -> bool {
        match self.tags {
            Some(filter) => metadata.has_any_tag(filter),
            None => true,
        }
    }

    pub fn matches(&self, body: &str, metadata: &ArticleMetadata) -> bool {
        self.matches_body(body) && self.matches_tags(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::SearchQuery;
    use crate::model::article::ArticleMetadata;
    use chrono::NaiveDate;

    fn metadata(tags: &[&str]) -> ArticleMetadata {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ArticleMetadata::new(
            "t",
            tags.iter().map(|tag| tag.to_string()).collect(),
            at,
        )
    }

    #[test]
    fn body_match_ignores_case() {
        let query = SearchQuery::new("APOLLO");
        let matcher = query.matcher();
        assert!(matcher.matches_body("# Moon\n\nthe apollo program"));
        assert!(!matcher.matches_body("# Fruit\n\nbanana"));
    }

    #[test]
    fn empty_query_matches_everything() {
        let query = SearchQuery::new("");
        assert!(query.matcher().matches("", &metadata(&[])));
    }

    #[test]
    fn tag_filter_requires_overlap() {
        let query = SearchQuery::new("a").with_tags(["food", "drink"]);
        let matcher = query.matcher();
        assert!(matcher.matches("banana", &metadata(&["food"])));
        assert!(!matcher.matches("apollo", &metadata(&["space"])));
    }

    #[test]
    fn empty_tag_filter_matches_nothing() {
        let query = SearchQuery::new("").with_tags(Vec::<String>::new());
        assert!(!query.matcher().matches("anything", &metadata(&["space"])));
    }
}

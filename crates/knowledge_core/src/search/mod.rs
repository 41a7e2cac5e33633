//! Linear-scan article search.
//!
//! # Responsibility
//! - Define the query shape accepted by `ArticleRepository::search`.
//! - Keep match rules (body substring, tag overlap) independent of storage.

pub mod matcher;

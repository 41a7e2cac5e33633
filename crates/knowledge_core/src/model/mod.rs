//! Domain model for knowledge-base articles.
//!
//! # Responsibility
//! - Define the identifier, body and metadata shapes persisted by the store.
//! - Keep body composition rules in one place.
//!
//! # Invariants
//! - Every article is addressed by one `ArticleId` shared by body and sidecar.
//! - `title` and `created_at` never change after creation.

pub mod article;

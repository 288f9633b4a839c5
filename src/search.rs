//! # Search Engine Module
//!
//! ## Purpose
//! Filtered full-text profile search: executes a text query against the
//! store, restricted to approved profiles and narrowed by optional
//! exact-match filters, then hydrates each hit with its owning user.
//!
//! ## Input/Output Specification
//! - **Input**: Query text (may be empty), optional category/location/country
//!   filters
//! - **Output**: Up to 50 hydrated results, ranked by token overlap
//! - **Invariant**: Non-approved profiles never surface, for any query or
//!   filter combination
//!
//! ## Key Features
//! - Equality filters AND-combined with the text match
//! - Pure read path; history recording is a separate, caller-initiated op
//! - Query length bounds rejected before any store call

use crate::config::Config;
use crate::errors::{DirectoryError, Result};
use crate::hydrate::{self, HydratedProfile};
use crate::storage::DirectoryStore;
use crate::SearchFilters;
use std::sync::Arc;

/// Profile search engine
///
/// Stateless over an injected storage client; safe to share across
/// request handlers.
pub struct SearchEngine {
    config: Arc<Config>,
    store: Arc<dyn DirectoryStore>,
}

impl SearchEngine {
    /// Create a new search engine over the given store
    pub fn new(config: Arc<Config>, store: Arc<dyn DirectoryStore>) -> Self {
        Self { config, store }
    }

    /// Execute a filtered text search and hydrate the results
    ///
    /// Ranking is token-overlap count (descending) with ties broken by the
    /// store's scan order; an empty query returns approved profiles in scan
    /// order. The result set is capped at `search.max_results`.
    pub async fn search_profiles(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<HydratedProfile>> {
        self.validate_query(query)?;

        let matches = self
            .store
            .query_profiles_by_text(query, filters, self.config.search.max_results)
            .await?;

        tracing::debug!("Query '{}' matched {} profiles", query, matches.len());

        Ok(hydrate::hydrate_profiles(self.store.as_ref(), matches).await)
    }

    /// Reject oversized queries before touching the store
    fn validate_query(&self, query: &str) -> Result<()> {
        if query.len() > self.config.search.max_query_length {
            return Err(DirectoryError::InvalidInput {
                field: "query".to_string(),
                reason: format!(
                    "query too long: maximum {} characters",
                    self.config.search.max_query_length
                ),
            });
        }
        Ok(())
    }

    /// Health check for the search path
    pub async fn health_check(&self) -> Result<()> {
        self.store.health_check().await
    }
}

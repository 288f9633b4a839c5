//! # Search History Module
//!
//! ## Purpose
//! Append-only per-user log of executed searches: every recorded query is
//! stored verbatim with its filters, retrievable newest-first and clearable
//! on demand.
//!
//! ## Input/Output Specification
//! - **Input**: User id, query text, applied filters
//! - **Output**: Reverse-chronological history entries
//! - **Mutability**: Insert, read and delete only; entries never change and
//!   never auto-expire
//!
//! ## Key Features
//! - No dedup and no deep validation of the filter bag on save
//! - Clearing issues independent per-entry deletes, all attempted even when
//!   some fail; retry is safe since deleting a missing entry is a no-op

use crate::config::Config;
use crate::errors::Result;
use crate::storage::DirectoryStore;
use crate::utils::TextUtils;
use crate::{SearchFilters, SearchHistoryEntry, UserId};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Per-user search history log
pub struct SearchHistoryLog {
    config: Arc<Config>,
    store: Arc<dyn DirectoryStore>,
}

impl SearchHistoryLog {
    /// Create a new history log over the given store
    pub fn new(config: Arc<Config>, store: Arc<dyn DirectoryStore>) -> Self {
        Self { config, store }
    }

    /// Record an executed search
    ///
    /// Append-only: no dedup against earlier entries, and the filter bag is
    /// stored verbatim. Fails only when the store is unreachable.
    pub async fn save(&self, user_id: UserId, query: &str, filters: SearchFilters) -> Result<()> {
        let entry = SearchHistoryEntry {
            id: Uuid::new_v4(),
            user_id,
            query: query.to_string(),
            filters,
            timestamp: Utc::now(),
        };

        self.store.insert_history(&entry).await?;
        tracing::debug!(
            "Recorded search '{}' for user {}",
            TextUtils::truncate(query, 60),
            user_id
        );
        Ok(())
    }

    /// Most recent entries for a user, newest first
    ///
    /// `limit` defaults to `search.default_history_limit` when not given.
    pub async fn get(
        &self,
        user_id: UserId,
        limit: Option<usize>,
    ) -> Result<Vec<SearchHistoryEntry>> {
        let limit = limit.unwrap_or(self.config.search.default_history_limit);
        self.store.history_for_user(&user_id, limit).await
    }

    /// Delete every entry owned by a user
    ///
    /// Best-effort: each entry is deleted independently and concurrently,
    /// and every delete is attempted even when some fail. A failure partway
    /// leaves a partial deletion, which a retry cleans up.
    pub async fn clear(&self, user_id: UserId) -> Result<()> {
        let entry_ids = self.store.history_entry_ids(&user_id).await?;
        let total = entry_ids.len();

        let deletes = entry_ids
            .into_iter()
            .map(|entry_id| async move { self.store.delete_history_entry(&user_id, &entry_id).await });
        let results = futures::future::join_all(deletes).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!(
                "Cleared history for user {}: {} of {} deletes failed",
                user_id,
                failed,
                total
            );
        } else {
            tracing::debug!("Cleared {} history entries for user {}", total, user_id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::tests::temp_store;
    use crate::storage::SledDirectoryStore;

    fn log(store: SledDirectoryStore) -> SearchHistoryLog {
        SearchHistoryLog::new(Arc::new(Config::default()), Arc::new(store))
    }

    #[tokio::test]
    async fn saved_search_round_trips_with_filters() {
        let (store, _dir) = temp_store();
        let log = log(store);
        let user_id = Uuid::new_v4();

        let filters = SearchFilters {
            category: Some("clergy".to_string()),
            ..Default::default()
        };
        log.save(user_id, "pastor", filters).await.unwrap();

        let entries = log.get(user_id, Some(1)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "pastor");
        assert_eq!(entries[0].filters.category.as_deref(), Some("clergy"));
        assert!(entries[0].filters.location.is_none());
    }

    #[tokio::test]
    async fn default_limit_is_ten() {
        let (store, _dir) = temp_store();
        let log = log(store);
        let user_id = Uuid::new_v4();

        for i in 0..12 {
            log.save(user_id, &format!("query-{}", i), SearchFilters::default())
                .await
                .unwrap();
        }

        let entries = log.get(user_id, None).await.unwrap();
        assert_eq!(entries.len(), 10);
    }

    #[tokio::test]
    async fn duplicate_saves_are_not_deduplicated() {
        let (store, _dir) = temp_store();
        let log = log(store);
        let user_id = Uuid::new_v4();

        log.save(user_id, "nurse", SearchFilters::default()).await.unwrap();
        log.save(user_id, "nurse", SearchFilters::default()).await.unwrap();

        let entries = log.get(user_id, None).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn clear_removes_all_entries_and_is_idempotent() {
        let (store, _dir) = temp_store();
        let log = log(store);
        let user_id = Uuid::new_v4();

        for i in 0..5 {
            log.save(user_id, &format!("query-{}", i), SearchFilters::default())
                .await
                .unwrap();
        }

        log.clear(user_id).await.unwrap();
        assert!(log.get(user_id, None).await.unwrap().is_empty());

        // Clearing again is a harmless no-op
        log.clear(user_id).await.unwrap();
        assert!(log.get(user_id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_only_touches_the_given_user() {
        let (store, _dir) = temp_store();
        let log = log(store);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        log.save(alice, "teacher", SearchFilters::default()).await.unwrap();
        log.save(bob, "teacher", SearchFilters::default()).await.unwrap();

        log.clear(alice).await.unwrap();
        assert!(log.get(alice, None).await.unwrap().is_empty());
        assert_eq!(log.get(bob, None).await.unwrap().len(), 1);
    }
}

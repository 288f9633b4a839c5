//! # Storage Management Module
//!
//! ## Purpose
//! Persistent storage of profile, user and search history records behind the
//! `DirectoryStore` trait, with a sled-backed production implementation.
//!
//! ## Input/Output Specification
//! - **Input**: Profile/user records, history entries, text queries
//! - **Output**: Matched profiles, resolved users, per-user history
//! - **Storage**: Sled embedded database, one tree per record family
//!
//! ## Key Features
//! - Explicit storage-client dependency (no ambient database handle)
//! - Text query execution constrained to approved profiles
//! - Per-user history keyed for reverse-chronological retrieval
//! - Record-level atomicity; no cross-record transactions

use crate::config::StorageConfig;
use crate::errors::{DirectoryError, Result};
use crate::text;
use crate::{
    HistoryEntryId, Profile, ProfileId, ProfileStatus, SearchFilters, SearchHistoryEntry, User,
    UserId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Record counts reported by the stats endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub profiles: usize,
    pub users: usize,
    pub history_entries: usize,
    pub database_size_bytes: u64,
}

/// Storage client consumed by the search subsystem
///
/// The search engine, suggestion miner and history log all receive this as
/// an injected dependency so the core stays testable in isolation.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Insert or replace a profile record
    async fn put_profile(&self, profile: &Profile) -> Result<()>;

    /// Fetch a profile by id
    async fn get_profile(&self, id: &ProfileId) -> Result<Option<Profile>>;

    /// Insert or replace a user record
    async fn put_user(&self, user: &User) -> Result<()>;

    /// Fetch a user by id; `None` when the record no longer exists
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Execute a text query over approved profiles
    ///
    /// Filters are AND-combined with the text match and with the
    /// approved-only constraint. Results are ranked by token overlap
    /// (descending), ties broken by scan order, capped at `limit`.
    /// An empty query matches every approved profile in scan order.
    async fn query_profiles_by_text(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<Profile>>;

    /// Unindexed full scan of profiles with the given status
    ///
    /// Used only by the suggestion miner; returns profiles in the store's
    /// natural scan order.
    async fn scan_profiles(&self, status: ProfileStatus) -> Result<Vec<Profile>>;

    /// Append a history entry; no dedup, no validation of filter contents
    async fn insert_history(&self, entry: &SearchHistoryEntry) -> Result<()>;

    /// Up to `limit` most recent history entries for a user, newest first
    async fn history_for_user(&self, user_id: &UserId, limit: usize)
        -> Result<Vec<SearchHistoryEntry>>;

    /// Ids of every history entry owned by a user
    async fn history_entry_ids(&self, user_id: &UserId) -> Result<Vec<HistoryEntryId>>;

    /// Delete a single history entry; deleting a missing entry is a no-op
    async fn delete_history_entry(&self, user_id: &UserId, entry_id: &HistoryEntryId)
        -> Result<()>;

    /// Record counts for the stats endpoint
    async fn stats(&self) -> Result<StoreStats>;

    /// Verify the store is reachable with a write/read round-trip
    async fn health_check(&self) -> Result<()>;
}

/// Sled-backed production store
pub struct SledDirectoryStore {
    config: StorageConfig,
    db: Arc<sled::Db>,
    profiles: Arc<sled::Tree>,
    users: Arc<sled::Tree>,
    history: Arc<sled::Tree>,
    meta: Arc<sled::Tree>,
}

impl SledDirectoryStore {
    /// Open (or create) the database at the configured path
    pub fn open(config: StorageConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = sled::open(&config.db_path).map_err(|e| DirectoryError::StoreUnavailable {
            reason: format!("failed to open database {:?}: {}", config.db_path, e),
        })?;

        let profiles = Self::open_tree(&db, "profiles")?;
        let users = Self::open_tree(&db, "users")?;
        let history = Self::open_tree(&db, "search_history")?;
        let meta = Self::open_tree(&db, "meta")?;

        let store = Self {
            config,
            db: Arc::new(db),
            profiles: Arc::new(profiles),
            users: Arc::new(users),
            history: Arc::new(history),
            meta: Arc::new(meta),
        };

        tracing::info!(
            "Directory store opened with {} profiles, {} users",
            store.profiles.len(),
            store.users.len()
        );

        Ok(store)
    }

    fn open_tree(db: &sled::Db, name: &str) -> Result<sled::Tree> {
        db.open_tree(name).map_err(|e| DirectoryError::StoreUnavailable {
            reason: format!("failed to open tree '{}': {}", name, e),
        })
    }

    /// Combined searchable text of a profile, normalized for matching
    ///
    /// Skills lead as the primary keyed field; profession, category and
    /// location contribute to the same index.
    fn searchable_text(profile: &Profile) -> String {
        text::normalize(&format!(
            "{} {} {} {}",
            profile.skills, profile.profession, profile.category, profile.location
        ))
    }

    /// Composite history key: owner, then timestamp, then entry id
    ///
    /// Big-endian millis make lexicographic key order chronological within
    /// a user's prefix, so reverse iteration yields newest-first.
    fn history_key(entry: &SearchHistoryEntry) -> Vec<u8> {
        let mut key = Vec::with_capacity(40);
        key.extend_from_slice(entry.user_id.as_bytes());
        key.extend_from_slice(&(entry.timestamp.timestamp_millis() as u64).to_be_bytes());
        key.extend_from_slice(entry.id.as_bytes());
        key
    }

    fn decode_profile(value: &[u8]) -> Result<Profile> {
        bincode::deserialize(value).map_err(|e| DirectoryError::Serialization {
            data_type: "Profile".to_string(),
            reason: e.to_string(),
        })
    }

    fn decode_history(value: &[u8]) -> Result<SearchHistoryEntry> {
        bincode::deserialize(value).map_err(|e| DirectoryError::Serialization {
            data_type: "SearchHistoryEntry".to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl DirectoryStore for SledDirectoryStore {
    async fn put_profile(&self, profile: &Profile) -> Result<()> {
        let value = bincode::serialize(profile)?;
        self.profiles.insert(profile.id.as_bytes(), value)?;
        tracing::debug!("Stored profile {} for user {}", profile.id, profile.user_id);
        Ok(())
    }

    async fn get_profile(&self, id: &ProfileId) -> Result<Option<Profile>> {
        match self.profiles.get(id.as_bytes())? {
            Some(value) => Ok(Some(Self::decode_profile(&value)?)),
            None => Ok(None),
        }
    }

    async fn put_user(&self, user: &User) -> Result<()> {
        let value = bincode::serialize(user)?;
        self.users.insert(user.id.as_bytes(), value)?;
        tracing::debug!("Stored user {}", user.id);
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        match self.users.get(id.as_bytes())? {
            Some(value) => {
                let user = bincode::deserialize(&value).map_err(|e| {
                    DirectoryError::Serialization {
                        data_type: "User".to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn query_profiles_by_text(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<Profile>> {
        let tokens = text::tokenize(query);
        let mut scored: Vec<(usize, Profile)> = Vec::new();

        for item in self.profiles.iter() {
            let (_, value) = item?;
            let profile = Self::decode_profile(&value)?;

            if profile.status != ProfileStatus::Approved {
                continue;
            }
            if !filters.matches(&profile) {
                continue;
            }

            if tokens.is_empty() {
                scored.push((0, profile));
                continue;
            }

            let haystack = Self::searchable_text(&profile);
            let score = text::token_overlap(&haystack, &tokens);
            if score > 0 {
                scored.push((score, profile));
            }
        }

        // Stable sort keeps scan order for equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored.into_iter().take(limit).map(|(_, p)| p).collect())
    }

    async fn scan_profiles(&self, status: ProfileStatus) -> Result<Vec<Profile>> {
        let mut profiles = Vec::new();
        for item in self.profiles.iter() {
            let (_, value) = item?;
            let profile = Self::decode_profile(&value)?;
            if profile.status == status {
                profiles.push(profile);
            }
        }
        Ok(profiles)
    }

    async fn insert_history(&self, entry: &SearchHistoryEntry) -> Result<()> {
        let key = Self::history_key(entry);
        let value = bincode::serialize(entry)?;
        self.history.insert(key, value)?;
        Ok(())
    }

    async fn history_for_user(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<SearchHistoryEntry>> {
        let mut entries = Vec::with_capacity(limit);
        for item in self.history.scan_prefix(user_id.as_bytes()).rev().take(limit) {
            let (_, value) = item?;
            entries.push(Self::decode_history(&value)?);
        }
        Ok(entries)
    }

    async fn history_entry_ids(&self, user_id: &UserId) -> Result<Vec<HistoryEntryId>> {
        let mut ids = Vec::new();
        for item in self.history.scan_prefix(user_id.as_bytes()) {
            let (_, value) = item?;
            ids.push(Self::decode_history(&value)?.id);
        }
        Ok(ids)
    }

    async fn delete_history_entry(
        &self,
        user_id: &UserId,
        entry_id: &HistoryEntryId,
    ) -> Result<()> {
        // Entry keys embed the timestamp, so locate by prefix + id suffix
        for item in self.history.scan_prefix(user_id.as_bytes()) {
            let (key, _) = item?;
            if key.len() >= 16 && &key[key.len() - 16..] == entry_id.as_bytes() {
                self.history.remove(key)?;
                return Ok(());
            }
        }
        // Deleting a missing entry is a no-op
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let database_size_bytes =
            self.db.size_on_disk().map_err(|e| DirectoryError::StoreUnavailable {
                reason: format!("failed to read database size: {}", e),
            })?;

        Ok(StoreStats {
            profiles: self.profiles.len(),
            users: self.users.len(),
            history_entries: self.history.len(),
            database_size_bytes,
        })
    }

    async fn health_check(&self) -> Result<()> {
        let test_key = b"health_check";
        let test_value = b"ok";

        self.meta.insert(test_key, test_value).map_err(|e| {
            DirectoryError::StoreUnavailable {
                reason: format!("health check write failed: {}", e),
            }
        })?;

        let result = self.meta.get(test_key).map_err(|e| DirectoryError::StoreUnavailable {
            reason: format!("health check read failed: {}", e),
        })?;

        if result.is_none() {
            return Err(DirectoryError::StoreUnavailable {
                reason: format!(
                    "health check value not found in {:?}",
                    self.config.db_path
                ),
            });
        }

        self.meta.remove(test_key)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    pub(crate) fn temp_store() -> (SledDirectoryStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            db_path: dir.path().join("directory.db"),
        };
        (SledDirectoryStore::open(config).unwrap(), dir)
    }

    pub(crate) fn profile(profession: &str, status: ProfileStatus) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            profession: profession.to_string(),
            skills: String::new(),
            category: "general".to_string(),
            location: "Lagos".to_string(),
            country: "Nigeria".to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    pub(crate) fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
            phone: None,
            role: "member".to_string(),
        }
    }

    fn history_entry(user_id: UserId, query: &str, age_minutes: i64) -> SearchHistoryEntry {
        SearchHistoryEntry {
            id: Uuid::new_v4(),
            user_id,
            query: query.to_string(),
            filters: SearchFilters::default(),
            timestamp: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn profile_round_trip() {
        let (store, _dir) = temp_store();
        let p = profile("Nurse", ProfileStatus::Approved);

        store.put_profile(&p).await.unwrap();
        let loaded = store.get_profile(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.profession, "Nurse");
        assert_eq!(loaded.user_id, p.user_id);
    }

    #[tokio::test]
    async fn missing_user_resolves_to_none() {
        let (store, _dir) = temp_store();
        assert!(store.get_user(&Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn text_query_excludes_non_approved() {
        let (store, _dir) = temp_store();
        store.put_profile(&profile("Nurse", ProfileStatus::Approved)).await.unwrap();
        store.put_profile(&profile("Nurse", ProfileStatus::Pending)).await.unwrap();
        store.put_profile(&profile("Nurse", ProfileStatus::Rejected)).await.unwrap();

        let results = store
            .query_profiles_by_text("nurse", &SearchFilters::default(), 50)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ProfileStatus::Approved);
    }

    #[tokio::test]
    async fn text_query_conjoins_equality_filters() {
        let (store, _dir) = temp_store();
        let mut teacher = profile("Teacher", ProfileStatus::Approved);
        teacher.category = "education".to_string();
        let mut other = profile("Teacher", ProfileStatus::Approved);
        other.category = "ministry".to_string();
        store.put_profile(&teacher).await.unwrap();
        store.put_profile(&other).await.unwrap();

        let filters = SearchFilters {
            category: Some("education".to_string()),
            ..Default::default()
        };
        let results = store.query_profiles_by_text("teacher", &filters, 50).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category, "education");
    }

    #[tokio::test]
    async fn text_query_respects_cap() {
        let (store, _dir) = temp_store();
        for _ in 0..60 {
            store.put_profile(&profile("Carpenter", ProfileStatus::Approved)).await.unwrap();
        }

        let results = store
            .query_profiles_by_text("carpenter", &SearchFilters::default(), 50)
            .await
            .unwrap();
        assert_eq!(results.len(), 50);
    }

    #[tokio::test]
    async fn empty_query_matches_all_approved() {
        let (store, _dir) = temp_store();
        store.put_profile(&profile("Nurse", ProfileStatus::Approved)).await.unwrap();
        store.put_profile(&profile("Teacher", ProfileStatus::Approved)).await.unwrap();
        store.put_profile(&profile("Clerk", ProfileStatus::Pending)).await.unwrap();

        let results = store
            .query_profiles_by_text("", &SearchFilters::default(), 50)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn ranking_prefers_higher_token_overlap() {
        let (store, _dir) = temp_store();
        let mut partial = profile("Pastor", ProfileStatus::Approved);
        partial.skills = "preaching".to_string();
        let mut full = profile("Pastor", ProfileStatus::Approved);
        full.skills = "preaching youth counseling".to_string();
        store.put_profile(&partial).await.unwrap();
        store.put_profile(&full).await.unwrap();

        let results = store
            .query_profiles_by_text("youth preaching", &SearchFilters::default(), 50)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, full.id);
    }

    #[tokio::test]
    async fn history_newest_first_with_limit() {
        let (store, _dir) = temp_store();
        let user_id = Uuid::new_v4();
        for age in [30, 20, 10] {
            store
                .insert_history(&history_entry(user_id, &format!("query-{}", age), age))
                .await
                .unwrap();
        }

        let entries = store.history_for_user(&user_id, 2).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "query-10");
        assert_eq!(entries[1].query, "query-20");
    }

    #[tokio::test]
    async fn history_is_scoped_per_user() {
        let (store, _dir) = temp_store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.insert_history(&history_entry(alice, "pastor", 5)).await.unwrap();
        store.insert_history(&history_entry(bob, "nurse", 5)).await.unwrap();

        let entries = store.history_for_user(&alice, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "pastor");
    }

    #[tokio::test]
    async fn deleting_missing_history_entry_is_noop() {
        let (store, _dir) = temp_store();
        let user_id = Uuid::new_v4();
        store
            .delete_history_entry(&user_id, &Uuid::new_v4())
            .await
            .unwrap();
        assert!(store.history_for_user(&user_id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_check_round_trips() {
        let (store, _dir) = temp_store();
        store.health_check().await.unwrap();
    }
}

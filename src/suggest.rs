//! # Suggestion Mining Module
//!
//! ## Purpose
//! Autocomplete suggestions for partial queries: scans approved profiles'
//! textual fields, collects case-insensitive substring matches and returns a
//! deduplicated, capped list of field values.
//!
//! ## Input/Output Specification
//! - **Input**: Partial query string
//! - **Output**: Up to 10 original-case field values
//! - **Guard**: Queries shorter than 2 characters return `[]` without a scan
//!
//! ## Key Features
//! - Full scan of approved profiles; deliberately decoupled from the ranked
//!   search path and its text index
//! - Field inspection order per profile: profession, skills, category,
//!   location
//! - Deduplication by exact string value, insertion order preserved

use crate::config::Config;
use crate::errors::Result;
use crate::storage::DirectoryStore;
use crate::text;
use crate::{Profile, ProfileStatus};
use std::collections::HashSet;
use std::sync::Arc;

/// Autocomplete suggestion miner over approved profiles
pub struct SuggestionMiner {
    config: Arc<Config>,
    store: Arc<dyn DirectoryStore>,
}

impl SuggestionMiner {
    /// Create a new miner over the given store
    pub fn new(config: Arc<Config>, store: Arc<dyn DirectoryStore>) -> Self {
        Self { config, store }
    }

    /// Mine matching field values for a partial query
    ///
    /// Results follow scan order strictly: profile by profile, fields in the
    /// order profession, skills, category, location. Two profiles sharing an
    /// identical field value contribute one entry.
    pub async fn suggestions(&self, query: &str) -> Result<Vec<String>> {
        // Performance guard, not an error
        if query.chars().count() < self.config.search.min_suggestion_query_length {
            return Ok(Vec::new());
        }

        let limit = self.config.search.suggestion_limit;
        let profiles = self.store.scan_profiles(ProfileStatus::Approved).await?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut suggestions: Vec<String> = Vec::new();

        'scan: for profile in &profiles {
            for field in Self::searchable_fields(profile) {
                if text::contains_ci(field, query) && seen.insert(field.to_string()) {
                    suggestions.push(field.to_string());
                    if suggestions.len() >= limit {
                        break 'scan;
                    }
                }
            }
        }

        tracing::debug!(
            "Mined {} suggestions for '{}' over {} approved profiles",
            suggestions.len(),
            query,
            profiles.len()
        );

        Ok(suggestions)
    }

    /// The four inspected fields, in match-priority order
    fn searchable_fields(profile: &Profile) -> [&str; 4] {
        [
            &profile.profession,
            &profile.skills,
            &profile.category,
            &profile.location,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::tests::temp_store;
    use crate::storage::SledDirectoryStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn miner(store: SledDirectoryStore) -> SuggestionMiner {
        SuggestionMiner::new(Arc::new(Config::default()), Arc::new(store))
    }

    /// Profile with a scan-order-controlled id (sled scans keys
    /// lexicographically, and profile keys are the id bytes).
    fn ordered_profile(order: u128, profession: &str, status: ProfileStatus) -> Profile {
        Profile {
            id: Uuid::from_u128(order),
            user_id: Uuid::new_v4(),
            profession: profession.to_string(),
            skills: String::new(),
            category: "general".to_string(),
            location: "Accra".to_string(),
            country: "Ghana".to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn short_query_short_circuits() {
        let (store, _dir) = temp_store();
        store
            .put_profile(&ordered_profile(1, "Nurse", ProfileStatus::Approved))
            .await
            .unwrap();

        let m = miner(store);
        assert!(m.suggestions("").await.unwrap().is_empty());
        assert!(m.suggestions("n").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mines_deduplicated_matches_excluding_pending() {
        let (store, _dir) = temp_store();
        store.put_profile(&ordered_profile(1, "Nurse", ProfileStatus::Approved)).await.unwrap();
        store
            .put_profile(&ordered_profile(2, "Nursing Assistant", ProfileStatus::Approved))
            .await
            .unwrap();
        store.put_profile(&ordered_profile(3, "Nurse", ProfileStatus::Approved)).await.unwrap();
        store.put_profile(&ordered_profile(4, "Nurse", ProfileStatus::Pending)).await.unwrap();

        let suggestions = miner(store).suggestions("nurs").await.unwrap();
        assert_eq!(suggestions, vec!["Nurse", "Nursing Assistant"]);
    }

    #[tokio::test]
    async fn pending_only_values_never_surface() {
        let (store, _dir) = temp_store();
        store
            .put_profile(&ordered_profile(1, "Midwife", ProfileStatus::Pending))
            .await
            .unwrap();

        assert!(miner(store).suggestions("midwife").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn matching_is_case_insensitive_and_preserves_original_case() {
        let (store, _dir) = temp_store();
        store
            .put_profile(&ordered_profile(1, "YOUTH Pastor", ProfileStatus::Approved))
            .await
            .unwrap();

        let suggestions = miner(store).suggestions("youth").await.unwrap();
        assert_eq!(suggestions, vec!["YOUTH Pastor"]);
    }

    #[tokio::test]
    async fn field_order_follows_profile_scan_order() {
        let (store, _dir) = temp_store();
        let mut first = ordered_profile(1, "Jos Tour Guide", ProfileStatus::Approved);
        first.location = "Jos".to_string();
        let mut second = ordered_profile(2, "Josiah Trainer", ProfileStatus::Approved);
        second.skills = "jos history".to_string();
        store.put_profile(&first).await.unwrap();
        store.put_profile(&second).await.unwrap();

        let suggestions = miner(store).suggestions("jos").await.unwrap();
        // First profile's profession, then its location, then the second
        // profile's fields in field order
        assert_eq!(
            suggestions,
            vec!["Jos Tour Guide", "Jos", "Josiah Trainer", "jos history"]
        );
    }

    #[tokio::test]
    async fn suggestion_count_is_capped_at_ten() {
        let (store, _dir) = temp_store();
        for i in 0..15 {
            store
                .put_profile(&ordered_profile(
                    i + 1,
                    &format!("Evangelist {}", i),
                    ProfileStatus::Approved,
                ))
                .await
                .unwrap();
        }

        let suggestions = miner(store).suggestions("evangelist").await.unwrap();
        assert_eq!(suggestions.len(), 10);
        assert_eq!(suggestions[0], "Evangelist 0");
    }
}

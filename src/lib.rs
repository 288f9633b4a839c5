//! # Member Directory Search Service
//!
//! ## Overview
//! This library implements the search subsystem of a member directory:
//! full-text profile search with exact-match filters, result hydration
//! (joining profiles to their owning users), autocomplete suggestion mining
//! and a per-user search history log.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `storage`: Persistent profile/user/history storage behind the
//!   `DirectoryStore` trait
//! - `text`: Normalization, tokenization and matching helpers
//! - `search`: Filtered full-text profile search
//! - `hydrate`: Joining matched profiles to their owning user records
//! - `suggest`: Autocomplete suggestion mining over approved profiles
//! - `history`: Append-only per-user search history log
//! - `api`: REST API endpoints
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Profile/user records, search queries (text plus filters)
//! - **Output**: Hydrated search results, suggestion strings, history entries
//! - **Visibility**: Only profiles with `Approved` status are ever returned
//!
//! ## Usage
//! ```rust,no_run
//! use directory_search::{Config, SearchEngine, SearchFilters};
//! use directory_search::storage::SledDirectoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let store = Arc::new(SledDirectoryStore::open(config.storage.clone())?);
//!     let engine = SearchEngine::new(Arc::new(config), store);
//!     let results = engine.search_profiles("pastor", &SearchFilters::default()).await?;
//!     println!("Found {} results", results.len());
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod text;
pub mod storage;
pub mod search;
pub mod hydrate;
pub mod suggest;
pub mod history;
pub mod api;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use errors::{DirectoryError, Result};
pub use hydrate::HydratedProfile;
pub use search::SearchEngine;
pub use suggest::SuggestionMiner;
pub use history::SearchHistoryLog;

// Core types used throughout the system
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for member profiles
pub type ProfileId = Uuid;

/// Unique identifier for user accounts
pub type UserId = Uuid;

/// Unique identifier for search history entries
pub type HistoryEntryId = Uuid;

/// Moderation status of a profile
///
/// Only `Approved` profiles are visible to search and suggestions; the
/// constraint is enforced at query time, not by excluding records from
/// storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Pending,
    Approved,
    Rejected,
}

/// A member's professional profile
///
/// `profession`, `skills`, `category` and `location` are the searchable
/// text fields; `category`, `location` and `country` additionally serve as
/// exact-match filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique profile identifier
    pub id: ProfileId,
    /// Owning user account
    pub user_id: UserId,
    /// Free-text profession, e.g. "Nurse"
    pub profession: String,
    /// Free-text skill summary; primary keyed field of the text index
    pub skills: String,
    /// Categorical grouping, e.g. "healthcare"
    pub category: String,
    /// City or region
    pub location: String,
    /// Country name
    pub country: String,
    /// Moderation status
    pub status: ProfileStatus,
    /// Submission timestamp
    pub created_at: DateTime<Utc>,
}

/// A user account record
///
/// Read-only from this subsystem; resolved during result hydration for
/// display purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Phone number, if shared
    pub phone: Option<String>,
    /// Account role, e.g. "member" or "admin"
    pub role: String,
}

/// Exact-match filters applied alongside the text query
///
/// Filters are AND-combined with each other and with the approved-only
/// constraint. Stored verbatim on history entries; never deep-validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Exact category match, e.g. "education"
    pub category: Option<String>,
    /// Exact location match
    pub location: Option<String>,
    /// Exact country match
    pub country: Option<String>,
}

impl SearchFilters {
    /// True when no filter field is set
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.location.is_none() && self.country.is_none()
    }

    /// Check a profile against every set filter field
    pub fn matches(&self, profile: &Profile) -> bool {
        if let Some(category) = &self.category {
            if profile.category != *category {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if profile.location != *location {
                return false;
            }
        }
        if let Some(country) = &self.country {
            if profile.country != *country {
                return false;
            }
        }
        true
    }
}

/// One recorded search, owned by the history log
///
/// Entries are immutable once written: there is no update operation, only
/// insert, read and delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    /// Unique entry identifier
    pub id: HistoryEntryId,
    /// Owning user
    pub user_id: UserId,
    /// The literal text searched
    pub query: String,
    /// Filters applied, stored verbatim for replay
    pub filters: SearchFilters,
    /// Creation time; sole sort key (descending) for retrieval
    pub timestamp: DateTime<Utc>,
}

/// Application state shared across API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub store: Arc<dyn storage::DirectoryStore>,
    pub search_engine: Arc<search::SearchEngine>,
    pub suggestions: Arc<suggest::SuggestionMiner>,
    pub history: Arc<history::SearchHistoryLog>,
}

//! # Result Hydration Module
//!
//! ## Purpose
//! Joins matched profiles to their owning user records to produce
//! display-ready composite results.
//!
//! ## Input/Output Specification
//! - **Input**: N matched profiles, in match order
//! - **Output**: N composite records, in the same order
//! - **Tolerance**: A missing or unresolvable user becomes `None`, never a
//!   failure of the batch
//!
//! ## Key Features
//! - User lookups dispatched concurrently and gathered before returning
//! - Output ordering always equals input ordering; hydration never re-sorts

use crate::storage::DirectoryStore;
use crate::{Profile, User};
use serde::{Deserialize, Serialize};

/// A profile merged with its resolved owning user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydratedProfile {
    /// The matched profile
    pub profile: Profile,
    /// The owning user, or `None` if the referenced record no longer exists
    pub user: Option<User>,
}

/// Resolve the owning user of each profile concurrently
///
/// One failed lookup degrades to `None` for that entry only; the rest of
/// the batch is unaffected.
pub async fn hydrate_profiles(
    store: &dyn DirectoryStore,
    profiles: Vec<Profile>,
) -> Vec<HydratedProfile> {
    let lookups = profiles.into_iter().map(|profile| async move {
        let user = match store.get_user(&profile.user_id).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(
                    "User lookup failed for profile {} (user {}): {}",
                    profile.id,
                    profile.user_id,
                    e
                );
                None
            }
        };
        HydratedProfile { profile, user }
    });

    futures::future::join_all(lookups).await
}

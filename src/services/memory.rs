//! In-memory collaborators.
//!
//! Thread-safe via `DashMap`; used for tests and for running the service
//! without a database.

use crate::error::{MatchError, MatchResult};
use crate::models::{Match, MatchStatus, UserProfile};
use crate::services::store::{MatchRepository, ProfileStore};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

/// In-memory match repository
///
/// Each status update runs under the entry lock of its id, which gives the
/// compare-and-swap contract of [`MatchRepository::update_status`].
#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    matches: DashMap<Uuid, Match>,
    // (viewer, candidate) -> id of the live match for that pair
    live: DashMap<(String, String), Uuid>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn create(&self, record: Match) -> MatchResult<Match> {
        if self.matches.contains_key(&record.id) {
            return Err(MatchError::StorageError(format!("match {} already exists", record.id)));
        }

        if record.status.is_live() {
            let key = (record.viewer_id.clone(), record.candidate_id.clone());
            match self.live.entry(key) {
                Entry::Occupied(existing) => {
                    return Err(MatchError::StorageError(format!(
                        "live match {} already exists for {} -> {}",
                        existing.get(),
                        record.viewer_id,
                        record.candidate_id
                    )));
                }
                Entry::Vacant(slot) => {
                    // Row goes in first so a reader that finds the slot can resolve it
                    self.matches.insert(record.id, record.clone());
                    slot.insert(record.id);
                }
            }
        } else {
            self.matches.insert(record.id, record.clone());
        }

        tracing::debug!("Stored match {} ({} -> {})", record.id, record.viewer_id, record.candidate_id);
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> MatchResult<Match> {
        self.matches
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| MatchError::NotFound(format!("match {}", id)))
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: MatchStatus,
        new: MatchStatus,
    ) -> MatchResult<Match> {
        let updated = {
            let mut entry = self
                .matches
                .get_mut(&id)
                .ok_or_else(|| MatchError::NotFound(format!("match {}", id)))?;

            if entry.status != expected {
                return Err(MatchError::InvalidTransition {
                    from: entry.status,
                    to: new,
                });
            }

            entry.status = new;
            entry.value().clone()
        };

        // Entry guard is released before touching the pair index
        if !new.is_live() {
            self.live.remove_if(
                &(updated.viewer_id.clone(), updated.candidate_id.clone()),
                |_, live_id| *live_id == id,
            );
        }

        Ok(updated)
    }

    async fn find_live(&self, viewer_id: &str, candidate_id: &str) -> MatchResult<Option<Match>> {
        let id = match self.live.get(&(viewer_id.to_string(), candidate_id.to_string())) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };

        Ok(self
            .matches
            .get(&id)
            .map(|entry| entry.value().clone())
            .filter(|m| m.status.is_live()))
    }

    async fn list_for_viewer(&self, viewer_id: &str) -> MatchResult<Vec<Match>> {
        let mut matches: Vec<Match> = self
            .matches
            .iter()
            .filter(|entry| entry.viewer_id == viewer_id)
            .map(|entry| entry.value().clone())
            .collect();

        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matches)
    }
}

/// In-memory profile store
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<String, UserProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let store = Self::new();
        for profile in profiles {
            store.upsert(profile);
        }
        store
    }

    pub fn upsert(&self, profile: UserProfile) {
        self.profiles.insert(profile.user_id.clone(), profile);
    }

    pub fn remove(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.remove(user_id).map(|(_, profile)| profile)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, user_id: &str) -> MatchResult<UserProfile> {
        self.profiles
            .get(user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| MatchError::NotFound(format!("profile {}", user_id)))
    }

    async fn candidate_pool(&self, viewer_id: &str, limit: usize) -> MatchResult<Vec<UserProfile>> {
        let mut pool: Vec<UserProfile> = self
            .profiles
            .iter()
            .filter(|entry| entry.key() != viewer_id)
            .map(|entry| entry.value().clone())
            .collect();

        // DashMap iteration order is arbitrary
        pool.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        pool.truncate(limit);
        Ok(pool)
    }
}

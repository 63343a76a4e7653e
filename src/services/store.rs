//! Collaborator interfaces consumed by the matching core.
//!
//! The core never reads ambient state: profile lookup, match persistence and
//! the authenticated user are all injected through these traits.

use crate::error::MatchResult;
use crate::models::{Match, MatchStatus, UserProfile};
use async_trait::async_trait;
use uuid::Uuid;

/// Read access to traveler profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch one profile.
    ///
    /// # Errors
    /// - `MatchError::NotFound` - no profile with that id
    /// - `MatchError::InvalidProfile` - stored enum value outside its fixed set
    /// - `MatchError::StorageError` - backend failure
    async fn get_profile(&self, user_id: &str) -> MatchResult<UserProfile>;

    /// Finite snapshot of candidate profiles for `viewer_id`.
    ///
    /// Implementations return at most `limit` profiles ordered by user id
    /// and should leave the viewer out; discovery excludes the viewer again
    /// regardless.
    async fn candidate_pool(&self, viewer_id: &str, limit: usize) -> MatchResult<Vec<UserProfile>>;
}

/// Durable storage of match records
///
/// `update_status` is a compare-and-swap: the write happens only if the
/// stored status still equals `expected`, and no other writer may interleave
/// between that check and the write for the same id. Lifecycle transitions
/// rely on this for their atomicity.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Persist a new match.
    ///
    /// # Errors
    /// - `MatchError::StorageError` - backend failure, or a live match
    ///   already exists for the same (viewer, candidate) pair
    async fn create(&self, record: Match) -> MatchResult<Match>;

    /// # Errors
    /// - `MatchError::NotFound` - unknown id
    async fn get_by_id(&self, id: Uuid) -> MatchResult<Match>;

    /// Atomically move `id` from `expected` to `new`.
    ///
    /// # Errors
    /// - `MatchError::NotFound` - unknown id
    /// - `MatchError::InvalidTransition` - stored status is not `expected`
    /// - `MatchError::StorageError` - backend failure
    async fn update_status(
        &self,
        id: Uuid,
        expected: MatchStatus,
        new: MatchStatus,
    ) -> MatchResult<Match>;

    /// The live (non-declined) match for a pair, if any
    async fn find_live(&self, viewer_id: &str, candidate_id: &str) -> MatchResult<Option<Match>>;

    /// All matches owned by `viewer_id`, newest first
    async fn list_for_viewer(&self, viewer_id: &str) -> MatchResult<Vec<Match>>;
}

/// Source of the currently authenticated user
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// `Ok(None)` when no user is signed in or the profile no longer exists
    async fn current_user(&self) -> MatchResult<Option<UserProfile>>;

    /// Drop any cached user and reload it from the backing store
    async fn refresh(&self) -> MatchResult<()>;
}

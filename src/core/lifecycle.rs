use crate::core::matcher::Matcher;
use crate::error::{MatchError, MatchResult};
use crate::models::{Match, MatchFilters, MatchStatus, UserProfile};
use crate::services::store::MatchRepository;
use std::sync::Arc;
use uuid::Uuid;

/// Match discovery and status state machine for a viewer's matches
///
/// ```text
/// pending --accept--> accepted --connect--> connected
///    \
///     ---decline----> declined
/// ```
///
/// `declined` and `connected` are terminal. Every transition is a
/// read-validate-CAS against the injected repository; a lost race or a
/// replayed request surfaces as `InvalidTransition`.
#[derive(Clone)]
pub struct MatchLifecycle {
    repository: Arc<dyn MatchRepository>,
    matcher: Matcher,
}

impl MatchLifecycle {
    pub fn new(repository: Arc<dyn MatchRepository>, matcher: Matcher) -> Self {
        Self { repository, matcher }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Ranked pending matches for `viewer` over a pool snapshot; not persisted
    pub fn find_matches(
        &self,
        viewer: &UserProfile,
        candidates: &[UserProfile],
        filters: &MatchFilters,
    ) -> Vec<Match> {
        self.matcher.find_matches(viewer, candidates, filters)
    }

    /// Run discovery and persist the top `limit` results
    ///
    /// A pair that already has a live match keeps it: the stored match is
    /// returned in place of the freshly scored one and nothing is written.
    pub async fn discover(
        &self,
        viewer: &UserProfile,
        candidates: &[UserProfile],
        filters: &MatchFilters,
        limit: usize,
    ) -> MatchResult<Vec<Match>> {
        let mut ranked = self.find_matches(viewer, candidates, filters);
        ranked.truncate(limit);

        let mut stored = Vec::with_capacity(ranked.len());
        let mut created = 0usize;
        for candidate_match in ranked {
            let (record, is_new) = self.persist(candidate_match).await?;
            if is_new {
                created += 1;
            }
            stored.push(record);
        }

        tracing::info!(
            "Discovered {} matches for {} ({} new)",
            stored.len(),
            viewer.user_id,
            created
        );

        Ok(stored)
    }

    /// Store a freshly scored match unless its pair already has a live one
    async fn persist(&self, candidate_match: Match) -> MatchResult<(Match, bool)> {
        let viewer_id = candidate_match.viewer_id.clone();
        let candidate_id = candidate_match.candidate_id.clone();

        if let Some(existing) = self.repository.find_live(&viewer_id, &candidate_id).await? {
            return Ok((existing, false));
        }

        match self.repository.create(candidate_match).await {
            Ok(record) => Ok((record, true)),
            Err(err) => {
                // A concurrent discover may have stored the pair since find_live
                match self.repository.find_live(&viewer_id, &candidate_id).await? {
                    Some(existing) => {
                        tracing::debug!(
                            "Live match for {} -> {} appeared during discovery",
                            viewer_id,
                            candidate_id
                        );
                        Ok((existing, false))
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Fetch one of the viewer's matches
    pub async fn get(&self, viewer_id: &str, match_id: Uuid) -> MatchResult<Match> {
        let found = self.repository.get_by_id(match_id).await?;
        if found.viewer_id != viewer_id {
            // Other viewers' matches are invisible, not forbidden
            return Err(MatchError::NotFound(format!("match {}", match_id)));
        }
        Ok(found)
    }

    /// All of the viewer's matches, newest first
    pub async fn list(&self, viewer_id: &str) -> MatchResult<Vec<Match>> {
        self.repository.list_for_viewer(viewer_id).await
    }

    /// pending -> accepted
    pub async fn accept(&self, viewer_id: &str, match_id: Uuid) -> MatchResult<Match> {
        self.transition(viewer_id, match_id, MatchStatus::Accepted).await
    }

    /// pending -> declined
    pub async fn decline(&self, viewer_id: &str, match_id: Uuid) -> MatchResult<Match> {
        self.transition(viewer_id, match_id, MatchStatus::Declined).await
    }

    /// accepted -> connected
    pub async fn connect(&self, viewer_id: &str, match_id: Uuid) -> MatchResult<Match> {
        self.transition(viewer_id, match_id, MatchStatus::Connected).await
    }

    async fn transition(
        &self,
        viewer_id: &str,
        match_id: Uuid,
        target: MatchStatus,
    ) -> MatchResult<Match> {
        let current = self.get(viewer_id, match_id).await?;

        if !current.status.can_transition_to(target) {
            tracing::info!(
                "Rejected transition {} -> {} for match {}",
                current.status,
                target,
                match_id
            );
            return Err(MatchError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }

        let updated = self
            .repository
            .update_status(match_id, current.status, target)
            .await?;

        tracing::info!(
            "Match {} moved {} -> {} by {}",
            match_id,
            current.status,
            updated.status,
            viewer_id
        );

        Ok(updated)
    }
}

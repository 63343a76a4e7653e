use crate::core::{
    filters::{matches_attribute_filters, meets_min_compatibility},
    scoring::calculate_compatibility,
};
use crate::models::{Compatibility, Match, MatchFilters, ScoringWeights, UserProfile};
use chrono::{DateTime, Utc};

/// Discovery pipeline over an in-memory candidate pool
///
/// # Pipeline Stages
/// 1. Self exclusion
/// 2. Attribute filters (travel styles, interests)
/// 3. Compatibility scoring
/// 4. Minimum compatibility threshold
/// 5. Ranking (score descending, candidate id ascending)
///
/// Holds no mutable state; clones are cheap and may be shared freely.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Compatibility of `candidate` as seen by `viewer`
    pub fn score(&self, viewer: &UserProfile, candidate: &UserProfile) -> Compatibility {
        calculate_compatibility(viewer, candidate, &self.weights)
    }

    /// Find ranked pending matches for `viewer`
    ///
    /// Nothing is persisted; every returned match is fresh and `pending`.
    pub fn find_matches(
        &self,
        viewer: &UserProfile,
        candidates: &[UserProfile],
        filters: &MatchFilters,
    ) -> Vec<Match> {
        self.find_matches_at(viewer, candidates, filters, Utc::now())
    }

    /// Same as [`Matcher::find_matches`] with an explicit creation timestamp
    pub fn find_matches_at(
        &self,
        viewer: &UserProfile,
        candidates: &[UserProfile],
        filters: &MatchFilters,
        now: DateTime<Utc>,
    ) -> Vec<Match> {
        let mut matches: Vec<Match> = candidates
            .iter()
            // Stage 1: never match the viewer with themselves
            .filter(|candidate| candidate.user_id != viewer.user_id)
            // Stage 2: attribute filters
            .filter(|candidate| matches_attribute_filters(candidate, filters))
            // Stage 3 & 4: score and threshold
            .filter_map(|candidate| {
                let compatibility = self.score(viewer, candidate);
                if meets_min_compatibility(compatibility.score, filters) {
                    Some(Match::pending(&viewer.user_id, &candidate.user_id, compatibility, now))
                } else {
                    None
                }
            })
            .collect();

        // Stage 5: score descending, then candidate id ascending
        matches.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });

        tracing::debug!(
            "Ranked {} matches for {} from {} candidates",
            matches.len(),
            viewer.user_id,
            candidates.len()
        );

        matches
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchStatus, TravelStyle, VerificationStatus};
    use std::collections::BTreeSet;

    fn create_candidate(
        id: &str,
        interests: &[&str],
        style: TravelStyle,
        verification: VerificationStatus,
    ) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            name: Some(format!("User {}", id)),
            interests: interests.iter().map(|s| s.to_string()).collect(),
            travel_style: style,
            languages: BTreeSet::from(["English".to_string()]),
            verification_status: verification,
        }
    }

    fn create_viewer() -> UserProfile {
        create_candidate(
            "current_user",
            &["Beach", "Food", "Photography"],
            TravelStyle::Adventure,
            VerificationStatus::EmailVerified,
        )
    }

    #[test]
    fn test_find_matches_excludes_viewer() {
        let matcher = Matcher::with_default_weights();
        let viewer = create_viewer();

        let candidates = vec![
            viewer.clone(),
            create_candidate("1", &["Beach"], TravelStyle::Solo, VerificationStatus::Unverified),
        ];

        let matches = matcher.find_matches(&viewer, &candidates, &MatchFilters::default());

        assert_eq!(matches.len(), 1);
        assert!(matches.iter().all(|m| m.candidate_id != viewer.user_id));
    }

    #[test]
    fn test_matches_sorted_by_score_then_id() {
        let matcher = Matcher::with_default_weights();
        let viewer = create_viewer();

        let candidates = vec![
            create_candidate("b", &["Beach"], TravelStyle::Group, VerificationStatus::Unverified),
            create_candidate("a", &["Beach"], TravelStyle::Group, VerificationStatus::Unverified),
            create_candidate(
                "c",
                &["Beach", "Food", "Photography"],
                TravelStyle::Adventure,
                VerificationStatus::FullyVerified,
            ),
        ];

        let matches = matcher.find_matches(&viewer, &candidates, &MatchFilters::default());

        let order: Vec<&str> = matches.iter().map(|m| m.candidate_id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert_eq!(matches[1].score, matches[2].score);
    }

    #[test]
    fn test_matches_are_pending_with_shared_timestamp() {
        let matcher = Matcher::with_default_weights();
        let viewer = create_viewer();
        let now = Utc::now();

        let candidates = vec![
            create_candidate("1", &["Food"], TravelStyle::Cultural, VerificationStatus::IdVerified),
            create_candidate("2", &[], TravelStyle::Luxury, VerificationStatus::Unverified),
        ];

        let matches = matcher.find_matches_at(&viewer, &candidates, &MatchFilters::default(), now);

        assert_eq!(matches.len(), 2);
        for m in &matches {
            assert_eq!(m.status, MatchStatus::Pending);
            assert_eq!(m.created_at, now);
            assert_eq!(m.viewer_id, "current_user");
        }
        assert_ne!(matches[0].id, matches[1].id);
    }

    #[test]
    fn test_min_compatibility_threshold() {
        let matcher = Matcher::with_default_weights();
        let viewer = create_viewer();

        let candidates = vec![
            create_candidate(
                "close",
                &["Beach", "Food", "Photography"],
                TravelStyle::Adventure,
                VerificationStatus::FullyVerified,
            ),
            create_candidate("far", &[], TravelStyle::Luxury, VerificationStatus::Unverified),
        ];

        let filters = MatchFilters {
            min_compatibility: Some(50),
            ..Default::default()
        };
        let matches = matcher.find_matches(&viewer, &candidates, &filters);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].candidate_id, "close");
    }

    #[test]
    fn test_shared_interests_are_subset_of_both() {
        let matcher = Matcher::with_default_weights();
        let viewer = create_viewer();
        let candidates = vec![create_candidate(
            "1",
            &["Food", "Diving", "Photography"],
            TravelStyle::Budget,
            VerificationStatus::Unverified,
        )];

        let matches = matcher.find_matches(&viewer, &candidates, &MatchFilters::default());

        for interest in &matches[0].shared_interests {
            assert!(viewer.interests.contains(interest));
            assert!(candidates[0].interests.contains(interest));
        }
        assert_eq!(matches[0].shared_interests.len(), 2);
    }
}

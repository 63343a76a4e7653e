use crate::models::{Compatibility, ScoringWeights, TravelStyle, UserProfile, VerificationStatus};
use std::collections::BTreeSet;

/// Calculate a compatibility score (0-100) of `candidate` as seen by `viewer`
///
/// Scoring formula:
/// score = round(
///     interests * |shared| / max(|viewer|, |candidate|) +   # 40
///     style (exact 30, partial 15) +
///     min(language_cap, per_language * |shared languages|) +  # 10 each, cap 20
///     candidate verification bonus                            # full 10, id 5
/// ) clamped to [0, 100]
///
/// The verification term only looks at the candidate, so
/// `calculate_compatibility(a, b)` and `calculate_compatibility(b, a)` differ
/// whenever the two verification tiers earn different bonuses.
pub fn calculate_compatibility(
    viewer: &UserProfile,
    candidate: &UserProfile,
    weights: &ScoringWeights,
) -> Compatibility {
    let shared_interests: BTreeSet<String> = viewer
        .interests
        .intersection(&candidate.interests)
        .cloned()
        .collect();

    let interest_score = calculate_interest_score(
        shared_interests.len(),
        viewer.interests.len(),
        candidate.interests.len(),
        weights.interests,
    );

    let style_score = calculate_style_score(viewer.travel_style, candidate.travel_style, weights);

    let shared_languages = viewer.languages.intersection(&candidate.languages).count();
    let language_score = calculate_language_score(shared_languages, weights);

    let verification_score = calculate_verification_bonus(candidate.verification_status, weights);

    let total = interest_score + style_score + language_score + verification_score;

    Compatibility {
        score: round_score(total),
        shared_interests,
    }
}

/// Interest overlap relative to the larger of the two interest sets
#[inline]
fn calculate_interest_score(shared: usize, viewer_len: usize, candidate_len: usize, weight: f64) -> f64 {
    let denom = viewer_len.max(candidate_len);
    if denom == 0 {
        return 0.0;
    }
    weight * shared as f64 / denom as f64
}

#[inline]
fn calculate_style_score(viewer: TravelStyle, candidate: TravelStyle, weights: &ScoringWeights) -> f64 {
    if viewer == candidate {
        weights.style_exact
    } else if viewer.partially_compatible().contains(&candidate) {
        weights.style_partial
    } else {
        0.0
    }
}

#[inline]
fn calculate_language_score(shared: usize, weights: &ScoringWeights) -> f64 {
    (weights.language_per_shared * shared as f64).min(weights.language_cap)
}

#[inline]
fn calculate_verification_bonus(status: VerificationStatus, weights: &ScoringWeights) -> f64 {
    match status {
        VerificationStatus::FullyVerified => weights.fully_verified,
        VerificationStatus::IdVerified => weights.id_verified,
        VerificationStatus::EmailVerified | VerificationStatus::Unverified => 0.0,
    }
}

/// Clamp to [0, 100] and round half-up
#[inline]
fn round_score(total: f64) -> u8 {
    let clamped = if total.is_nan() { 0.0 } else { total.clamp(0.0, 100.0) };
    (clamped + 0.5).floor() as u8
}

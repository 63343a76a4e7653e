// Unit tests for TripMate Match

use std::collections::BTreeSet;
use tripmate_match::core::{
    filters::matches_attribute_filters, scoring::calculate_compatibility, Matcher,
};
use tripmate_match::models::{
    MatchFilters, ScoringWeights, TravelStyle, UserProfile, VerificationStatus,
};

const VERIFICATION_LEVELS: [VerificationStatus; 4] = [
    VerificationStatus::Unverified,
    VerificationStatus::EmailVerified,
    VerificationStatus::IdVerified,
    VerificationStatus::FullyVerified,
];

fn traveler(
    id: &str,
    interests: &[&str],
    style: TravelStyle,
    languages: &[&str],
    verification: VerificationStatus,
) -> UserProfile {
    UserProfile {
        user_id: id.to_string(),
        name: None,
        interests: interests.iter().map(|s| s.to_string()).collect(),
        travel_style: style,
        languages: languages.iter().map(|s| s.to_string()).collect(),
        verification_status: verification,
    }
}

#[test]
fn test_score_always_within_range() {
    let interest_sets: [&[&str]; 4] = [
        &[],
        &["Beach"],
        &["Beach", "Food", "Art"],
        &["Hiking", "Food", "History", "Diving", "Photography"],
    ];
    let language_sets: [&[&str]; 3] = [&[], &["English"], &["English", "Tamil", "Sinhala"]];
    let weights = ScoringWeights::default();

    let mut profiles = Vec::new();
    for (i, interests) in interest_sets.iter().enumerate() {
        for style in TravelStyle::ALL {
            for (j, languages) in language_sets.iter().enumerate() {
                for verification in VERIFICATION_LEVELS {
                    profiles.push(traveler(
                        &format!("{}-{}-{}", i, style, j),
                        interests,
                        style,
                        languages,
                        verification,
                    ));
                }
            }
        }
    }

    for viewer in profiles.iter().step_by(7) {
        for candidate in &profiles {
            let result = calculate_compatibility(viewer, candidate, &weights);
            assert!(result.score <= 100, "score {} out of range", result.score);
            assert!(result.shared_interests.is_subset(&viewer.interests));
            assert!(result.shared_interests.is_subset(&candidate.interests));
        }
    }
}

#[test]
fn test_identical_fully_verified_candidate_scores_100() {
    let a = traveler(
        "a",
        &["Beach", "Food"],
        TravelStyle::Relaxation,
        &["English", "Sinhala"],
        VerificationStatus::Unverified,
    );
    let b = traveler(
        "b",
        &["Beach", "Food"],
        TravelStyle::Relaxation,
        &["English", "Sinhala"],
        VerificationStatus::FullyVerified,
    );

    let result = calculate_compatibility(&a, &b, &ScoringWeights::default());
    assert_eq!(result.score, 100);
    assert_eq!(result.shared_interests.len(), 2);
}

#[test]
fn test_nothing_in_common_scores_0() {
    let a = traveler("a", &[], TravelStyle::Luxury, &[], VerificationStatus::FullyVerified);
    let b = traveler("b", &[], TravelStyle::Budget, &[], VerificationStatus::Unverified);

    let result = calculate_compatibility(&a, &b, &ScoringWeights::default());
    assert_eq!(result.score, 0);
    assert!(result.shared_interests.is_empty());
}

#[test]
fn test_score_is_asymmetric_across_verification_tiers() {
    let a = traveler(
        "a",
        &["History"],
        TravelStyle::Cultural,
        &["English"],
        VerificationStatus::EmailVerified,
    );
    let b = traveler(
        "b",
        &["History"],
        TravelStyle::Cultural,
        &["English"],
        VerificationStatus::FullyVerified,
    );
    let weights = ScoringWeights::default();

    let a_sees_b = calculate_compatibility(&a, &b, &weights).score;
    let b_sees_a = calculate_compatibility(&b, &a, &weights).score;

    assert_ne!(a_sees_b, b_sees_a);
    assert_eq!(a_sees_b - b_sees_a, 10);
}

#[test]
fn test_worked_example() {
    let viewer = traveler(
        "viewer",
        &["Hiking", "Beach", "Food"],
        TravelStyle::Adventure,
        &["English"],
        VerificationStatus::EmailVerified,
    );
    let candidate = traveler(
        "candidate",
        &["Beach", "Food", "Art"],
        TravelStyle::Cultural,
        &["English", "French"],
        VerificationStatus::IdVerified,
    );

    let result = calculate_compatibility(&viewer, &candidate, &ScoringWeights::default());

    assert_eq!(result.score, 57);
    assert_eq!(
        result.shared_interests,
        BTreeSet::from(["Beach".to_string(), "Food".to_string()])
    );
}

#[test]
fn test_empty_viewer_interests_contribute_nothing() {
    let viewer = traveler("v", &[], TravelStyle::Solo, &[], VerificationStatus::Unverified);
    let candidate = traveler(
        "c",
        &["Beach", "Food"],
        TravelStyle::Solo,
        &[],
        VerificationStatus::Unverified,
    );

    // Only the exact style match counts
    let result = calculate_compatibility(&viewer, &candidate, &ScoringWeights::default());
    assert_eq!(result.score, 30);
}

#[test]
fn test_find_matches_tie_break_by_candidate_id() {
    let matcher = Matcher::with_default_weights();
    let viewer = traveler(
        "viewer",
        &["Beach"],
        TravelStyle::Budget,
        &["English"],
        VerificationStatus::Unverified,
    );

    let pool = vec![
        traveler("zed", &["Beach"], TravelStyle::Group, &["English"], VerificationStatus::Unverified),
        traveler("amy", &["Beach"], TravelStyle::Group, &["English"], VerificationStatus::Unverified),
        viewer.clone(),
    ];

    let matches = matcher.find_matches(&viewer, &pool, &MatchFilters::default());

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].score, matches[1].score);
    assert_eq!(matches[0].candidate_id, "amy");
    assert_eq!(matches[1].candidate_id, "zed");
}

#[test]
fn test_attribute_filters_before_scoring() {
    let candidate = traveler(
        "c",
        &["Diving"],
        TravelStyle::Relaxation,
        &[],
        VerificationStatus::IdVerified,
    );

    let wanted = MatchFilters {
        travel_styles: Some(BTreeSet::from([TravelStyle::Relaxation, TravelStyle::Luxury])),
        interests: Some(BTreeSet::from(["Diving".to_string(), "Sports".to_string()])),
        min_compatibility: None,
    };
    assert!(matches_attribute_filters(&candidate, &wanted));

    let unwanted = MatchFilters {
        interests: Some(BTreeSet::from(["Sports".to_string()])),
        ..wanted
    };
    assert!(!matches_attribute_filters(&candidate, &unwanted));
}

// Criterion benchmarks for TripMate Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::BTreeSet;
use tripmate_match::core::{calculate_compatibility, filters::matches_attribute_filters, Matcher};
use tripmate_match::models::{
    MatchFilters, ScoringWeights, TravelStyle, UserProfile, VerificationStatus,
};

const INTERESTS: [&str; 10] = [
    "Beach", "Hiking", "Food", "History", "Diving", "Photography", "Nature", "Culture", "Surfing",
    "Wildlife",
];
const LANGUAGES: [&str; 4] = ["English", "Sinhala", "Tamil", "French"];
const VERIFICATION_LEVELS: [VerificationStatus; 4] = [
    VerificationStatus::Unverified,
    VerificationStatus::EmailVerified,
    VerificationStatus::IdVerified,
    VerificationStatus::FullyVerified,
];

fn create_candidate(id: usize) -> UserProfile {
    UserProfile {
        user_id: format!("user{:05}", id),
        name: Some(format!("User {}", id)),
        interests: (0..1 + id % 4)
            .map(|k| INTERESTS[(id + k * 3) % INTERESTS.len()].to_string())
            .collect(),
        travel_style: TravelStyle::ALL[id % TravelStyle::ALL.len()],
        languages: (0..1 + id % 2)
            .map(|k| LANGUAGES[(id + k) % LANGUAGES.len()].to_string())
            .collect(),
        verification_status: VERIFICATION_LEVELS[id % VERIFICATION_LEVELS.len()],
    }
}

fn create_viewer() -> UserProfile {
    UserProfile {
        user_id: "current_user".to_string(),
        name: None,
        interests: ["Beach", "Food", "Photography"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        travel_style: TravelStyle::Adventure,
        languages: BTreeSet::from(["English".to_string()]),
        verification_status: VerificationStatus::EmailVerified,
    }
}

fn bench_compatibility(c: &mut Criterion) {
    let viewer = create_viewer();
    let candidate = create_candidate(7);
    let weights = ScoringWeights::default();

    c.bench_function("calculate_compatibility", |b| {
        b.iter(|| calculate_compatibility(black_box(&viewer), black_box(&candidate), &weights));
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::with_default_weights();
    let viewer = create_viewer();
    let filters = MatchFilters {
        min_compatibility: Some(30),
        ..MatchFilters::default()
    };

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let candidates: Vec<UserProfile> = (0..*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::new("find_matches", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    matcher.find_matches(
                        black_box(&viewer),
                        black_box(&candidates),
                        black_box(&filters),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_attribute_filters(c: &mut Criterion) {
    let candidates: Vec<UserProfile> = (0..100).map(create_candidate).collect();
    let filters = MatchFilters {
        min_compatibility: None,
        travel_styles: Some(BTreeSet::from([TravelStyle::Adventure, TravelStyle::Solo])),
        interests: Some(BTreeSet::from(["Hiking".to_string(), "Diving".to_string()])),
    };

    c.bench_function("attribute_filters_100_candidates", |b| {
        b.iter(|| {
            let filtered: Vec<_> = candidates
                .iter()
                .filter(|p| matches_attribute_filters(p, &filters))
                .collect();
            black_box(filtered)
        });
    });
}

criterion_group!(
    benches,
    bench_compatibility,
    bench_matching,
    bench_attribute_filters
);

criterion_main!(benches);

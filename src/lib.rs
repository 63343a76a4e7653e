//! TripMate Match - compatibility scoring and match lifecycle for travel companions
//!
//! This library scores how well two traveler profiles fit together, turns a
//! candidate pool into ranked pending matches, and drives each match through
//! its pending / accepted / declined / connected lifecycle against an
//! injected repository.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_compatibility, MatchLifecycle, Matcher};
pub use error::{MatchError, MatchResult};
pub use models::{
    Compatibility, Match, MatchFilters, MatchStatus, ScoringWeights, TravelStyle, UserProfile,
    VerificationStatus,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let matcher = Matcher::default();
        assert_eq!(matcher.weights(), &ScoringWeights::default());
    }
}

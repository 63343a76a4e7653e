// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Compatibility, Match, MatchFilters, MatchStatus, ProfileRecord, ScoringWeights, TravelStyle,
    UserProfile, VerificationStatus,
};
pub use requests::FindMatchesRequest;
pub use responses::{
    CompatibilityResponse, ErrorResponse, FindMatchesResponse, HealthResponse, MatchListResponse,
};

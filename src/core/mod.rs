// Core algorithm exports
pub mod filters;
pub mod lifecycle;
pub mod matcher;
pub mod scoring;

pub use filters::{matches_attribute_filters, meets_min_compatibility};
pub use lifecycle::MatchLifecycle;
pub use matcher::Matcher;
pub use scoring::calculate_compatibility;

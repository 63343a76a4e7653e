use crate::models::{MatchFilters, UserProfile};

/// Check if a candidate passes the attribute filters
///
/// Runs before scoring. Travel styles and interests are conjunctive; a
/// `None` or empty filter accepts everything.
#[inline]
pub fn matches_attribute_filters(candidate: &UserProfile, filters: &MatchFilters) -> bool {
    if let Some(styles) = filters.travel_styles.as_ref().filter(|s| !s.is_empty()) {
        if !styles.contains(&candidate.travel_style) {
            return false;
        }
    }

    // At least one of the requested interests must be present
    if let Some(interests) = filters.interests.as_ref().filter(|i| !i.is_empty()) {
        if interests.is_disjoint(&candidate.interests) {
            return false;
        }
    }

    true
}

/// Check a computed score against the minimum compatibility threshold
#[inline]
pub fn meets_min_compatibility(score: u8, filters: &MatchFilters) -> bool {
    filters.min_compatibility.map_or(true, |min| score >= min)
}

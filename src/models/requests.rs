use crate::models::domain::MatchFilters;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Request to discover matches for the session user
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[serde(default)]
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u16>,
    #[serde(default)]
    #[validate(custom(function = "validate_filters"))]
    pub filters: MatchFilters,
}

fn validate_filters(filters: &MatchFilters) -> Result<(), ValidationError> {
    if let Some(min) = filters.min_compatibility {
        if min > 100 {
            return Err(ValidationError::new("min_compatibility_out_of_range"));
        }
    }
    if let Some(interests) = &filters.interests {
        if interests.iter().any(|i| i.trim().is_empty()) {
            return Err(ValidationError::new("empty_interest_tag"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_default_request_is_valid() {
        let req: FindMatchesRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.limit.is_none());
    }

    #[test]
    fn test_rejects_threshold_above_100() {
        let req = FindMatchesRequest {
            limit: Some(10),
            filters: MatchFilters {
                min_compatibility: Some(101),
                ..Default::default()
            },
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_rejects_blank_interest() {
        let req = FindMatchesRequest {
            limit: None,
            filters: MatchFilters {
                interests: Some(BTreeSet::from(["  ".to_string()])),
                ..Default::default()
            },
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_limit() {
        let req = FindMatchesRequest {
            limit: Some(0),
            filters: MatchFilters::default(),
        };
        assert!(req.validate().is_err());
    }
}

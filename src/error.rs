use crate::models::MatchStatus;
use thiserror::Error;

/// Errors surfaced by the matching core
///
/// Every failure is typed so the presentation layer can render each one
/// differently; nothing here is collapsed into a generic error.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: MatchStatus, to: MatchStatus },

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl MatchError {
    /// Short machine-readable code used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::InvalidProfile(_) => "invalid_profile",
            MatchError::NotFound(_) => "not_found",
            MatchError::InvalidTransition { .. } => "invalid_transition",
            MatchError::StorageError(_) => "storage_error",
        }
    }
}

pub type MatchResult<T> = Result<T, MatchError>;

use crate::error::{MatchError, MatchResult};
use crate::models::{ProfileRecord, UserProfile};
use crate::services::store::ProfileStore;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<SupabaseError> for MatchError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::NotFound(what) => MatchError::NotFound(what),
            other => MatchError::StorageError(other.to_string()),
        }
    }
}

/// Supabase (PostgREST) client for traveler profiles
///
/// Reads rows from the profiles table and validates them into
/// [`UserProfile`]s; rows with enum values outside the fixed sets fail with
/// `InvalidProfile` instead of being coerced.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    profiles_table: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        profiles_table: String,
        timeout: Duration,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            profiles_table,
            client,
        })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            self.profiles_table
        )
    }

    async fn get_rows(&self, url: &str) -> Result<Vec<ProfileRecord>, SupabaseError> {
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let response = check_status(response).await?;

        response
            .json::<Vec<ProfileRecord>>()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse profiles: {}", e)))
    }

    /// Fetch the raw profile row for a user
    pub async fn fetch_profile(&self, user_id: &str) -> Result<ProfileRecord, SupabaseError> {
        let url = format!(
            "{}?id=eq.{}&select=*&limit=1",
            self.table_url(),
            urlencoding::encode(user_id)
        );

        tracing::debug!("Fetching profile for user: {}", user_id);

        self.get_rows(&url)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("profile {}", user_id)))
    }

    /// Fetch raw candidate rows, excluding the viewer
    pub async fn fetch_candidates(
        &self,
        viewer_id: &str,
        limit: usize,
    ) -> Result<Vec<ProfileRecord>, SupabaseError> {
        let url = format!(
            "{}?id=neq.{}&select=*&order=id.asc&limit={}",
            self.table_url(),
            urlencoding::encode(viewer_id),
            limit
        );

        let rows = self.get_rows(&url).await?;
        tracing::debug!("Queried {} candidate profiles for {}", rows.len(), viewer_id);
        Ok(rows)
    }
}

async fn check_status(response: Response) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(SupabaseError::Unauthorized);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read body".to_string());
    tracing::error!("Supabase request failed: {} - {}", status, body);
    Err(SupabaseError::ApiError(format!("{}: {}", status, body)))
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn get_profile(&self, user_id: &str) -> MatchResult<UserProfile> {
        let record = self.fetch_profile(user_id).await?;
        UserProfile::try_from(record)
    }

    async fn candidate_pool(&self, viewer_id: &str, limit: usize) -> MatchResult<Vec<UserProfile>> {
        self.fetch_candidates(viewer_id, limit)
            .await?
            .into_iter()
            .filter(|record| record.id != viewer_id)
            .map(UserProfile::try_from)
            .collect()
    }
}

use crate::error::{MatchError, MatchResult};
use crate::models::UserProfile;
use crate::services::store::{ProfileStore, SessionProvider};
use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised while authenticating a request
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// JWT claims issued by the auth backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// HS256 bearer token verifier
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, issuer: Option<&str>, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Verify the token in an `Authorization: Bearer ...` header value
    pub fn verify_header(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let token = header
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        self.verify(token)
    }
}

/// Session backed by verified token claims and a profile store
///
/// The profile is loaded lazily on first use and cached for the life of the
/// session; `refresh` reloads it.
pub struct TokenSession {
    claims: Claims,
    profiles: Arc<dyn ProfileStore>,
    cached: RwLock<Option<UserProfile>>,
}

impl TokenSession {
    pub fn new(claims: Claims, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            claims,
            profiles,
            cached: RwLock::new(None),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }

    async fn load(&self) -> MatchResult<Option<UserProfile>> {
        match self.profiles.get_profile(&self.claims.sub).await {
            Ok(profile) => Ok(Some(profile)),
            Err(MatchError::NotFound(_)) => {
                tracing::warn!("Token subject {} has no profile", self.claims.sub);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl SessionProvider for TokenSession {
    async fn current_user(&self) -> MatchResult<Option<UserProfile>> {
        if let Some(profile) = self.cached.read().await.as_ref() {
            return Ok(Some(profile.clone()));
        }

        let loaded = self.load().await?;
        *self.cached.write().await = loaded.clone();
        Ok(loaded)
    }

    async fn refresh(&self) -> MatchResult<()> {
        let loaded = self.load().await?;
        *self.cached.write().await = loaded;
        Ok(())
    }
}

/// Fixed session, for tests and tooling
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<UserProfile>,
}

impl StaticSession {
    pub fn signed_in(user: UserProfile) -> Self {
        Self { user: Some(user) }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_user(&self) -> MatchResult<Option<UserProfile>> {
        Ok(self.user.clone())
    }

    async fn refresh(&self) -> MatchResult<()> {
        Ok(())
    }
}

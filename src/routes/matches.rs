use crate::core::MatchLifecycle;
use crate::error::MatchError;
use crate::models::{
    CompatibilityResponse, ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse,
    MatchListResponse, UserProfile,
};
use crate::services::{
    AuthError, PostgresMatchRepository, ProfileStore, SessionProvider, TokenSession, TokenVerifier,
};
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, ResponseError};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Discovery limits applied by the HTTP layer
#[derive(Debug, Clone, Copy)]
pub struct MatchingLimits {
    pub default_limit: u16,
    pub max_limit: u16,
    pub pool_size: usize,
    pub default_min_compatibility: Option<u8>,
}

impl Default for MatchingLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            pool_size: 500,
            default_min_compatibility: None,
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<MatchLifecycle>,
    pub profiles: Arc<dyn ProfileStore>,
    pub verifier: Arc<TokenVerifier>,
    pub postgres: Option<Arc<PostgresMatchRepository>>,
    pub limits: MatchingLimits,
}

/// Handler error rendered as a JSON `ErrorResponse`
#[derive(Debug)]
pub enum ApiError {
    Match(MatchError),
    Auth(AuthError),
    Unauthorized(String),
    Validation(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Match(e) => write!(f, "{}", e),
            ApiError::Auth(e) => write!(f, "{}", e),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Validation(msg) => write!(f, "Validation failed: {}", msg),
        }
    }
}

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        ApiError::Match(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Match(MatchError::InvalidProfile(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Match(MatchError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Match(MatchError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            ApiError::Match(MatchError::StorageError(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error = match self {
            ApiError::Match(e) => e.code(),
            ApiError::Auth(_) | ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Validation(_) => "validation_failed",
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches", web::get().to(list_matches))
        .route("/matches/{id}", web::get().to(get_match))
        .route("/matches/{id}/accept", web::post().to(accept_match))
        .route("/matches/{id}/decline", web::post().to(decline_match))
        .route("/matches/{id}/connect", web::post().to(connect_match))
        .route("/compatibility/{candidate_id}", web::get().to(compatibility));
}

/// Resolve the signed-in traveler from the bearer token
async fn session_user(state: &AppState, req: &HttpRequest) -> Result<UserProfile, ApiError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok());
    let claims = state.verifier.verify_header(header)?;

    let session = TokenSession::new(claims, state.profiles.clone());
    session
        .current_user()
        .await?
        .ok_or_else(|| ApiError::Unauthorized(format!("no profile for {}", session.user_id())))
}

fn parse_match_id(raw: &str) -> Result<Uuid, ApiError> {
    // Malformed ids cannot name an existing match
    Uuid::parse_str(raw).map_err(|_| ApiError::Match(MatchError::NotFound(format!("match {}", raw))))
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let status = match &state.postgres {
        Some(pg) => {
            if pg.health_check().await.unwrap_or(false) {
                "healthy"
            } else {
                "degraded"
            }
        }
        None => "healthy",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Discover matches for the signed-in traveler
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "limit": 20,
///   "filters": {
///     "minCompatibility": 40,
///     "travelStyles": ["adventure", "solo"],
///     "interests": ["Hiking"]
///   }
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let viewer = session_user(&state, &http_req).await?;

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return Err(ApiError::Validation(errors.to_string()));
    }

    let request = req.into_inner();

    let limit = request
        .limit
        .unwrap_or(state.limits.default_limit)
        .min(state.limits.max_limit) as usize;

    let mut filters = request.filters;
    if filters.min_compatibility.is_none() {
        filters.min_compatibility = state.limits.default_min_compatibility;
    }

    tracing::info!("Finding matches for user: {}, limit: {}", viewer.user_id, limit);

    let pool = state
        .profiles
        .candidate_pool(&viewer.user_id, state.limits.pool_size)
        .await?;
    let total_candidates = pool.len();

    let matches = state
        .lifecycle
        .discover(&viewer, &pool, &filters, limit)
        .await?;

    tracing::info!(
        "Returning {} matches for user {} (from {} candidates)",
        matches.len(),
        viewer.user_id,
        total_candidates
    );

    Ok(HttpResponse::Ok().json(FindMatchesResponse {
        matches,
        total_candidates,
    }))
}

/// GET /api/v1/matches
async fn list_matches(
    state: web::Data<AppState>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let viewer = session_user(&state, &http_req).await?;
    let matches = state.lifecycle.list(&viewer.user_id).await?;

    Ok(HttpResponse::Ok().json(MatchListResponse {
        count: matches.len(),
        matches,
    }))
}

/// GET /api/v1/matches/{id}
async fn get_match(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let viewer = session_user(&state, &http_req).await?;
    let id = parse_match_id(&path)?;
    let found = state.lifecycle.get(&viewer.user_id, id).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// POST /api/v1/matches/{id}/accept
async fn accept_match(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let viewer = session_user(&state, &http_req).await?;
    let id = parse_match_id(&path)?;
    let updated = state.lifecycle.accept(&viewer.user_id, id).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// POST /api/v1/matches/{id}/decline
async fn decline_match(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let viewer = session_user(&state, &http_req).await?;
    let id = parse_match_id(&path)?;
    let updated = state.lifecycle.decline(&viewer.user_id, id).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// POST /api/v1/matches/{id}/connect
///
/// Called by the client when the traveler opens a conversation with an
/// accepted match.
async fn connect_match(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let viewer = session_user(&state, &http_req).await?;
    let id = parse_match_id(&path)?;
    let updated = state.lifecycle.connect(&viewer.user_id, id).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Score preview against one traveler
///
/// GET /api/v1/compatibility/{candidate_id}
async fn compatibility(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let viewer = session_user(&state, &http_req).await?;
    let candidate = state.profiles.get_profile(&path).await?;
    let compatibility = state.lifecycle.matcher().score(&viewer, &candidate);

    Ok(HttpResponse::Ok().json(CompatibilityResponse {
        candidate_id: candidate.user_id,
        compatibility,
    }))
}

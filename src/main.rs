use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tripmate_match::config::{LoggingSettings, Settings};
use tripmate_match::routes::{self, AppState, MatchingLimits};
use tripmate_match::services::{
    CacheManager, CachedProfileStore, InMemoryMatchRepository, MatchRepository,
    PostgresMatchRepository, ProfileStore, SupabaseClient, TokenVerifier,
};
use tripmate_match::{MatchLifecycle, Matcher, ScoringWeights};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging);
    info!("Starting TripMate match service...");

    // Profile store: Supabase behind a two-tier cache
    let supabase = SupabaseClient::new(
        settings.supabase.url.clone(),
        settings.supabase.api_key.clone(),
        settings.supabase.profiles_table.clone(),
        Duration::from_secs(settings.supabase.timeout_secs),
    )
    .map_err(|e| startup_error("Failed to build Supabase client", e))?;

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match &settings.cache.redis_url {
        Some(url) => match CacheManager::new(url, l1_cache_size, cache_ttl).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
                CacheManager::l1_only(l1_cache_size, cache_ttl)
            }
        },
        None => CacheManager::l1_only(l1_cache_size, cache_ttl),
    };
    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, Redis: {})",
        l1_cache_size,
        cache_ttl,
        cache.has_redis()
    );

    let profiles: Arc<dyn ProfileStore> =
        Arc::new(CachedProfileStore::new(Arc::new(supabase), Arc::new(cache)));

    // Match repository: PostgreSQL when configured, otherwise in memory
    let (repository, postgres): (Arc<dyn MatchRepository>, Option<Arc<PostgresMatchRepository>>) =
        match &settings.database.url {
            Some(url) => {
                let pg = Arc::new(
                    PostgresMatchRepository::from_settings(
                        url,
                        settings.database.max_connections,
                        settings.database.min_connections,
                        settings.database.acquire_timeout_secs,
                        settings.database.idle_timeout_secs,
                    )
                    .await
                    .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?,
                );
                info!(
                    "PostgreSQL match repository initialized (max: {} connections)",
                    settings.database.max_connections.unwrap_or(10)
                );
                (pg.clone() as Arc<dyn MatchRepository>, Some(pg))
            }
            None => {
                warn!("No database URL configured, matches are kept in memory");
                (Arc::new(InMemoryMatchRepository::new()) as Arc<dyn MatchRepository>, None)
            }
        };

    let weights = ScoringWeights::from(&settings.scoring.weights);
    let matcher = Matcher::new(weights);
    info!("Matcher initialized with weights: {:?}", weights);

    let verifier = TokenVerifier::new(
        &settings.auth.jwt_secret,
        settings.auth.issuer.as_deref(),
        settings.auth.leeway_secs,
    );

    let app_state = AppState {
        lifecycle: Arc::new(MatchLifecycle::new(repository, matcher)),
        profiles,
        verifier: Arc::new(verifier),
        postgres,
        limits: MatchingLimits {
            default_limit: settings.matching.default_limit,
            max_limit: settings.matching.max_limit,
            pool_size: settings.matching.pool_size,
            default_min_compatibility: settings.matching.default_min_compatibility,
        },
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

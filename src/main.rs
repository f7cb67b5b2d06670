use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use compat_score::config::Settings;
use compat_score::core::Ranker;
use compat_score::routes::{self, AppState};
use compat_score::services::{CacheManager, PostgresClient, ProfileStore, TokenVerifier};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    // Initialize logging; RUST_LOG still wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting compat-score service...");
    info!("Configuration loaded successfully");

    let verifier = TokenVerifier::new(&settings.auth.jwt_secret, &settings.auth.jwt_algorithm)
        .map_err(|e| {
            error!("Invalid auth configuration: {}", e);
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
        })?;

    // Cache: redis when configured and reachable, in-process only otherwise
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match &settings.cache.redis_url {
        Some(url) => match CacheManager::new(url, l1_cache_size, cache_ttl).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to connect to Redis ({}), using in-process cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => CacheManager::in_memory(l1_cache_size, cache_ttl),
    };

    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, redis: {})",
        l1_cache_size,
        cache_ttl,
        cache.has_l2()
    );

    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        Some(db_max_conn),
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e)
    })?;

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let ranker = Ranker::new(
        settings.scoring.domain_policy(),
        settings.matching.parallel_threshold,
    );

    info!(
        "Ranker initialized (policy: {:?}, parallel threshold: {})",
        ranker.policy(),
        settings.matching.parallel_threshold
    );

    let store: Arc<dyn ProfileStore> = Arc::new(postgres);

    let app_state = AppState {
        store,
        cache: Some(Arc::new(cache)),
        verifier,
        ranker,
        matching: settings.matching.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .app_data(routes::query_config())
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

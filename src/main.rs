use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use archmatch::auth::JwtVerifier;
use archmatch::config::{LoggingSettings, Settings};
use archmatch::core::Matcher;
use archmatch::error::{handle_json_payload_error, handle_path_error, handle_query_payload_error};
use archmatch::models::ScoringWeights;
use archmatch::routes::{self, AppState};
use archmatch::services::{CacheManager, LlmClient, PostgresClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn io_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(io_error(format!("Configuration error: {}", e)));
        }
    };

    init_logging(&settings.logging);

    info!("Starting Archmatch matching service...");

    // Cache: Redis when reachable, in-process otherwise
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match settings.cache.redis_url.as_deref() {
        Some(url) => match CacheManager::new(url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized with Redis (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
                c
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
                CacheManager::local_only(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("No Redis configured, running with in-process cache only");
            CacheManager::local_only(l1_cache_size, cache_ttl)
        }
    };

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        io_error(format!("PostgreSQL connection error: {}", e))
    })?;

    info!(
        "PostgreSQL client initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    let llm = if settings.llm.enabled {
        let client = LlmClient::new(
            settings.llm.endpoint.clone(),
            settings.llm.model.clone(),
            settings.llm.api_key.clone(),
            Duration::from_secs(settings.llm.timeout_secs),
            settings.llm.temperature,
        )
        .map_err(|e| io_error(format!("LLM client error: {}", e)))?;

        info!("LLM re-ranking enabled ({} at {})", client.model(), settings.llm.endpoint);
        Some(Arc::new(client))
    } else {
        info!("LLM re-ranking disabled, using rule-based ranking only");
        None
    };

    let weights = ScoringWeights::from(&settings.scoring.weights);
    let matcher = Matcher::new(weights, settings.matching.params());

    info!("Matcher initialized with weights: {:?}", weights);

    let app_state = AppState {
        postgres: Arc::new(postgres),
        cache: Arc::new(cache),
        llm,
        matcher,
        matching: settings.matching.clone(),
        llm_blend_weight: settings.llm.blend_weight,
    };

    let verifier = web::Data::new(JwtVerifier::new(&settings.auth.jwt_secret, settings.auth.leeway_secs));

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(verifier.clone())
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
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

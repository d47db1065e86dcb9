use actix_web::{web, HttpResponse, Responder};
use crate::models::HealthResponse;
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

/// Health check endpoint
///
/// Reports `degraded` if the database is down or an enabled LLM is unreachable.
/// The matcher still answers without the LLM, so this is informational.
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let database = state.postgres.health_check().await.unwrap_or(false);

    let llm = match &state.llm {
        Some(client) => Some(client.health_check().await),
        None => None,
    };

    let healthy = database && llm.unwrap_or(true);

    HttpResponse::Ok().json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        llm,
        cache: state.cache.stats(),
        timestamp: chrono::Utc::now(),
    })
}

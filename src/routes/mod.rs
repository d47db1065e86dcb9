// Route exports
pub mod architects;
pub mod health;
pub mod matches;
pub mod need_sheets;

use actix_web::web;
use std::sync::Arc;

use crate::config::MatchingSettings;
use crate::core::Matcher;
use crate::services::{CacheManager, LlmClient, PostgresClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    /// Present only when LLM re-ranking is enabled
    pub llm: Option<Arc<LlmClient>>,
    pub matcher: Matcher,
    pub matching: MatchingSettings,
    pub llm_blend_weight: f64,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(architects::configure)
            .configure(need_sheets::configure)
            .configure(matches::configure),
    );
}

use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthUser, Role};
use crate::core::{apply_llm_ranking, rules_only, Side};
use crate::error::ApiError;
use crate::models::{
    DecisionRequest, DecisionResponse, Match, NeedSheet, RankingSource, RunMatchRequest,
    RunMatchResponse,
};
use crate::routes::AppState;
use crate::services::{CacheKey, CacheManager};

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/matches/run", web::post().to(run_match))
        .route("/matches/{need_sheet_id}", web::get().to(get_match))
        .route("/matches/{need_sheet_id}/decision", web::post().to(record_decision));
}

async fn load_owned_need_sheet(
    state: &AppState,
    user: &AuthUser,
    need_sheet_id: Uuid,
) -> Result<NeedSheet, ApiError> {
    let need_sheet = state
        .postgres
        .get_need_sheet(need_sheet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Needsheet {} not found", need_sheet_id)))?;

    if !user.is_self_or_admin(&need_sheet.client_id) {
        return Err(ApiError::Forbidden("Needsheet belongs to another client".to_string()));
    }

    Ok(need_sheet)
}

/// Run matching for a needsheet
///
/// POST /api/v1/matches/run
///
/// Request body:
/// ```json
/// {
///   "needSheetId": "uuid",
///   "limit": 10,
///   "excludeArchitectIds": ["string"],
///   "useLlm": true
/// }
/// ```
async fn run_match(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<RunMatchRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;

    let need_sheet = load_owned_need_sheet(&state, &user, req.need_sheet_id).await?;

    let limit = req
        .limit
        .unwrap_or(state.matching.default_limit)
        .min(state.matching.max_limit) as usize;

    let llm = state.llm.as_ref().filter(|_| req.use_llm.unwrap_or(true));

    // The LLM sees a wider pool than the caller asked for
    let pool_size = match llm {
        Some(_) => limit.max(state.matching.llm_candidate_pool as usize),
        None => limit,
    };

    tracing::info!("Running match for needsheet {}, limit: {}, llm: {}", need_sheet.id, limit, llm.is_some());

    let architects = state
        .postgres
        .query_candidates(&need_sheet, state.matching.candidate_fetch_limit)
        .await?;

    let ranked = state
        .matcher
        .rank(&need_sheet, architects, &req.exclude_architect_ids, pool_size);

    let (mut reranked, source) = match llm {
        Some(client) if !ranked.candidates.is_empty() => {
            match client.rerank(&need_sheet, &ranked.candidates).await {
                Ok(verdicts) => {
                    match apply_llm_ranking(ranked.candidates.clone(), &verdicts, state.llm_blend_weight) {
                        Some(reranked) => (reranked, RankingSource::Llm),
                        None => {
                            tracing::warn!(
                                "LLM verdicts for needsheet {} matched no candidate, using rule-based order",
                                need_sheet.id
                            );
                            (rules_only(ranked.candidates), RankingSource::Rules)
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("LLM re-rank failed for needsheet {}, using rule-based order: {}", need_sheet.id, e);
                    (rules_only(ranked.candidates), RankingSource::Rules)
                }
            }
        }
        _ => (rules_only(ranked.candidates), RankingSource::Rules),
    };

    reranked.truncate(limit);

    let match_doc = state.postgres.store_ranking(&need_sheet, reranked, source).await?;

    if let Err(e) = state.cache.set(&CacheKey::match_for(&need_sheet.id), &match_doc).await {
        tracing::warn!("Failed to cache match for needsheet {}: {}", need_sheet.id, e);
    }

    tracing::info!(
        "Stored {} candidates for needsheet {} (from {} architects, {} eligible, source: {:?})",
        match_doc.candidates.len(),
        need_sheet.id,
        ranked.total_considered,
        ranked.total_eligible,
        source
    );

    Ok(HttpResponse::Ok().json(RunMatchResponse {
        match_doc,
        total_considered: ranked.total_considered,
        total_eligible: ranked.total_eligible,
    }))
}

/// Cached match, only if it is still the stored version
async fn fresh_cached_match(cache: &CacheManager, key: &str, version: i64) -> Option<Match> {
    match cache.get::<Match>(key).await {
        Ok(cached) if cached.version == version => Some(cached),
        Ok(cached) => {
            tracing::debug!("Cached match {} is v{}, store has v{}", key, cached.version, version);
            None
        }
        Err(_) => None,
    }
}

/// Fetch the stored match of a needsheet
///
/// GET /api/v1/matches/{needSheetId}
async fn get_match(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let need_sheet_id = path.into_inner();
    let cache_key = CacheKey::match_for(&need_sheet_id);

    let version = state
        .postgres
        .match_version(need_sheet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No match for needsheet {}", need_sheet_id)))?;

    let match_doc = match fresh_cached_match(&state.cache, &cache_key, version).await {
        Some(cached) => cached,
        None => {
            let stored = state
                .postgres
                .get_match_for_need_sheet(need_sheet_id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("No match for needsheet {}", need_sheet_id)))?;

            if let Err(e) = state.cache.set(&cache_key, &stored).await {
                tracing::warn!("Failed to cache match for needsheet {}: {}", need_sheet_id, e);
            }
            stored
        }
    };

    if !user.is_self_or_admin(&match_doc.client_id) {
        return Err(ApiError::Forbidden("Match belongs to another client".to_string()));
    }

    Ok(HttpResponse::Ok().json(match_doc))
}

/// Record an approval or rejection for one candidate
///
/// POST /api/v1/matches/{needSheetId}/decision
///
/// Request body:
/// ```json
/// {
///   "architectId": "string",
///   "decision": "approved|rejected"
/// }
/// ```
async fn record_decision(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<DecisionRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate()?;
    let need_sheet_id = path.into_inner();

    let side = match user.role {
        Role::Client => {
            load_owned_need_sheet(&state, &user, need_sheet_id).await?;
            Side::Client
        }
        Role::Architect => {
            if user.user_id != req.architect_id {
                return Err(ApiError::Forbidden("Architects may only answer for themselves".to_string()));
            }
            Side::Architect
        }
        Role::Admin => {
            return Err(ApiError::Forbidden("Admins cannot decide on behalf of either side".to_string()));
        }
    };

    let candidate = state
        .postgres
        .record_decision(need_sheet_id, &req.architect_id, side, req.decision)
        .await?;

    if let Err(e) = state.cache.delete(&CacheKey::match_for(&need_sheet_id)).await {
        tracing::warn!("Failed to invalidate cached match for needsheet {}: {}", need_sheet_id, e);
    }

    tracing::info!(
        "{:?} {} answered {:?} for {} on needsheet {} -> {:?}",
        side,
        user.user_id,
        req.decision,
        req.architect_id,
        need_sheet_id,
        candidate.status
    );

    Ok(HttpResponse::Ok().json(DecisionResponse {
        need_sheet_id,
        candidate,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{assemble_match, RerankedCandidate};
    use crate::models::{ScoreBreakdown, ScoredCandidate};

    fn match_doc() -> Match {
        let sheet = NeedSheet {
            id: Uuid::new_v4(),
            client_id: "client-1".to_string(),
            title: "Studio".to_string(),
            description: None,
            required_services: vec![],
            preferred_styles: vec![],
            location: None,
            max_distance_km: None,
            budget_min: None,
            budget_max: 10_000.0,
            start_within_weeks: 0,
            created_at: chrono::Utc::now(),
        };
        let ranked = RerankedCandidate {
            candidate: ScoredCandidate {
                architect_id: "arch-a".to_string(),
                name: "Arch A".to_string(),
                distance_km: None,
                rule_score: 80.0,
                breakdown: ScoreBreakdown::default(),
                matched_services: vec![],
                matched_styles: vec![],
            },
            score: 80.0,
            llm_score: None,
            rationale: None,
        };
        assemble_match(&sheet, vec![ranked], RankingSource::Rules, None)
    }

    #[tokio::test]
    async fn test_cached_match_served_only_at_stored_version() {
        let cache = CacheManager::local_only(10, 60);
        let doc = match_doc();
        let key = CacheKey::match_for(&doc.need_sheet_id);

        assert!(fresh_cached_match(&cache, &key, 1).await.is_none());

        cache.set(&key, &doc).await.unwrap();
        assert_eq!(fresh_cached_match(&cache, &key, 1).await.unwrap().id, doc.id);

        // A decision recorded elsewhere bumped the stored version
        assert!(fresh_cached_match(&cache, &key, 2).await.is_none());
    }

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_stale_l1_copy_on_other_instance_is_not_served() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let instance_a = CacheManager::new(&url, 10, 60).await.expect("Failed to create cache");
        let instance_b = CacheManager::new(&url, 10, 60).await.expect("Failed to create cache");

        let doc = match_doc();
        let key = CacheKey::match_for(&doc.need_sheet_id);

        instance_a.set(&key, &doc).await.unwrap();
        assert!(fresh_cached_match(&instance_a, &key, 1).await.is_some());

        // Instance B records a decision: the store moves to v2 and B invalidates
        instance_b.delete(&key).await.unwrap();

        // A still holds v1 in its L1
        assert_eq!(instance_a.get::<Match>(&key).await.unwrap().version, 1);
        assert!(fresh_cached_match(&instance_a, &key, 2).await.is_none());

        instance_a.delete(&key).await.unwrap();
    }
}

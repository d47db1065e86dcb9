use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::{AuthUser, Role};
use crate::error::ApiError;
use crate::models::{ArchitectMatchesResponse, ArchitectProfile, ListQuery, UpsertArchitectRequest};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/architects", web::get().to(list_architects))
        .route("/architects/{architect_id}", web::get().to(get_architect))
        .route("/architects/{architect_id}", web::put().to(upsert_architect))
        .route("/architects/{architect_id}/matches", web::get().to(architect_matches));
}

/// Create or replace an architect profile
///
/// PUT /api/v1/architects/{architectId}
///
/// Architects may only edit their own profile. Verification can only be
/// changed by admins; otherwise the stored flag is kept.
async fn upsert_architect(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
    req: web::Json<UpsertArchitectRequest>,
) -> Result<HttpResponse, ApiError> {
    let architect_id = path.into_inner();

    let allowed = user.is_admin() || (user.role == Role::Architect && user.user_id == architect_id);
    if !allowed {
        return Err(ApiError::Forbidden("Only the architect or an admin may edit this profile".to_string()));
    }

    req.validate()?;
    let req = req.into_inner();

    let existing = state.postgres.get_architect(&architect_id).await?;

    let is_verified = match (user.is_admin(), req.is_verified) {
        (true, Some(verified)) => verified,
        _ => existing.as_ref().is_some_and(|a| a.is_verified),
    };

    let profile = ArchitectProfile {
        architect_id,
        name: req.name,
        services: clean_tags(req.services),
        styles: clean_tags(req.styles),
        location: req.location,
        service_radius_km: req.service_radius_km,
        min_project_fee: req.min_project_fee,
        available_in_weeks: req.available_in_weeks,
        is_active: req.is_active.unwrap_or(true),
        is_verified,
        bio: req.bio,
        updated_at: None,
    };

    let stored = state.postgres.upsert_architect(&profile).await?;

    tracing::info!(
        "{} architect profile {}",
        if existing.is_some() { "Updated" } else { "Created" },
        stored.architect_id
    );

    Ok(HttpResponse::Ok().json(stored))
}

/// Trim tags and drop blanks and case-insensitive duplicates
pub(crate) fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(tags.len());
    let mut cleaned = Vec::with_capacity(tags.len());

    for tag in tags {
        let trimmed = tag.trim();
        let key = crate::core::normalize_tag(trimmed);
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        cleaned.push(trimmed.to_string());
    }

    cleaned
}

/// GET /api/v1/architects/{architectId}
async fn get_architect(
    state: web::Data<AppState>,
    _user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let architect_id = path.into_inner();

    let architect = state
        .postgres
        .get_architect(&architect_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Architect {} not found", architect_id)))?;

    Ok(HttpResponse::Ok().json(architect))
}

/// GET /api/v1/architects?limit=20&offset=0
async fn list_architects(
    state: web::Data<AppState>,
    _user: AuthUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.limit.clamp(1, 100);
    let architects = state.postgres.list_architects(limit, query.offset).await?;

    Ok(HttpResponse::Ok().json(architects))
}

/// Candidacies of an architect across all needsheets
///
/// GET /api/v1/architects/{architectId}/matches
async fn architect_matches(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let architect_id = path.into_inner();

    if !user.is_self_or_admin(&architect_id) {
        return Err(ApiError::Forbidden("Architects may only view their own matches".to_string()));
    }

    let candidacies = state.postgres.list_candidates_for_architect(&architect_id).await?;

    Ok(HttpResponse::Ok().json(ArchitectMatchesResponse {
        count: candidacies.len(),
        architect_id,
        candidacies,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_tags() {
        let tags = vec![
            " Residential ".to_string(),
            "".to_string(),
            "residential".to_string(),
            "Interior".to_string(),
        ];
        assert_eq!(clean_tags(tags), vec!["Residential", "Interior"]);
    }
}

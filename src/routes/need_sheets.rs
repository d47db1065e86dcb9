use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthUser, Role};
use crate::error::ApiError;
use crate::models::{CreateNeedSheetRequest, ListQuery, NeedSheet};
use crate::routes::{architects::clean_tags, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/needsheets", web::post().to(create_need_sheet))
        .route("/needsheets", web::get().to(list_need_sheets))
        .route("/needsheets/{need_sheet_id}", web::get().to(get_need_sheet));
}

/// Submit a needsheet
///
/// POST /api/v1/needsheets
async fn create_need_sheet(
    state: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<CreateNeedSheetRequest>,
) -> Result<HttpResponse, ApiError> {
    if user.role != Role::Client {
        return Err(ApiError::Forbidden("Only clients can submit needsheets".to_string()));
    }

    req.validate()?;
    let req = req.into_inner();

    let need_sheet = NeedSheet {
        id: Uuid::new_v4(),
        client_id: user.user_id,
        title: req.title.trim().to_string(),
        description: req.description,
        required_services: clean_tags(req.required_services),
        preferred_styles: clean_tags(req.preferred_styles),
        location: req.location,
        max_distance_km: req.max_distance_km,
        budget_min: req.budget_min,
        budget_max: req.budget_max,
        start_within_weeks: req.start_within_weeks,
        created_at: chrono::Utc::now(),
    };

    state.postgres.create_need_sheet(&need_sheet).await?;

    tracing::info!("Client {} submitted needsheet {}", need_sheet.client_id, need_sheet.id);

    Ok(HttpResponse::Created().json(need_sheet))
}

/// GET /api/v1/needsheets/{needSheetId}
async fn get_need_sheet(
    state: web::Data<AppState>,
    user: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let need_sheet_id = path.into_inner();

    let need_sheet = state
        .postgres
        .get_need_sheet(need_sheet_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Needsheet {} not found", need_sheet_id)))?;

    if !user.is_self_or_admin(&need_sheet.client_id) {
        return Err(ApiError::Forbidden("Needsheet belongs to another client".to_string()));
    }

    Ok(HttpResponse::Ok().json(need_sheet))
}

/// The caller's own needsheets, newest first
///
/// GET /api/v1/needsheets?limit=20&offset=0
async fn list_need_sheets(
    state: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.limit.clamp(1, 100);
    let need_sheets = state
        .postgres
        .list_need_sheets_for_client(&user.user_id, limit, query.offset)
        .await?;

    Ok(HttpResponse::Ok().json(need_sheets))
}

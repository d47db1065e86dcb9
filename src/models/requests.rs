use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};
use crate::models::domain::{Decision, GeoPoint};

/// Request to create a needsheet
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_need_sheet"))]
pub struct CreateNeedSheetRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required_services: Vec<String>,
    #[serde(default)]
    pub preferred_styles: Vec<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub budget_min: Option<f64>,
    #[validate(range(min = 0.0))]
    pub budget_max: f64,
    #[serde(default)]
    #[validate(range(max = 520))]
    pub start_within_weeks: u16,
}

fn validate_need_sheet(req: &CreateNeedSheetRequest) -> Result<(), ValidationError> {
    if let Some(min) = req.budget_min {
        if min > req.budget_max {
            return Err(ValidationError::new("budget_min_exceeds_max"));
        }
    }
    validate_location(req.location.as_ref())
}

/// Request to create or replace an architect profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_architect"))]
pub struct UpsertArchitectRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    #[validate(range(exclusive_min = 0.0))]
    pub service_radius_km: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub min_project_fee: Option<f64>,
    #[serde(default)]
    #[validate(range(max = 520))]
    pub available_in_weeks: u16,
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Only honoured for admins
    #[serde(default)]
    pub is_verified: Option<bool>,
    #[serde(default)]
    pub bio: Option<String>,
}

fn validate_architect(req: &UpsertArchitectRequest) -> Result<(), ValidationError> {
    validate_location(req.location.as_ref())
}

fn validate_location(location: Option<&GeoPoint>) -> Result<(), ValidationError> {
    match location {
        Some(p) if !(-90.0..=90.0).contains(&p.latitude) || !(-180.0..=180.0).contains(&p.longitude) => {
            Err(ValidationError::new("location_out_of_range"))
        }
        _ => Ok(()),
    }
}

/// Request to run matching for a needsheet
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RunMatchRequest {
    pub need_sheet_id: Uuid,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub limit: Option<u16>,
    #[serde(default)]
    pub exclude_architect_ids: Vec<String>,
    #[serde(default)]
    pub use_llm: Option<bool>,
}

/// Request to approve or reject one candidate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    #[validate(length(min = 1))]
    pub architect_id: String,
    pub decision: Decision,
}

/// Pagination query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_page_limit() -> u32 {
    20
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A point on the globe in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Architect profile as seen by the matcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectProfile {
    pub architect_id: String,
    pub name: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub styles: Vec<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub service_radius_km: Option<f64>,
    #[serde(default)]
    pub min_project_fee: Option<f64>,
    #[serde(default)]
    pub available_in_weeks: u16,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn default_true() -> bool { true }

/// Client-submitted project requirements, the input to matching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeedSheet {
    pub id: Uuid,
    pub client_id: String,
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
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub budget_min: Option<f64>,
    pub budget_max: f64,
    #[serde(default)]
    pub start_within_weeks: u16,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Per-component scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub services: f64,
    pub location: f64,
    pub budget: f64,
    pub timeline: f64,
    pub style: f64,
}

/// Architect that passed the hard filters, with its rule-based score
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub architect_id: String,
    pub name: String,
    pub distance_km: Option<f64>,
    pub rule_score: f64,
    pub breakdown: ScoreBreakdown,
    pub matched_services: Vec<String>,
    pub matched_styles: Vec<String>,
}

/// One side's answer to a proposed pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "decision", rename_all = "lowercase")]
pub enum Decision {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Combined state of a candidate pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Matched,
}

impl MatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Rejected | MatchStatus::Matched)
    }
}

/// Which ranking produced the final candidate order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "ranking_source", rename_all = "lowercase")]
pub enum RankingSource {
    Rules,
    Llm,
}

/// Stored candidate inside a match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub architect_id: String,
    pub name: String,
    pub rank: u32,
    pub score: f64,
    pub rule_score: f64,
    pub llm_score: Option<f64>,
    pub rationale: Option<String>,
    pub distance_km: Option<f64>,
    pub breakdown: ScoreBreakdown,
    pub matched_services: Vec<String>,
    pub matched_styles: Vec<String>,
    pub client_decision: Decision,
    pub architect_decision: Decision,
    pub status: MatchStatus,
}

/// Match document for one needsheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,
    pub need_sheet_id: Uuid,
    pub client_id: String,
    pub ranking_source: RankingSource,
    pub candidates: Vec<MatchCandidate>,
    /// Bumped by every stored change; cached copies are checked against it
    pub version: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Match {
    pub fn candidate(&self, architect_id: &str) -> Option<&MatchCandidate> {
        self.candidates.iter().find(|c| c.architect_id == architect_id)
    }

    pub fn candidate_mut(&mut self, architect_id: &str) -> Option<&mut MatchCandidate> {
        self.candidates.iter_mut().find(|c| c.architect_id == architect_id)
    }
}

/// An architect's candidacy on some needsheet, for the architect inbox
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectCandidacy {
    pub need_sheet_id: Uuid,
    pub need_sheet_title: String,
    pub client_id: String,
    pub rank: u32,
    pub score: f64,
    pub client_decision: Decision,
    pub architect_decision: Decision,
    pub status: MatchStatus,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Scoring weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub services: f64,
    pub location: f64,
    pub budget: f64,
    pub timeline: f64,
    pub style: f64,
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.services + self.location + self.budget + self.timeline + self.style
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            services: 0.35,
            location: 0.20,
            budget: 0.20,
            timeline: 0.15,
            style: 0.10,
        }
    }
}

/// Tunables for the ranking pipeline
#[derive(Debug, Clone, Copy)]
pub struct MatchingParams {
    pub default_radius_km: f64,
    pub timeline_horizon_weeks: f64,
    pub min_score: f64,
}

impl Default for MatchingParams {
    fn default() -> Self {
        Self {
            default_radius_km: 50.0,
            timeline_horizon_weeks: 12.0,
            min_score: 20.0,
        }
    }
}

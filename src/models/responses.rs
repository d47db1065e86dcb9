use serde::{Deserialize, Serialize};
use crate::models::domain::{ArchitectCandidacy, Match, MatchCandidate};
use crate::services::CacheStats;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: bool,
    pub llm: Option<bool>,
    pub cache: CacheStats,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Response for a matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMatchResponse {
    #[serde(rename = "match")]
    pub match_doc: Match,
    pub total_considered: usize,
    pub total_eligible: usize,
}

/// Response after recording a decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    pub need_sheet_id: uuid::Uuid,
    pub candidate: MatchCandidate,
}

/// Architect inbox
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectMatchesResponse {
    pub architect_id: String,
    pub candidacies: Vec<ArchitectCandidacy>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_is_camel_case() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            database: true,
            llm: None,
            cache: CacheStats { l1_size: 3, redis_enabled: true },
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["cache"]["l1Size"], 3);
        assert_eq!(json["cache"]["redisEnabled"], true);
        assert!(json["cache"].get("redis_enabled").is_none());
        assert!(json["llm"].is_null());
    }
}

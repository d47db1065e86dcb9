// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ArchitectCandidacy, ArchitectProfile, BoundingBox, Decision, GeoPoint, Match, MatchCandidate,
    MatchStatus, MatchingParams, NeedSheet, RankingSource, ScoreBreakdown, ScoredCandidate,
    ScoringWeights,
};
pub use requests::{CreateNeedSheetRequest, DecisionRequest, ListQuery, RunMatchRequest, UpsertArchitectRequest};
pub use responses::{ArchitectMatchesResponse, DecisionResponse, ErrorResponse, HealthResponse, RunMatchResponse};

// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod rerank;
pub mod scoring;
pub mod status;

pub use distance::{haversine_distance, calculate_bounding_box, distance_between, is_within_bounding_box, longitude_ranges};
pub use filters::{is_eligible, normalize_tag, tag_overlap};
pub use matcher::{Matcher, RankResult, rank_order};
pub use rerank::{apply_llm_ranking, rules_only, LlmVerdict, RerankedCandidate};
pub use scoring::{calculate_match_score, RuleScore};
pub use status::{apply_decision, assemble_match, derive_status, Side, StatusError};

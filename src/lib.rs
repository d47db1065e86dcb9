//! Archmatch - architect matching service for the architect marketplace
//!
//! Ranks architects for a client's needsheet with a weighted rule-based
//! scorer, optionally re-ranks the shortlist through a locally hosted LLM,
//! and tracks mutual client/architect approval of each proposed pairing.

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Matcher, distance::{haversine_distance, calculate_bounding_box}};
pub use models::{ArchitectProfile, NeedSheet, Match, MatchCandidate, MatchStatus, ScoredCandidate, ScoringWeights};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    #[test]
    fn test_library_exports() {
        let center = GeoPoint::new(40.7128, -74.0060);
        let bbox = calculate_bounding_box(&center, 10.0);
        assert!(bbox.min_lat < center.latitude);
        assert_eq!(Matcher::default().weights(), &ScoringWeights::default());
    }
}

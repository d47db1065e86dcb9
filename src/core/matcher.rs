use std::cmp::Ordering;
use crate::models::{ArchitectProfile, MatchingParams, NeedSheet, ScoredCandidate, ScoringWeights};
use crate::core::{filters::is_eligible, scoring::calculate_match_score};

/// Result of the ranking process
#[derive(Debug)]
pub struct RankResult {
    pub candidates: Vec<ScoredCandidate>,
    pub total_considered: usize,
    pub total_eligible: usize,
}

/// Total order used for every candidate list
///
/// Score descending, then distance ascending with unknown distances last,
/// then architect id ascending.
pub fn rank_order(
    (score_a, distance_a, id_a): (f64, Option<f64>, &str),
    (score_b, distance_b, id_b): (f64, Option<f64>, &str),
) -> Ordering {
    score_b
        .partial_cmp(&score_a)
        .unwrap_or(Ordering::Equal)
        .then_with(|| match (distance_a, distance_b) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| id_a.cmp(id_b))
}

/// Rule-based ranking orchestrator
///
/// # Pipeline Stages
/// 1. Hard eligibility filter
/// 2. Five-component scoring
/// 3. Minimum score cut-off
/// 4. Deterministic ordering and truncation
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
    params: MatchingParams,
}

impl Matcher {
    pub fn new(weights: ScoringWeights, params: MatchingParams) -> Self {
        Self { weights, params }
    }

    pub fn with_defaults() -> Self {
        Self::new(ScoringWeights::default(), MatchingParams::default())
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Rank architects for a needsheet
    ///
    /// # Arguments
    /// * `need_sheet` - The client's requirements
    /// * `architects` - Candidate architects, typically pre-filtered by the store
    /// * `exclude_ids` - Architect ids that must not be proposed
    /// * `limit` - Maximum number of candidates to return
    pub fn rank(
        &self,
        need_sheet: &NeedSheet,
        architects: Vec<ArchitectProfile>,
        exclude_ids: &[String],
        limit: usize,
    ) -> RankResult {
        let total_considered = architects.len();
        let mut total_eligible = 0;

        let mut candidates: Vec<ScoredCandidate> = architects
            .into_iter()
            .filter(|architect| is_eligible(architect, need_sheet, exclude_ids))
            .inspect(|_| total_eligible += 1)
            .filter_map(|architect| {
                let rule = calculate_match_score(&architect, need_sheet, &self.weights, &self.params);

                if rule.score < self.params.min_score {
                    tracing::trace!(
                        "Dropping {} for needsheet {}: score {:.1} below {:.1}",
                        architect.architect_id,
                        need_sheet.id,
                        rule.score,
                        self.params.min_score
                    );
                    return None;
                }

                Some(ScoredCandidate {
                    architect_id: architect.architect_id,
                    name: architect.name,
                    distance_km: rule.distance_km,
                    rule_score: rule.score,
                    breakdown: rule.breakdown,
                    matched_services: rule.matched_services,
                    matched_styles: rule.matched_styles,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            rank_order(
                (a.rule_score, a.distance_km, &a.architect_id),
                (b.rule_score, b.distance_km, &b.architect_id),
            )
        });

        candidates.truncate(limit);

        RankResult {
            candidates,
            total_considered,
            total_eligible,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}

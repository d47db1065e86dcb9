use crate::models::{ArchitectProfile, MatchingParams, NeedSheet, ScoreBreakdown, ScoringWeights};
use crate::core::{
    distance::distance_between,
    filters::{has_tags, normalize_tag, tag_overlap},
};

/// Score used when a component has nothing to compare
const NEUTRAL: f64 = 0.5;

/// Output of the rule-based scorer for a single architect
#[derive(Debug, Clone)]
pub struct RuleScore {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub distance_km: Option<f64>,
    pub matched_services: Vec<String>,
    pub matched_styles: Vec<String>,
}

/// Calculate a rule-based match score (0-100) for an architect against a needsheet
///
/// Scoring formula:
/// score = 100 * (
///     services_score * w.services +   # share of required services offered
///     location_score * w.location +   # Haversine distance, decaying
///     budget_score * w.budget +       # budget / fee ratio buckets
///     timeline_score * w.timeline +   # linear decay on availability gap
///     style_score * w.style           # share of preferred styles
/// ) / sum(w)
pub fn calculate_match_score(
    architect: &ArchitectProfile,
    need_sheet: &NeedSheet,
    weights: &ScoringWeights,
    params: &MatchingParams,
) -> RuleScore {
    let matched_services = tag_overlap(&need_sheet.required_services, &architect.services);
    let services = calculate_services_score(&need_sheet.required_services, matched_services.len());

    let distance_km = distance_between(need_sheet.location.as_ref(), architect.location.as_ref());
    let radius_km = need_sheet.max_distance_km.unwrap_or(params.default_radius_km);
    let location = calculate_location_score(distance_km, radius_km);

    let budget = calculate_budget_score(need_sheet.budget_max, architect.min_project_fee);

    let timeline = calculate_timeline_score(
        architect.available_in_weeks,
        need_sheet.start_within_weeks,
        params.timeline_horizon_weeks,
    );

    let matched_styles = tag_overlap(&need_sheet.preferred_styles, &architect.styles);
    let style = calculate_style_score(&need_sheet.preferred_styles, matched_styles.len());

    let breakdown = ScoreBreakdown { services, location, budget, timeline, style };

    RuleScore {
        score: weighted_score(&breakdown, weights),
        breakdown,
        distance_km,
        matched_services,
        matched_styles,
    }
}

/// Combine component scores into 0-100
pub fn weighted_score(breakdown: &ScoreBreakdown, weights: &ScoringWeights) -> f64 {
    let total_weight = weights.total();
    if total_weight <= 0.0 {
        return 0.0;
    }

    let weighted = breakdown.services * weights.services
        + breakdown.location * weights.location
        + breakdown.budget * weights.budget
        + breakdown.timeline * weights.timeline
        + breakdown.style * weights.style;

    (weighted / total_weight * 100.0).clamp(0.0, 100.0)
}

/// Share of required services the architect offers (0-1)
#[inline]
fn calculate_services_score(required: &[String], matched: usize) -> f64 {
    let wanted = distinct_count(required);
    if wanted == 0 {
        return 1.0;
    }
    (matched as f64 / wanted as f64).min(1.0)
}

/// Calculate location score (0-1)
/// Closer distance = higher score, exponentially decaying
#[inline]
fn calculate_location_score(distance_km: Option<f64>, radius_km: f64) -> f64 {
    let Some(distance_km) = distance_km else {
        return NEUTRAL;
    };
    if radius_km <= 0.0 || distance_km >= radius_km {
        return 0.0;
    }

    // score = e^(-distance / (radius / 2))
    (-distance_km / (radius_km * 0.5)).exp()
}

/// Calculate budget score (0-1) from the client budget to architect fee ratio
#[inline]
fn calculate_budget_score(budget_max: f64, min_project_fee: Option<f64>) -> f64 {
    let fee = match min_project_fee {
        Some(fee) if fee > 0.0 => fee,
        _ => return NEUTRAL,
    };
    if budget_max <= 0.0 {
        return 0.0;
    }

    let ratio = budget_max / fee;
    if ratio >= 1.0 {
        1.0
    } else if ratio >= 0.75 {
        0.6
    } else if ratio >= 0.5 {
        0.3
    } else {
        0.0
    }
}

/// Calculate timeline score (0-1)
/// Full score if the architect is free in time, decaying linearly over the horizon
#[inline]
fn calculate_timeline_score(available_in_weeks: u16, start_within_weeks: u16, horizon_weeks: f64) -> f64 {
    let gap = available_in_weeks as f64 - start_within_weeks as f64;
    if gap <= 0.0 {
        return 1.0;
    }
    if horizon_weeks <= 0.0 {
        return 0.0;
    }
    (1.0 - gap / horizon_weeks).max(0.0)
}

/// Share of preferred styles the architect works in (0-1)
#[inline]
fn calculate_style_score(preferred: &[String], matched: usize) -> f64 {
    let wanted = distinct_count(preferred);
    if wanted == 0 {
        return NEUTRAL;
    }
    (matched as f64 / wanted as f64).min(1.0)
}

fn distinct_count(tags: &[String]) -> usize {
    if !has_tags(tags) {
        return 0;
    }
    let mut seen: Vec<String> = tags
        .iter()
        .map(|t| normalize_tag(t))
        .filter(|t| !t.is_empty())
        .collect();
    seen.sort();
    seen.dedup();
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_architect() -> ArchitectProfile {
        ArchitectProfile {
            architect_id: "arch".to_string(),
            name: "Test Architect".to_string(),
            services: vec!["residential".to_string(), "renovation".to_string()],
            styles: vec!["modern".to_string(), "minimalist".to_string()],
            location: Some(GeoPoint::new(52.52, 13.405)),
            service_radius_km: None,
            min_project_fee: Some(20_000.0),
            available_in_weeks: 0,
            is_active: true,
            is_verified: true,
            bio: None,
            updated_at: None,
        }
    }

    fn create_need_sheet() -> NeedSheet {
        NeedSheet {
            id: Uuid::new_v4(),
            client_id: "client".to_string(),
            title: "Attic".to_string(),
            description: None,
            required_services: vec!["residential".to_string(), "renovation".to_string()],
            preferred_styles: vec!["modern".to_string(), "minimalist".to_string()],
            location: Some(GeoPoint::new(52.52, 13.405)),
            max_distance_km: Some(50.0),
            budget_min: None,
            budget_max: 30_000.0,
            start_within_weeks: 4,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_perfect_candidate_scores_near_100() {
        let result = calculate_match_score(
            &create_architect(),
            &create_need_sheet(),
            &ScoringWeights::default(),
            &MatchingParams::default(),
        );
        assert!(result.score > 99.0, "got {}", result.score);
        assert_eq!(result.matched_services.len(), 2);
        assert_eq!(result.matched_styles.len(), 2);
    }

    #[test]
    fn test_score_is_bounded() {
        let mut architect = create_architect();
        architect.services.clear();
        architect.styles.clear();
        architect.min_project_fee = Some(1_000_000.0);
        architect.available_in_weeks = 100;
        architect.location = Some(GeoPoint::new(48.1351, 11.5820));

        let result = calculate_match_score(
            &architect,
            &create_need_sheet(),
            &ScoringWeights::default(),
            &MatchingParams::default(),
        );
        assert!(result.score >= 0.0 && result.score <= 100.0);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_services_score() {
        let required = vec!["a".to_string(), "b".to_string(), "A".to_string()];
        assert_eq!(calculate_services_score(&required, 1), 0.5);
        assert_eq!(calculate_services_score(&[], 0), 1.0);
    }

    #[test]
    fn test_location_score() {
        assert!(calculate_location_score(Some(1.0), 50.0) > 0.9);
        assert_eq!(calculate_location_score(Some(50.0), 50.0), 0.0);
        let half = calculate_location_score(Some(25.0), 50.0);
        assert!(half > 0.3 && half < 0.8);
        assert_eq!(calculate_location_score(None, 50.0), NEUTRAL);
    }

    #[test]
    fn test_budget_buckets() {
        assert_eq!(calculate_budget_score(20_000.0, Some(20_000.0)), 1.0);
        assert_eq!(calculate_budget_score(16_000.0, Some(20_000.0)), 0.6);
        assert_eq!(calculate_budget_score(10_000.0, Some(20_000.0)), 0.3);
        assert_eq!(calculate_budget_score(9_999.0, Some(20_000.0)), 0.0);
        assert_eq!(calculate_budget_score(10_000.0, None), NEUTRAL);
        assert_eq!(calculate_budget_score(0.0, Some(20_000.0)), 0.0);
    }

    #[test]
    fn test_timeline_decay() {
        assert_eq!(calculate_timeline_score(2, 4, 12.0), 1.0);
        assert_eq!(calculate_timeline_score(10, 4, 12.0), 0.5);
        assert_eq!(calculate_timeline_score(40, 4, 12.0), 0.0);
    }

    #[test]
    fn test_style_without_preference_is_neutral() {
        assert_eq!(calculate_style_score(&[], 0), NEUTRAL);
        assert_eq!(calculate_style_score(&["modern".to_string()], 1), 1.0);
    }

    #[test]
    fn test_zero_weights_give_zero() {
        let weights = ScoringWeights { services: 0.0, location: 0.0, budget: 0.0, timeline: 0.0, style: 0.0 };
        let breakdown = ScoreBreakdown { services: 1.0, location: 1.0, budget: 1.0, timeline: 1.0, style: 1.0 };
        assert_eq!(weighted_score(&breakdown, &weights), 0.0);
    }

    #[test]
    fn test_weights_are_normalized() {
        let weights = ScoringWeights { services: 2.0, location: 0.0, budget: 0.0, timeline: 0.0, style: 2.0 };
        let breakdown = ScoreBreakdown { services: 1.0, location: 0.0, budget: 0.0, timeline: 0.0, style: 0.5 };
        assert!((weighted_score(&breakdown, &weights) - 75.0).abs() < 1e-9);
    }
}

use crate::models::{ArchitectProfile, NeedSheet};
use crate::core::distance::distance_between;

/// Normalize a service/style tag for comparison
#[inline]
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Tags from `wanted` that also appear in `offered`, in `wanted`'s spelling
///
/// Comparison ignores case and surrounding whitespace. Each wanted tag is
/// reported at most once.
pub fn tag_overlap(wanted: &[String], offered: &[String]) -> Vec<String> {
    let offered: Vec<String> = offered.iter().map(|t| normalize_tag(t)).collect();
    let mut seen: Vec<String> = Vec::new();
    let mut shared = Vec::new();

    for tag in wanted {
        let norm = normalize_tag(tag);
        if norm.is_empty() || seen.contains(&norm) {
            continue;
        }
        if offered.contains(&norm) {
            shared.push(tag.trim().to_string());
        }
        seen.push(norm);
    }

    shared
}

/// Check whether an architect may be proposed for a needsheet at all
///
/// This is the hard filter ahead of scoring.
pub fn is_eligible(
    architect: &ArchitectProfile,
    need_sheet: &NeedSheet,
    exclude_ids: &[String],
) -> bool {
    if !architect.is_active {
        return false;
    }

    // A client never matches their own architect account
    if architect.architect_id == need_sheet.client_id {
        return false;
    }

    if exclude_ids.contains(&architect.architect_id) {
        return false;
    }

    // Must cover at least one required service
    if has_tags(&need_sheet.required_services)
        && tag_overlap(&need_sheet.required_services, &architect.services).is_empty()
    {
        return false;
    }

    // Distance limits apply only when both parties have a location
    if let Some(distance_km) = distance_between(need_sheet.location.as_ref(), architect.location.as_ref()) {
        if need_sheet.max_distance_km.is_some_and(|max| distance_km > max) {
            return false;
        }
        if architect.service_radius_km.is_some_and(|radius| distance_km > radius) {
            return false;
        }
    }

    true
}

/// True if the list holds at least one non-blank tag
#[inline]
pub fn has_tags(tags: &[String]) -> bool {
    tags.iter().any(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use chrono::Utc;
    use uuid::Uuid;

    fn architect(id: &str, lat: f64, lon: f64) -> ArchitectProfile {
        ArchitectProfile {
            architect_id: id.to_string(),
            name: format!("Architect {}", id),
            services: vec!["Residential".to_string(), "renovation".to_string()],
            styles: vec!["modern".to_string()],
            location: Some(GeoPoint::new(lat, lon)),
            service_radius_km: Some(100.0),
            min_project_fee: Some(20_000.0),
            available_in_weeks: 2,
            is_active: true,
            is_verified: true,
            bio: None,
            updated_at: None,
        }
    }

    fn need_sheet() -> NeedSheet {
        NeedSheet {
            id: Uuid::new_v4(),
            client_id: "client-1".to_string(),
            title: "Family house".to_string(),
            description: None,
            required_services: vec!["residential".to_string()],
            preferred_styles: vec!["modern".to_string()],
            location: Some(GeoPoint::new(52.52, 13.405)),
            max_distance_km: Some(50.0),
            budget_min: None,
            budget_max: 40_000.0,
            start_within_weeks: 4,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_tag_overlap_is_case_insensitive() {
        let wanted = vec![" Residential ".to_string(), "interior".to_string(), "residential".to_string()];
        let offered = vec!["residential".to_string()];
        assert_eq!(tag_overlap(&wanted, &offered), vec!["Residential"]);
    }

    #[test]
    fn test_eligible_architect() {
        assert!(is_eligible(&architect("a1", 52.53, 13.41), &need_sheet(), &[]));
    }

    #[test]
    fn test_inactive_architect_filtered() {
        let mut a = architect("a1", 52.53, 13.41);
        a.is_active = false;
        assert!(!is_eligible(&a, &need_sheet(), &[]));
    }

    #[test]
    fn test_excluded_architect_filtered() {
        let a = architect("a1", 52.53, 13.41);
        assert!(!is_eligible(&a, &need_sheet(), &["a1".to_string()]));
    }

    #[test]
    fn test_client_own_account_filtered() {
        let a = architect("client-1", 52.53, 13.41);
        assert!(!is_eligible(&a, &need_sheet(), &[]));
    }

    #[test]
    fn test_missing_service_filtered() {
        let mut a = architect("a1", 52.53, 13.41);
        a.services = vec!["landscape".to_string()];
        assert!(!is_eligible(&a, &need_sheet(), &[]));
    }

    #[test]
    fn test_distance_limits() {
        // Hamburg is ~255km from Berlin
        let far = architect("a1", 53.5511, 9.9937);
        assert!(!is_eligible(&far, &need_sheet(), &[]));

        let mut sheet = need_sheet();
        sheet.max_distance_km = None;
        // Still outside the architect's own 100km radius
        assert!(!is_eligible(&far, &sheet, &[]));

        let mut wide = far.clone();
        wide.service_radius_km = None;
        assert!(is_eligible(&wide, &sheet, &[]));
    }

    #[test]
    fn test_unknown_location_not_filtered() {
        let mut a = architect("a1", 0.0, 0.0);
        a.location = None;
        assert!(is_eligible(&a, &need_sheet(), &[]));
    }
}

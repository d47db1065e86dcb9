use crate::models::{BoundingBox, GeoPoint};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude
const KM_PER_DEGREE: f64 = 111.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine distance between two optional points, `None` if either is unknown
#[inline]
pub fn distance_between(a: Option<&GeoPoint>, b: Option<&GeoPoint>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude)),
        _ => None,
    }
}

/// Calculate a bounding box around a center point
///
/// Used as a cheap SQL pre-filter before the exact Haversine check.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
pub fn calculate_bounding_box(center: &GeoPoint, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE;

    // Near the poles cos() tends to zero; span the whole longitude range instead
    let cos_lat = center.latitude.to_radians().cos().abs();
    let lon_delta = if cos_lat < 1e-6 {
        180.0
    } else {
        (radius_km / (KM_PER_DEGREE * cos_lat)).min(180.0)
    };

    BoundingBox {
        min_lat: center.latitude - lat_delta,
        max_lat: center.latitude + lat_delta,
        min_lon: center.longitude - lon_delta,
        max_lon: center.longitude + lon_delta,
    }
}

/// Longitude intervals covered by a bounding box, within [-180, 180]
///
/// A box crossing the antimeridian is split in two.
pub fn longitude_ranges(bbox: &BoundingBox) -> Vec<(f64, f64)> {
    if bbox.max_lon - bbox.min_lon >= 360.0 {
        vec![(-180.0, 180.0)]
    } else if bbox.min_lon < -180.0 {
        vec![(bbox.min_lon + 360.0, 180.0), (-180.0, bbox.max_lon)]
    } else if bbox.max_lon > 180.0 {
        vec![(bbox.min_lon, 180.0), (-180.0, bbox.max_lon - 360.0)]
    } else {
        vec![(bbox.min_lon, bbox.max_lon)]
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(point: &GeoPoint, bbox: &BoundingBox) -> bool {
    point.latitude >= bbox.min_lat
        && point.latitude <= bbox.max_lat
        && longitude_ranges(bbox)
            .iter()
            .any(|&(min, max)| point.longitude >= min && point.longitude <= max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // London to Paris is roughly 344 km
        let distance = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_distance_between_missing_point() {
        let berlin = GeoPoint::new(52.52, 13.405);
        assert!(distance_between(Some(&berlin), None).is_none());
        assert!(distance_between(None, Some(&berlin)).is_none());
        assert!(distance_between(Some(&berlin), Some(&berlin)).unwrap() < 0.01);
    }

    #[test]
    fn test_bounding_box() {
        let center = GeoPoint::new(40.7128, -74.0060);
        let bbox = calculate_bounding_box(&center, 10.0);

        assert!(bbox.min_lat < center.latitude);
        assert!(bbox.max_lat > center.latitude);
        assert!(bbox.min_lon < center.longitude);
        assert!(bbox.max_lon > center.longitude);

        // 20km / 111km per degree = ~0.18 degrees
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }

    #[test]
    fn test_bounding_box_at_pole() {
        let bbox = calculate_bounding_box(&GeoPoint::new(90.0, 0.0), 10.0);
        assert!(bbox.min_lon <= -180.0 && bbox.max_lon >= 180.0);
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = calculate_bounding_box(&GeoPoint::new(40.7128, -74.0060), 10.0);

        assert!(is_within_bounding_box(&GeoPoint::new(40.7128, -74.0060), &bbox));
        assert!(is_within_bounding_box(&GeoPoint::new(40.71, -74.0), &bbox));
        assert!(!is_within_bounding_box(&GeoPoint::new(50.0, -80.0), &bbox));
    }

    #[test]
    fn test_bounding_box_across_antimeridian() {
        // Suva, Fiji sits close to the 180th meridian
        let suva = GeoPoint::new(-18.14, 178.44);
        let bbox = calculate_bounding_box(&suva, 300.0);
        assert!(bbox.max_lon > 180.0);

        let ranges = longitude_ranges(&bbox);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].1, 180.0);
        assert_eq!(ranges[1].0, -180.0);

        // ~165km east of Suva, on the other side of the antimeridian
        let across = GeoPoint::new(-18.14, -179.99);
        assert!(haversine_distance(suva.latitude, suva.longitude, across.latitude, across.longitude) < 300.0);
        assert!(is_within_bounding_box(&across, &bbox));
        assert!(!is_within_bounding_box(&GeoPoint::new(-18.14, 170.0), &bbox));
    }

    #[test]
    fn test_longitude_ranges_without_wrap() {
        let bbox = calculate_bounding_box(&GeoPoint::new(40.7128, -74.0060), 10.0);
        assert_eq!(longitude_ranges(&bbox), vec![(bbox.min_lon, bbox.max_lon)]);

        let west = calculate_bounding_box(&GeoPoint::new(51.0, -179.5), 100.0);
        let ranges = longitude_ranges(&west);
        assert_eq!(ranges.len(), 2);
        assert!(ranges[0].0 > 170.0 && ranges[0].1 == 180.0);
    }
}

//! Reverse geocoding: coordinates → human-readable address.

use async_trait::async_trait;

use crate::errors::AppError;

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, lat: f64, lng: f64) -> Result<String, AppError>;
}

const EARTH_RADIUS_KM: f64 = 6371.0;
const MATCH_RADIUS_KM: f64 = 50.0;

/// Offline geocoder over a fixed list of places. Resolves to the nearest place
/// within `MATCH_RADIUS_KM`, otherwise fails.
pub struct GazetteerGeocoder {
    places: Vec<(&'static str, f64, f64)>,
}

impl Default for GazetteerGeocoder {
    fn default() -> Self {
        Self {
            places: vec![
                ("Delhi, India", 28.6139, 77.2090),
                ("Bangalore, India", 12.9716, 77.5946),
                ("Mumbai, India", 19.0760, 72.8777),
                ("Lucknow, India", 26.8467, 80.9462),
                ("Kolkata, India", 22.5726, 88.3639),
                ("Chennai, India", 13.0827, 80.2707),
                ("Hyderabad, India", 17.3850, 78.4867),
                ("Nagpur, India", 21.1458, 79.0882),
            ],
        }
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[async_trait]
impl Geocoder for GazetteerGeocoder {
    async fn reverse(&self, lat: f64, lng: f64) -> Result<String, AppError> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::Validation(format!(
                "Coordinates out of range: {lat}, {lng}"
            )));
        }

        self.places
            .iter()
            .map(|(name, plat, plng)| (*name, haversine_km(lat, lng, *plat, *plng)))
            .filter(|(_, km)| *km <= MATCH_RADIUS_KM)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| AppError::Geocoding(format!("no known place near {lat:.4}, {lng:.4}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_delhi_mumbai() {
        let km = haversine_km(28.6139, 77.2090, 19.0760, 72.8777);
        assert!((km - 1148.0).abs() < 10.0, "Distance was {km}");
    }

    #[tokio::test]
    async fn test_resolves_nearby_coordinates() {
        let geocoder = GazetteerGeocoder::default();
        let address = geocoder.reverse(28.62, 77.21).await.unwrap();
        assert_eq!(address, "Delhi, India");
    }

    #[tokio::test]
    async fn test_far_from_everything_fails() {
        let geocoder = GazetteerGeocoder::default();
        assert!(matches!(
            geocoder.reverse(0.0, 0.0).await,
            Err(AppError::Geocoding(_))
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_is_validation_error() {
        let geocoder = GazetteerGeocoder::default();
        assert!(matches!(
            geocoder.reverse(120.0, 0.0).await,
            Err(AppError::Validation(_))
        ));
    }
}

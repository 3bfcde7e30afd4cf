//! Distance and report-confidence helpers.

const EARTH_RADIUS_KM: f64 = 6371.0;
const RECENCY_WINDOW_HOURS: f64 = 168.0;
const VERIFICATIONS_FOR_FULL_SCORE: f64 = 3.0;
const NEARBY_KM: f64 = 2.0;
const DISTANCE_FALLOFF_KM: f64 = 20.0;

/// Great-circle distance between two coordinates in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Weighted 0-100 score for a stock report. `reporter_reputation` is expected
/// in `0.0..=1.0`.
pub fn confidence_score(
    recency_hours: f64,
    verification_count: u32,
    reporter_reputation: f64,
    distance_km: f64,
) -> u8 {
    let recency = (1.0 - recency_hours / RECENCY_WINDOW_HOURS).max(0.0);
    let verification = (f64::from(verification_count) / VERIFICATIONS_FOR_FULL_SCORE).min(1.0);
    let distance = if distance_km < NEARBY_KM {
        1.0
    } else {
        (1.0 - (distance_km - NEARBY_KM) / DISTANCE_FALLOFF_KM).max(0.0)
    };

    let weighted =
        recency * 0.4 + verification * 0.3 + reporter_reputation * 0.2 + distance * 0.1;
    (weighted * 100.0).round().clamp(0.0, 100.0) as u8
}

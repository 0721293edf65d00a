//! Great-circle distances for "near me" lookups.

use fuel_map_station_models::{GeoPoint, Station};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometers.
#[must_use]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// The station closest to `origin`, with its distance in kilometers.
///
/// Ties keep the earlier station.
pub fn nearest<'a>(
    origin: GeoPoint,
    stations: impl IntoIterator<Item = &'a Station>,
) -> Option<(&'a Station, f64)> {
    stations
        .into_iter()
        .map(|station| (station, distance_km(origin, station.location)))
        .fold(None, |best, candidate| match best {
            Some((_, best_km)) if best_km <= candidate.1 => best,
            _ => Some(candidate),
        })
}

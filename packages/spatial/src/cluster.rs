//! Greedy zoom-indexed clustering of station markers.

use fuel_map_station_models::{GeoPoint, Station, StationId};
use serde::{Deserialize, Serialize};

use crate::pin::{self, AvailabilityBand};
use crate::projection::{BoundingBox, DisplayPoint};
use crate::threshold::{ThresholdPolicy, ZoomLevel};

/// A group of two or more nearby stations rendered as a single pin.
///
/// Derived per render pass and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Identifier derived from the centroid, `cluster-{lat}-{lon}`.
    pub id: String,
    /// Member stations in discovery order.
    pub stations: Vec<Station>,
    /// Arithmetic mean of the members' geographic coordinates.
    pub center: GeoPoint,
    /// Share of members with status `Available`, in `[0, 100]`.
    pub availability_percentage: f64,
}

impl Cluster {
    /// Builds a cluster from its members.
    ///
    /// # Panics
    ///
    /// In debug builds, if fewer than two stations are given. A lone
    /// station is a [`MapMarker::Station`], never a cluster.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_members(stations: Vec<Station>) -> Self {
        debug_assert!(
            stations.len() >= 2,
            "a cluster needs at least two stations, got {}",
            stations.len()
        );
        let count = stations.len() as f64;
        let (lat_sum, lon_sum) = stations.iter().fold((0.0, 0.0), |(lat, lon), station| {
            (lat + station.location.lat, lon + station.location.lon)
        });
        let center = GeoPoint::new(lat_sum / count, lon_sum / count);
        let available = stations.iter().filter(|s| s.is_available()).count() as f64;

        Self {
            id: format!("cluster-{}-{}", center.lat, center.lon),
            stations,
            center,
            availability_percentage: available / count * 100.0,
        }
    }

    /// Number of member stations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the cluster has no members. Never true for clusters built
    /// by [`cluster_stations`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Availability colour band.
    #[must_use]
    pub fn band(&self) -> AvailabilityBand {
        AvailabilityBand::from_percentage(self.availability_percentage)
    }

    /// Pin diameter in display units.
    #[must_use]
    pub fn pin_diameter(&self) -> f64 {
        pin::pin_diameter(self.len())
    }

    /// Size badge font size.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        pin::font_size(self.len())
    }
}

/// One pin on the rendered map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MapMarker {
    /// A single station shown on its own.
    Station(Station),
    /// Two or more stations grouped together.
    Cluster(Cluster),
}

impl MapMarker {
    /// Geographic position of the pin.
    #[must_use]
    pub const fn location(&self) -> GeoPoint {
        match self {
            Self::Station(station) => station.location,
            Self::Cluster(cluster) => cluster.center,
        }
    }

    /// Position of the pin in display space.
    #[must_use]
    pub fn display_point(&self, bbox: &BoundingBox) -> DisplayPoint {
        bbox.normalize(self.location())
    }

    /// Number of stations behind this pin.
    #[must_use]
    pub fn station_count(&self) -> usize {
        match self {
            Self::Station(_) => 1,
            Self::Cluster(cluster) => cluster.len(),
        }
    }

    /// IDs of the stations behind this pin, in discovery order.
    #[must_use]
    pub fn station_ids(&self) -> Vec<StationId> {
        match self {
            Self::Station(station) => vec![station.id],
            Self::Cluster(cluster) => cluster.stations.iter().map(|s| s.id).collect(),
        }
    }
}

/// Partitions `stations` into standalone pins and clusters for `zoom`.
///
/// Stations are visited in input order. Each unclaimed station seeds a
/// group and claims every later unclaimed station whose projected distance
/// to the seed is strictly below the zoom threshold. Claimed stations are
/// never reassigned, so the result is order-dependent. Groups of one are
/// emitted as plain stations. Output follows discovery order.
///
/// When the threshold is zero every station is returned unclustered.
#[must_use]
pub fn cluster_stations(
    stations: &[Station],
    zoom: ZoomLevel,
    policy: ThresholdPolicy,
    bbox: &BoundingBox,
) -> Vec<MapMarker> {
    let threshold = policy.threshold(zoom);

    if threshold <= 0.0 {
        log::trace!(
            "cluster_stations: zoom {zoom} disables clustering for {} stations",
            stations.len()
        );
        return stations.iter().cloned().map(MapMarker::Station).collect();
    }

    let points: Vec<DisplayPoint> = stations.iter().map(|s| bbox.normalize(s.location)).collect();
    let mut claimed = vec![false; stations.len()];
    let mut markers = Vec::new();

    for seed in 0..stations.len() {
        if claimed[seed] {
            continue;
        }
        claimed[seed] = true;

        let mut members = vec![seed];
        for other in (seed + 1)..stations.len() {
            if !claimed[other] && points[seed].distance(&points[other]) < threshold {
                claimed[other] = true;
                members.push(other);
            }
        }

        if members.len() == 1 {
            markers.push(MapMarker::Station(stations[seed].clone()));
        } else {
            let group = members.into_iter().map(|i| stations[i].clone()).collect();
            markers.push(MapMarker::Cluster(Cluster::from_members(group)));
        }
    }

    log::trace!(
        "cluster_stations: {} stations -> {} markers at zoom {zoom} (threshold {threshold:.3})",
        stations.len(),
        markers.len()
    );

    markers
}

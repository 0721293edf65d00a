#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the fuel map server.
//!
//! These types are serialized to JSON for the REST API. Domain types are
//! wrapped rather than extended so that display-only fields (projected
//! coordinates, directions links) never leak into the store.

use fuel_map_ai::TrendReport;
use fuel_map_spatial::{
    AvailabilityBand, BoundingBox, MapMarker, ThresholdPolicy, ZoomLevel,
};
use fuel_map_station_models::{FuelType, GeoPoint, QueueLength, Station, StationId};
use fuel_map_store::MapView;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// A station as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStation {
    #[serde(flatten)]
    pub station: Station,
    /// Google Maps directions link.
    pub directions_url: String,
    /// French status label.
    pub status_label: String,
}

impl From<&Station> for ApiStation {
    fn from(station: &Station) -> Self {
        Self {
            directions_url: station.directions_url(),
            status_label: station.status.label().to_string(),
            station: station.clone(),
        }
    }
}

/// Query parameters for the map endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQueryParams {
    /// Zoom level (clamped into 1..=5). Defaults to 3.
    pub zoom: Option<u8>,
    /// Name/address search.
    pub search: Option<String>,
    /// Only stations currently selling fuel.
    pub available: Option<bool>,
    /// Only stations with this queue length.
    pub queue: Option<QueueLength>,
    /// Station whose popup is open.
    pub selected: Option<StationId>,
}

impl From<&MapQueryParams> for MapView {
    fn from(params: &MapQueryParams) -> Self {
        Self {
            zoom: params.zoom.map_or(ZoomLevel::INITIAL, ZoomLevel::new),
            search: params.search.clone().unwrap_or_default(),
            available_only: params.available.unwrap_or(false),
            queue: params.queue,
            selected: params.selected,
        }
    }
}

/// A map pin with its display-space placement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMarker {
    #[serde(flatten)]
    pub marker: MapMarker,
    /// Horizontal position in `[0, 100]` for in-box points.
    pub x: f64,
    /// Vertical position in `[0, 100]` for in-box points.
    pub y: f64,
    /// Stations behind the pin.
    pub station_count: usize,
    /// Pin diameter in pixels (clusters only).
    pub pin_diameter: Option<f64>,
    /// Count label font size in pixels (clusters only).
    pub font_size: Option<f64>,
    /// Availability band (clusters only).
    pub band: Option<AvailabilityBand>,
}

impl ApiMarker {
    /// Places `marker` on the display plane of `bbox`.
    #[must_use]
    pub fn new(marker: MapMarker, bbox: &BoundingBox) -> Self {
        let point = marker.display_point(bbox);
        let (pin_diameter, font_size, band) = match &marker {
            MapMarker::Station(_) => (None, None, None),
            MapMarker::Cluster(cluster) => (
                Some(cluster.pin_diameter()),
                Some(cluster.font_size()),
                Some(cluster.band()),
            ),
        };
        Self {
            x: point.x,
            y: point.y,
            station_count: marker.station_count(),
            pin_diameter,
            font_size,
            band,
            marker,
        }
    }
}

/// Response from the map endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    /// Effective (clamped) zoom level.
    pub zoom: ZoomLevel,
    /// Policy used to derive the clustering radius.
    pub policy: ThresholdPolicy,
    /// Clustering radius in display units at this zoom.
    pub threshold: f64,
    /// Number of stations passing the filters.
    pub visible_count: usize,
    /// Pins to draw, in discovery order.
    pub markers: Vec<ApiMarker>,
    /// The selected station, or `None` if it was filtered out.
    pub selected: Option<ApiStation>,
}

/// Body of the nearby endpoint. Both coordinates must be present for the
/// fix to be usable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl NearbyRequest {
    /// The geolocation fix, if complete.
    #[must_use]
    pub fn origin(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.lat?, self.lon?))
    }
}

/// Response from the nearby endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyResponse {
    pub station: ApiStation,
    /// Great-circle distance from the fix.
    pub distance_km: f64,
}

/// Owner fuel toggle.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelToggleRequest {
    pub fuel: FuelType,
    pub available: bool,
}

/// Owner queue update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRequest {
    pub queue: QueueLength,
}

/// Admin login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub password: String,
}

/// Result of a state-changing request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAck {
    /// Confirmation message shown to the user.
    pub message: Option<String>,
    /// The affected station, when there is one.
    pub station: Option<ApiStation>,
}

/// Response from the analysis endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// Text as returned by the model, or the fallback apology.
    pub text: String,
    /// Sections recognised in `text`.
    pub report: TrendReport,
    /// Whether any section was recognised. Clients render `text` as is
    /// when this is false.
    pub structured: bool,
}

impl From<String> for AnalysisResponse {
    fn from(text: String) -> Self {
        let report = TrendReport::parse(&text);
        Self {
            structured: report.has_sections(),
            report,
            text,
        }
    }
}

//! Zoom, filter, and selection state of the map screen.
//!
//! Filters are ANDed together before clustering. Any filter change drops a
//! selection that no longer matches, so the map never points at a hidden
//! station. Zooming leaves filters alone.

use fuel_map_spatial::{BoundingBox, MapMarker, ThresholdPolicy, ZoomLevel, cluster_stations};
use fuel_map_station_models::{QueueLength, Station, StationId};
use serde::{Deserialize, Serialize};

/// Map screen state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub zoom: ZoomLevel,
    /// Case-insensitive name/address search.
    pub search: String,
    /// Only show stations currently selling fuel.
    pub available_only: bool,
    /// Only show stations with this queue length.
    pub queue: Option<QueueLength>,
    /// Station whose popup is open.
    pub selected: Option<StationId>,
}

/// User interactions on the map screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum MapAction {
    ZoomIn,
    ZoomOut,
    SetZoom(ZoomLevel),
    SetSearch(String),
    SetAvailableOnly(bool),
    SetQueue(Option<QueueLength>),
    /// A cluster pin was clicked: zoom in one level, no panning.
    ClickCluster,
    Select(Option<StationId>),
}

impl MapView {
    /// Whether `station` passes every active filter.
    #[must_use]
    pub fn matches(&self, station: &Station) -> bool {
        station.matches_search(&self.search)
            && (!self.available_only || station.is_available())
            && self.queue.is_none_or(|queue| station.queue == queue)
    }

    /// Stations passing every filter, in input order.
    #[must_use]
    pub fn filtered(&self, stations: &[Station]) -> Vec<Station> {
        stations
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }

    /// Markers to draw for `stations` at the current zoom.
    #[must_use]
    pub fn markers(
        &self,
        stations: &[Station],
        policy: ThresholdPolicy,
        bbox: &BoundingBox,
    ) -> Vec<MapMarker> {
        cluster_stations(&self.filtered(stations), self.zoom, policy, bbox)
    }

    /// The selected station, if it is still visible.
    #[must_use]
    pub fn selected_station<'a>(&self, stations: &'a [Station]) -> Option<&'a Station> {
        let id = self.selected?;
        stations.iter().find(|s| s.id == id && self.matches(s))
    }

    /// Applies `action`, then drops the selection if it is filtered out.
    pub fn apply(&mut self, action: MapAction, stations: &[Station]) {
        match action {
            MapAction::ZoomIn | MapAction::ClickCluster => self.zoom = self.zoom.zoomed_in(),
            MapAction::ZoomOut => self.zoom = self.zoom.zoomed_out(),
            MapAction::SetZoom(zoom) => self.zoom = zoom,
            MapAction::SetSearch(search) => self.search = search,
            MapAction::SetAvailableOnly(available_only) => self.available_only = available_only,
            MapAction::SetQueue(queue) => self.queue = queue,
            MapAction::Select(selected) => self.selected = selected,
        }
        self.reconcile(stations);
    }

    /// Clears the selection when it no longer names a visible station.
    pub fn reconcile(&mut self, stations: &[Station]) {
        if self.selected.is_some() && self.selected_station(stations).is_none() {
            log::debug!("Deselecting station {:?}: filtered out", self.selected);
            self.selected = None;
        }
    }

    /// Resets zoom and filters, keeping the selection. Used when the map
    /// screen is opened afresh.
    pub fn reset_filters(&mut self) {
        *self = Self {
            selected: self.selected,
            ..Self::default()
        };
    }
}

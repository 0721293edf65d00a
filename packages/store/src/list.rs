//! Station list screen filters.

use fuel_map_station_models::{FuelType, QueueLength, Station, StationStatus};
use serde::{Deserialize, Serialize};

/// Filters of the full station list. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StationListFilter {
    pub search: String,
    pub commune_id: Option<u32>,
    pub status: Option<StationStatus>,
    pub fuel: Option<FuelType>,
    pub queue: Option<QueueLength>,
    pub verified_only: bool,
}

impl StationListFilter {
    /// Whether `station` passes every filter.
    #[must_use]
    pub fn matches(&self, station: &Station) -> bool {
        station.matches_search(&self.search)
            && self.commune_id.is_none_or(|id| station.commune_id == id)
            && self.status.is_none_or(|status| station.status == status)
            && self
                .fuel
                .is_none_or(|fuel| station.fuel_availability.is_available(fuel))
            && self.queue.is_none_or(|queue| station.queue == queue)
            && (!self.verified_only || station.verified == Some(true))
    }

    /// Stations passing every filter, in input order.
    #[must_use]
    pub fn apply<'a>(&self, stations: &'a [Station]) -> Vec<&'a Station> {
        stations.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Stations sorted by name for report form pickers.
#[must_use]
pub fn station_picker(stations: &[Station]) -> Vec<&Station> {
    let mut sorted: Vec<&Station> = stations.iter().collect();
    sorted.sort_by_key(|s| s.name.to_lowercase());
    sorted
}

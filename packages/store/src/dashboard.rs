//! Dashboard aggregates: global availability, per-commune stats, and the
//! last day of incidents.

use chrono::{DateTime, Duration, Utc};
use fuel_map_spatial::AvailabilityBand;
use fuel_map_station_models::{
    Commune, IncidentReport, IncidentType, ReportId, Station, StationId, UNKNOWN_STATION_LABEL,
};
use serde::{Deserialize, Serialize};

/// Availability of one commune.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuneStat {
    pub commune_id: u32,
    pub name: String,
    pub available_count: usize,
    pub total_count: usize,
    /// 0 when the commune has no stations.
    pub percentage: f64,
    pub band: AvailabilityBand,
    pub band_label: String,
}

/// An incident as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentIncident {
    pub id: ReportId,
    pub station_id: StationId,
    /// Station name, or "Station Inconnue" when it cannot be found.
    pub station_name: String,
    pub incident_type: IncidentType,
    pub incident_label: String,
    pub description: String,
    pub reported_at: DateTime<Utc>,
    pub time_ago: String,
}

/// Everything the dashboard screen shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_stations: usize,
    pub available_stations: usize,
    pub availability_percentage: f64,
    pub band: AvailabilityBand,
    /// Best availability first.
    pub communes: Vec<CommuneStat>,
    /// Newest first, last 24 hours only.
    pub recent_incidents: Vec<RecentIncident>,
}

#[allow(clippy::cast_precision_loss)]
fn percentage(available: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        available as f64 / total as f64 * 100.0
    }
}

impl DashboardSummary {
    /// Aggregates `stations` (the public set) and `incidents` as of `now`.
    #[must_use]
    pub fn compute(
        stations: &[Station],
        communes: &[Commune],
        incidents: &[IncidentReport],
        now: DateTime<Utc>,
    ) -> Self {
        let total_stations = stations.len();
        let available_stations = stations.iter().filter(|s| s.is_available()).count();
        let availability_percentage = percentage(available_stations, total_stations);

        let mut commune_stats: Vec<CommuneStat> = communes
            .iter()
            .map(|commune| {
                let (available_count, total_count) = stations
                    .iter()
                    .filter(|s| s.commune_id == commune.id)
                    .fold((0, 0), |(available, total), s| {
                        (available + usize::from(s.is_available()), total + 1)
                    });
                let percentage = percentage(available_count, total_count);
                let band = AvailabilityBand::from_percentage(percentage);
                CommuneStat {
                    commune_id: commune.id,
                    name: commune.name.clone(),
                    available_count,
                    total_count,
                    percentage,
                    band,
                    band_label: band.label().to_string(),
                }
            })
            .collect();
        // Stable, so ties keep commune order.
        commune_stats.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));

        let mut recent_incidents: Vec<RecentIncident> = incidents
            .iter()
            .filter(|r| now - r.reported_at < Duration::hours(24))
            .map(|r| RecentIncident {
                id: r.id,
                station_id: r.station_id,
                station_name: stations
                    .iter()
                    .find(|s| s.id == r.station_id)
                    .map_or_else(|| UNKNOWN_STATION_LABEL.to_string(), |s| s.name.clone()),
                incident_type: r.incident_type,
                incident_label: r.incident_type.label().to_string(),
                description: r.description.clone(),
                reported_at: r.reported_at,
                time_ago: time_ago(r.reported_at, now),
            })
            .collect();
        recent_incidents.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));

        Self {
            total_stations,
            available_stations,
            availability_percentage,
            band: AvailabilityBand::from_percentage(availability_percentage),
            communes: commune_stats,
            recent_incidents,
        }
    }
}

/// French relative time label ("Il y a 5 min").
#[must_use]
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "À l'instant".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("Il y a {minutes} min");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("Il y a {hours} h");
    }
    format!("Il y a {} j", hours / 24)
}

//! Plain-text renderings for the terminal.

use fuel_map_ai::TrendReport;
use fuel_map_spatial::{BoundingBox, MapMarker};
use fuel_map_store::DashboardSummary;

/// One line per map pin, in discovery order.
pub fn markers(markers: &[MapMarker], bbox: &BoundingBox) -> String {
    let mut lines = vec![format!(
        "{:<8} {:>5} {:>6} {:>6}  DETAILS",
        "KIND", "COUNT", "X", "Y"
    )];
    lines.push("-".repeat(72));

    for marker in markers {
        let point = marker.display_point(bbox);
        let (kind, details) = match marker {
            MapMarker::Station(station) => (
                "station",
                format!("{} ({})", station.name, station.status.label()),
            ),
            MapMarker::Cluster(cluster) => (
                "cluster",
                format!(
                    "{:.0}% disponibles, {}",
                    cluster.availability_percentage,
                    cluster.band().label()
                ),
            ),
        };
        lines.push(format!(
            "{kind:<8} {:>5} {:>6.1} {:>6.1}  {details}",
            marker.station_count(),
            point.x,
            point.y
        ));
    }

    let total: usize = markers.iter().map(MapMarker::station_count).sum();
    lines.push(format!("\n{} pin(s), {total} station(s)", markers.len()));
    lines.join("\n")
}

/// Global availability, per-commune breakdown, and the last day of
/// incidents.
pub fn dashboard(summary: &DashboardSummary) -> String {
    let mut lines = vec![
        format!(
            "Disponibilité globale: {:.0}% ({}/{} stations), {}",
            summary.availability_percentage,
            summary.available_stations,
            summary.total_stations,
            summary.band.label()
        ),
        String::new(),
        "Communes:".to_string(),
    ];

    for commune in &summary.communes {
        lines.push(format!(
            "  {:<16} {:>2}/{:<2} {:>4.0}%  {}",
            commune.name,
            commune.available_count,
            commune.total_count,
            commune.percentage,
            commune.band_label
        ));
    }

    lines.push(String::new());
    if summary.recent_incidents.is_empty() {
        lines.push("Aucun incident signalé ces dernières 24h.".to_string());
    } else {
        lines.push("Incidents (24h):".to_string());
        for incident in &summary.recent_incidents {
            lines.push(format!(
                "  {:<14} {}: {}",
                incident.time_ago, incident.station_name, incident.incident_label
            ));
            if !incident.description.is_empty() {
                lines.push(format!("                 {}", incident.description));
            }
        }
    }

    lines.join("\n")
}

/// The parsed sections of a trend report, or the raw text when the model
/// ignored the expected layout.
pub fn report(report: &TrendReport) -> String {
    if !report.has_sections() {
        return report.raw.clone();
    }

    let mut lines = Vec::new();
    let mut paragraph = |title: &str, body: Option<&String>| {
        if let Some(body) = body {
            lines.push(format!("{title}\n  {body}\n"));
        }
    };
    paragraph("Résumé Global", report.summary.as_ref());
    paragraph("Tendance Générale", report.trend.as_ref());

    for (title, items) in [
        ("Zones à Privilégier", &report.best_zones),
        ("Zones sous Tension", &report.strained_zones),
        ("Conseils", &report.advice),
        ("Prédictions (24h)", &report.predictions),
    ] {
        if items.is_empty() {
            continue;
        }
        lines.push(title.to_string());
        lines.extend(items.iter().map(|item| format!("  * {item}")));
        lines.push(String::new());
    }

    lines.join("\n").trim_end().to_string()
}

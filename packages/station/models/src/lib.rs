#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Station, commune, and citizen report types for the fuel map.
//!
//! These are the canonical domain types shared by the spatial projector,
//! the in-memory store, the AI summarizer, and the API server. User-facing
//! labels are French, matching what citizens in Bamako see.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Unique station identifier.
pub type StationId = u64;

/// Unique report identifier.
pub type ReportId = u64;

/// Label rendered in place of a station that can no longer be found.
pub const UNKNOWN_STATION_LABEL: &str = "Station Inconnue";

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude (north positive).
    pub lat: f64,
    /// Longitude (east positive).
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both coordinates are finite numbers.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A commune (administrative district) of the Bamako metro area.
///
/// Static reference data, never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commune {
    /// Commune ID.
    pub id: u32,
    /// Display name (e.g. "Commune IV").
    pub name: String,
}

/// Fuel types sold at stations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum FuelType {
    /// Petrol
    Gasoline,
    /// Diesel
    Diesel,
    /// Kerosene
    Kerosene,
}

impl FuelType {
    /// French label shown to citizens.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gasoline => "Essence",
            Self::Diesel => "Gasoil",
            Self::Kerosene => "Pétrole",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Gasoline, Self::Diesel, Self::Kerosene]
    }
}

/// Observed queue length at a station.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum QueueLength {
    /// Nobody waiting
    None,
    /// A handful of vehicles
    Short,
    /// Noticeable wait
    Medium,
    /// Long wait
    Long,
}

impl QueueLength {
    /// French label shown to citizens.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "Aucune",
            Self::Short => "Courte",
            Self::Medium => "Moyenne",
            Self::Long => "Longue",
        }
    }

    /// Rough head count used when an owner reports a queue length without
    /// an explicit size.
    #[must_use]
    pub const fn estimated_size(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Short => 10,
            Self::Medium => 40,
            Self::Long => 75,
        }
    }
}

/// Operational status of a station.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum StationStatus {
    /// Fuel is being sold
    Available,
    /// Out of stock
    Unavailable,
    /// Station closed
    Closed,
    /// Newly submitted, waiting for moderation
    PendingValidation,
}

impl StationStatus {
    /// French label shown to citizens.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Disponible",
            Self::Unavailable => "Rupture de stock",
            Self::Closed => "Fermée",
            Self::PendingValidation => "En attente de Validation",
        }
    }
}

/// Per-fuel availability flags. Fuels absent from the map are unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelAvailability(BTreeMap<FuelType, bool>);

impl FuelAvailability {
    /// Builds availability with the given fuels marked available.
    #[must_use]
    pub fn with_available(fuels: &[FuelType]) -> Self {
        Self(fuels.iter().map(|fuel| (*fuel, true)).collect())
    }

    /// Whether `fuel` is available.
    #[must_use]
    pub fn is_available(&self, fuel: FuelType) -> bool {
        self.0.get(&fuel).copied().unwrap_or(false)
    }

    /// Sets the flag for one fuel.
    pub fn set(&mut self, fuel: FuelType, available: bool) {
        self.0.insert(fuel, available);
    }

    /// Whether at least one fuel is available.
    #[must_use]
    pub fn any_available(&self) -> bool {
        self.0.values().any(|available| *available)
    }

    /// Available fuels in canonical order.
    pub fn available(&self) -> impl Iterator<Item = FuelType> + '_ {
        self.0
            .iter()
            .filter(|(_, available)| **available)
            .map(|(fuel, _)| *fuel)
    }
}

/// A fuel station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Unique station ID.
    pub id: StationId,
    /// Station name (brand + neighbourhood).
    pub name: String,
    /// Street address or landmark.
    pub address: String,
    /// Commune the station belongs to.
    pub commune_id: u32,
    /// Denormalized commune name.
    pub commune_name: String,
    /// Geographic location.
    pub location: GeoPoint,
    /// Current status.
    pub status: StationStatus,
    /// Which fuels are on sale.
    pub fuel_availability: FuelAvailability,
    /// Observed queue length.
    pub queue: QueueLength,
    /// Estimated number of people waiting.
    pub queue_size: Option<u32>,
    /// When the status was last updated.
    pub last_update: DateTime<Utc>,
    /// Whether the station has been verified by moderators.
    pub verified: Option<bool>,
    /// Photo of the station.
    pub image_url: Option<String>,
}

impl Station {
    /// Whether the station is currently selling fuel.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == StationStatus::Available
    }

    /// Whether the station belongs in the public (verified) set.
    ///
    /// Stations explicitly marked unverified, or still pending validation,
    /// are only visible to moderators and in the full station list.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.verified != Some(false) && self.status != StationStatus::PendingValidation
    }

    /// Case-insensitive match of `term` against name or address.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.address.to_lowercase().contains(&term)
    }

    /// Google Maps directions link to this station.
    #[must_use]
    pub fn directions_url(&self) -> String {
        format!(
            "https://www.google.com/maps/dir/?api=1&destination={},{}",
            self.location.lat, self.location.lon
        )
    }

    /// Merges a partial update into this station and stamps `now`.
    pub fn merge(&mut self, update: &StationUpdate, now: DateTime<Utc>) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(fuels) = &update.fuel_availability {
            self.fuel_availability = fuels.clone();
        }
        if let Some(queue) = update.queue {
            self.queue = queue;
        }
        if let Some(queue_size) = update.queue_size {
            self.queue_size = queue_size;
        }
        if let Some(verified) = update.verified {
            self.verified = Some(verified);
        }
        self.last_update = now;
    }
}

/// A partial station update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationUpdate {
    /// New status.
    pub status: Option<StationStatus>,
    /// Replacement fuel availability.
    pub fuel_availability: Option<FuelAvailability>,
    /// New queue length.
    pub queue: Option<QueueLength>,
    /// New queue size estimate (`Some(None)` clears it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_size: Option<Option<u32>>,
    /// New verified flag.
    pub verified: Option<bool>,
}

/// Descriptive station details entered by an owner, either for a new
/// station or as proposed changes to an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDetails {
    /// Station name.
    pub name: String,
    /// Street address or landmark.
    pub address: String,
    /// Commune ID.
    pub commune_id: u32,
    /// Location.
    pub location: GeoPoint,
    /// Fuels the owner declares available.
    pub fuel_availability: FuelAvailability,
    /// Photo of the station.
    pub image_url: Option<String>,
}

/// Category of a citizen incident report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum IncidentType {
    /// Favouritism, non-compliant prices
    Abuse,
    /// Resale on the black market
    BlackMarket,
    /// Dispute or altercation
    Dispute,
}

impl IncidentType {
    /// French label shown to citizens.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Abuse => "Abus (ex: favoritisme, prix non-conformes)",
            Self::BlackMarket => "Vente au marché noir",
            Self::Dispute => "Dispute / Altercation",
        }
    }
}

/// A public incident report tied to a station. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentReport {
    /// Report ID.
    pub id: ReportId,
    /// Station the incident happened at.
    pub station_id: StationId,
    /// Incident category.
    pub incident_type: IncidentType,
    /// Free-text description.
    pub description: String,
    /// Submission time.
    pub reported_at: DateTime<Utc>,
}

/// Kind of fraud flagged in an integrity report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum FraudType {
    /// Speculative pricing
    AbusivePricing,
    /// Selling to friends and family first
    Favoritism,
    /// Hiding fuel stock
    StockRetention,
    /// Anything else (requires a description)
    Other,
}

impl FraudType {
    /// French label shown to citizens.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AbusivePricing => "Prix Abusif (Spéculation)",
            Self::Favoritism => "Favoritisme (Vente aux proches)",
            Self::StockRetention => "Rétention de Stock (Cacher le carburant)",
            Self::Other => "Autres",
        }
    }
}

/// A confidential integrity report, visible to moderators only.
/// Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    /// Report ID.
    pub id: ReportId,
    /// Station concerned.
    pub station_id: StationId,
    /// Fraud types observed (never empty).
    pub fraud_types: BTreeSet<FraudType>,
    /// Description of an [`FraudType::Other`] fraud.
    pub other_fraud_description: Option<String>,
    /// When the reporter observed the events, as entered.
    pub observation_date_time: String,
    /// What happened.
    pub description: String,
    /// Whether the reporter chose to stay anonymous.
    pub is_anonymous: bool,
    /// Contact details when not anonymous.
    pub contact_info: Option<String>,
    /// Submission time.
    pub reported_at: DateTime<Utc>,
}

/// Owner-proposed changes to an existing station, queued for moderation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    /// Request ID.
    pub id: ReportId,
    /// Station the changes apply to.
    pub station_id: StationId,
    /// Proposed details.
    pub changes: StationDetails,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(status: StationStatus, verified: Option<bool>) -> Station {
        Station {
            id: 1,
            name: "TotalEnergies ACI 2000".to_string(),
            address: "ACI 2000, Bamako".to_string(),
            commune_id: 4,
            commune_name: "Commune IV".to_string(),
            location: GeoPoint::new(12.63, -8.03),
            status,
            fuel_availability: FuelAvailability::with_available(&[FuelType::Gasoline]),
            queue: QueueLength::Short,
            queue_size: Some(10),
            last_update: DateTime::<Utc>::UNIX_EPOCH,
            verified,
            image_url: None,
        }
    }

    #[test]
    fn parses_status_case_insensitively() {
        assert_eq!(
            "available".parse::<StationStatus>().ok(),
            Some(StationStatus::Available)
        );
        assert_eq!(
            "PENDING_VALIDATION".parse::<StationStatus>().ok(),
            Some(StationStatus::PendingValidation)
        );
        assert!("nope".parse::<StationStatus>().is_err());
    }

    #[test]
    fn fuel_availability_reports_available_fuels_in_order() {
        let mut fuels = FuelAvailability::with_available(&[FuelType::Kerosene, FuelType::Gasoline]);
        fuels.set(FuelType::Diesel, false);
        let available: Vec<FuelType> = fuels.available().collect();
        assert_eq!(available, vec![FuelType::Gasoline, FuelType::Kerosene]);
        assert!(fuels.any_available());
        assert!(!fuels.is_available(FuelType::Diesel));
    }

    #[test]
    fn empty_fuel_availability_has_nothing_available() {
        assert!(!FuelAvailability::default().any_available());
    }

    #[test]
    fn unverified_or_pending_stations_are_not_public() {
        assert!(station(StationStatus::Available, Some(true)).is_public());
        assert!(station(StationStatus::Closed, None).is_public());
        assert!(!station(StationStatus::Available, Some(false)).is_public());
        assert!(!station(StationStatus::PendingValidation, Some(true)).is_public());
    }

    #[test]
    fn search_matches_name_or_address_ignoring_case() {
        let s = station(StationStatus::Available, Some(true));
        assert!(s.matches_search("totalenergies"));
        assert!(s.matches_search("aci 2000, BAMAKO"));
        assert!(s.matches_search(""));
        assert!(!s.matches_search("Shell"));
    }

    #[test]
    fn merge_only_touches_provided_fields() {
        let mut s = station(StationStatus::Available, Some(true));
        let now = DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::hours(1);
        s.merge(
            &StationUpdate {
                queue: Some(QueueLength::Long),
                queue_size: Some(Some(75)),
                ..StationUpdate::default()
            },
            now,
        );
        assert_eq!(s.queue, QueueLength::Long);
        assert_eq!(s.queue_size, Some(75));
        assert_eq!(s.status, StationStatus::Available);
        assert_eq!(s.last_update, now);
    }

    #[test]
    fn station_round_trips_through_camel_case_json() {
        let s = station(StationStatus::Closed, None);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["communeName"], "Commune IV");
        assert_eq!(json["status"], "CLOSED");
        assert_eq!(json["fuelAvailability"]["GASOLINE"], true);
        let back: Station = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn directions_url_points_at_location() {
        let s = station(StationStatus::Available, None);
        assert_eq!(
            s.directions_url(),
            "https://www.google.com/maps/dir/?api=1&destination=12.63,-8.03"
        );
    }
}

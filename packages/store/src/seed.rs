//! Seed data, loaded from embedded TOML.
//!
//! The Bamako snapshot in `seed/bamako.toml` is baked into the binary at
//! compile time via [`include_str!`]. Setting `FUEL_MAP_SEED` to a path
//! replaces it with a TOML file of the same shape.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use fuel_map_station_models::{
    Commune, FuelAvailability, FuelType, GeoPoint, IncidentReport, IncidentType, QueueLength,
    ReportId, Station, StationId, StationStatus,
};
use serde::Deserialize;
use thiserror::Error;

/// Seed embedded at compile time.
const EMBEDDED_SEED: &str = include_str!("../seed/bamako.toml");

/// Errors raised while loading seed data.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The override file could not be read.
    #[error("Failed to read seed file {path}: {source}")]
    Io {
        /// Path from `FUEL_MAP_SEED`.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The TOML document is malformed.
    #[error("Invalid seed TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Two communes share an id.
    #[error("Duplicate commune id {0}")]
    DuplicateCommune(u32),

    /// Two stations share an id.
    #[error("Duplicate station id {0}")]
    DuplicateStation(StationId),

    /// A station points at a commune that is not defined.
    #[error("Station {station_id} references unknown commune {commune_id}")]
    UnknownCommune {
        /// Offending station.
        station_id: StationId,
        /// Missing commune.
        commune_id: u32,
    },
}

/// Parsed seed data, timestamps resolved against a load time.
#[derive(Debug, Clone)]
pub struct Seed {
    /// Communes of the metro area.
    pub communes: Vec<Commune>,
    /// Every station, verified or not.
    pub stations: Vec<Station>,
    /// Initial incident reports.
    pub incidents: Vec<IncidentReport>,
}

#[derive(Deserialize)]
struct SeedFile {
    #[serde(default)]
    communes: Vec<Commune>,
    #[serde(default)]
    stations: Vec<SeedStation>,
    #[serde(default)]
    incidents: Vec<SeedIncident>,
}

#[derive(Deserialize)]
struct SeedStation {
    id: StationId,
    name: String,
    address: String,
    commune_id: u32,
    lat: f64,
    lon: f64,
    status: StationStatus,
    #[serde(default)]
    fuels: Vec<FuelType>,
    queue: QueueLength,
    queue_size: Option<u32>,
    #[serde(default)]
    minutes_ago: u32,
    verified: Option<bool>,
    image_url: Option<String>,
}

#[derive(Deserialize)]
struct SeedIncident {
    id: ReportId,
    station_id: StationId,
    incident_type: IncidentType,
    description: String,
    #[serde(default)]
    minutes_ago: u32,
}

/// Parses a seed document, resolving `minutes_ago` offsets against `now`.
///
/// # Errors
///
/// Returns [`SeedError`] if the TOML is malformed, ids collide, or a
/// station references an unknown commune.
pub fn parse_seed(toml_str: &str, now: DateTime<Utc>) -> Result<Seed, SeedError> {
    let file: SeedFile = toml::from_str(toml_str)?;

    let mut commune_ids = BTreeSet::new();
    for commune in &file.communes {
        if !commune_ids.insert(commune.id) {
            return Err(SeedError::DuplicateCommune(commune.id));
        }
    }

    let mut station_ids = BTreeSet::new();
    let mut stations = Vec::with_capacity(file.stations.len());
    for raw in file.stations {
        if !station_ids.insert(raw.id) {
            return Err(SeedError::DuplicateStation(raw.id));
        }
        let commune_name = file
            .communes
            .iter()
            .find(|c| c.id == raw.commune_id)
            .map(|c| c.name.clone())
            .ok_or(SeedError::UnknownCommune {
                station_id: raw.id,
                commune_id: raw.commune_id,
            })?;

        stations.push(Station {
            id: raw.id,
            name: raw.name,
            address: raw.address,
            commune_id: raw.commune_id,
            commune_name,
            location: GeoPoint::new(raw.lat, raw.lon),
            status: raw.status,
            fuel_availability: FuelAvailability::with_available(&raw.fuels),
            queue: raw.queue,
            queue_size: raw.queue_size,
            last_update: now - Duration::minutes(i64::from(raw.minutes_ago)),
            verified: raw.verified,
            image_url: raw.image_url,
        });
    }

    let incidents = file
        .incidents
        .into_iter()
        .map(|raw| IncidentReport {
            id: raw.id,
            station_id: raw.station_id,
            incident_type: raw.incident_type,
            description: raw.description,
            reported_at: now - Duration::minutes(i64::from(raw.minutes_ago)),
        })
        .collect();

    Ok(Seed {
        communes: file.communes,
        stations,
        incidents,
    })
}

/// Loads the embedded Bamako seed.
///
/// # Errors
///
/// Returns [`SeedError`] if the embedded document is invalid.
pub fn embedded(now: DateTime<Utc>) -> Result<Seed, SeedError> {
    parse_seed(EMBEDDED_SEED, now)
}

/// Loads the seed named by `FUEL_MAP_SEED`, falling back to the embedded
/// one when the variable is unset.
///
/// # Errors
///
/// Returns [`SeedError`] if the override cannot be read or parsed.
pub fn load_from_env(now: DateTime<Utc>) -> Result<Seed, SeedError> {
    match std::env::var("FUEL_MAP_SEED") {
        Ok(path) => {
            log::info!("Loading seed data from {path}");
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| SeedError::Io { path: path.clone(), source })?;
            parse_seed(&contents, now)
        }
        Err(_) => embedded(now),
    }
}

//! Fuel trend summarization.
//!
//! Builds a French prompt from a snapshot of the station network, asks the
//! configured [`LlmProvider`] for an analysis, and parses the bolded
//! Markdown sections of the answer for display.

use fuel_map_station_models::Station;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::providers::LlmProvider;

/// Message shown in place of an analysis when the provider call fails.
pub const ANALYSIS_FALLBACK: &str =
    "Une erreur s'est produite lors de l'analyse des tendances. Veuillez réessayer plus tard.";

/// Simplified view of a station sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationSnapshot {
    /// Station name.
    pub nom: String,
    /// Commune name.
    pub commune: String,
    /// Status label.
    pub statut: String,
    /// Queue length label.
    pub file_attente: String,
    /// Comma-joined available fuel labels, or `"Aucun"`.
    pub carburants_disponibles: String,
}

impl From<&Station> for StationSnapshot {
    fn from(station: &Station) -> Self {
        let fuels: Vec<&str> = station
            .fuel_availability
            .available()
            .map(fuel_map_station_models::FuelType::label)
            .collect();

        Self {
            nom: station.name.clone(),
            commune: station.commune_name.clone(),
            statut: station.status.label().to_string(),
            file_attente: station.queue.label().to_string(),
            carburants_disponibles: if fuels.is_empty() {
                "Aucun".to_string()
            } else {
                fuels.join(", ")
            },
        }
    }
}

/// Builds the analysis prompt for `snapshots`.
///
/// # Errors
///
/// Returns [`serde_json::Error`] if the snapshot fails to serialize.
pub fn build_prompt(snapshots: &[StationSnapshot]) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string_pretty(snapshots)?;

    Ok(format!(
        r"En tant qu'analyste de la situation des carburants à Bamako, analysez les données suivantes.
Fournissez une analyse concise pour les citoyens, en français, structurée avec exactement ces titres en gras :

**Résumé Global:** 3-4 phrases sur la situation globale.
**Zones à Privilégier (Meilleure Disponibilité):** liste à puces (*) des communes ou stations à privilégier.
**Zones sous Tension (Disponibilité Faible):** liste à puces (*) des zones à surveiller.
**Conseils Stratégiques pour les Citoyens:** liste à puces (*) de conseils utiles.
**Prédictions à Court Terme (Prochaines 24h):** liste à puces (*) de prédictions.
**Tendance Générale:** une phrase.

Données des stations :
{data}"
    ))
}

/// Asks `provider` to analyze fuel trends across `stations`.
///
/// Never fails: provider errors are logged and replaced with
/// [`ANALYSIS_FALLBACK`]. No retry is attempted.
pub async fn analyze_fuel_trends(provider: &dyn LlmProvider, stations: &[Station]) -> String {
    let snapshots: Vec<StationSnapshot> = stations.iter().map(StationSnapshot::from).collect();

    let prompt = match build_prompt(&snapshots) {
        Ok(prompt) => prompt,
        Err(e) => {
            log::error!("Failed to build analysis prompt: {e}");
            return ANALYSIS_FALLBACK.to_string();
        }
    };

    log::debug!(
        "Requesting trend analysis for {} stations from {}",
        snapshots.len(),
        provider.name()
    );

    match provider.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            log::error!("Error calling {} API: {e}", provider.name());
            ANALYSIS_FALLBACK.to_string()
        }
    }
}

/// Sections parsed out of a model answer.
///
/// When none of the expected headers are present, every field is empty
/// and [`TrendReport::raw`] should be rendered instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    /// Overall summary paragraph.
    pub summary: Option<String>,
    /// Areas with the best availability.
    pub best_zones: Vec<String>,
    /// Areas under strain.
    pub strained_zones: Vec<String>,
    /// Advice for citizens.
    pub advice: Vec<String>,
    /// Next-24h predictions.
    pub predictions: Vec<String>,
    /// One-line overall trend.
    pub trend: Option<String>,
    /// The unparsed answer.
    pub raw: String,
}

impl TrendReport {
    /// Parses the bolded section headers out of `text`.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            summary: section(text, r"Résumé Global"),
            best_zones: bullet_list(section(
                text,
                r"Zones à Privilégier \(Meilleure Disponibilité\)",
            )),
            strained_zones: bullet_list(section(
                text,
                r"Zones sous Tension \(Disponibilité Faible\)",
            )),
            advice: bullet_list(section(text, r"Conseils Stratégiques pour les Citoyens")),
            predictions: bullet_list(section(
                text,
                r"Prédictions à Court Terme \(Prochaines 24h\)",
            )),
            trend: section(text, r"Tendance Générale"),
            raw: text.to_string(),
        }
    }

    /// Whether any section was recognized.
    #[must_use]
    pub fn has_sections(&self) -> bool {
        self.summary.is_some()
            || self.trend.is_some()
            || !self.best_zones.is_empty()
            || !self.strained_zones.is_empty()
            || !self.advice.is_empty()
            || !self.predictions.is_empty()
    }
}

/// Text following `**{header}:**` up to the next `**` or the end.
fn section(text: &str, header: &str) -> Option<String> {
    let re = Regex::new(&format!(r"(?is)\*\*{header}:\*\*\s*(.*?)(?:\*\*|\z)"))
        .unwrap_or_else(|_| unreachable!());

    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Splits a `*`-bulleted block into items.
fn bullet_list(block: Option<String>) -> Vec<String> {
    let Some(block) = block else {
        return Vec::new();
    };
    let re = Regex::new(r"\s*\n\s*\*\s*").unwrap_or_else(|_| unreachable!());

    re.split(&block)
        .map(|item| item.trim().trim_start_matches('*').trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

//! Typed citizen and owner forms with validation.
//!
//! Each form validates into a draft carrying only checked data. Drafts are
//! turned into reports once the store has allocated an id.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use fuel_map_station_models::{
    Commune, FraudType, FuelAvailability, GeoPoint, IncidentReport, IncidentType,
    IntegrityReport, ReportId, StationDetails, StationId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of an integrity report description, in characters.
pub const DESCRIPTION_CHARACTER_LIMIT: usize = 500;

/// Location pre-filled in the new station wizard (central Bamako).
pub const DEFAULT_LOCATION: GeoPoint = GeoPoint::new(12.6392, -8.0029);

/// Form validation failures. Messages are shown to users as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Veuillez sélectionner une station.")]
    MissingStation,
    #[error("Veuillez sélectionner au moins un type de fraude.")]
    NoFraudType,
    #[error("Veuillez préciser le type de fraude dans le champ 'Autres'.")]
    MissingOtherFraudDescription,
    #[error("Veuillez spécifier la date et l'heure de l'observation.")]
    MissingObservationTime,
    #[error("Veuillez fournir une description de l'événement.")]
    MissingDescription,
    #[error("La description ne doit pas dépasser {limit} caractères.")]
    DescriptionTooLong {
        /// Allowed length.
        limit: usize,
    },
    #[error("Veuillez fournir vos informations de contact ou choisir le signalement anonyme.")]
    MissingContact,
    #[error("Veuillez indiquer le nom de la station.")]
    MissingName,
    #[error("Veuillez indiquer l'adresse de la station.")]
    MissingAddress,
    #[error("Veuillez sélectionner une commune valide.")]
    UnknownCommune,
    #[error("Veuillez saisir une latitude et une longitude valides.")]
    InvalidLocation,
    #[error("Veuillez compléter toutes les étapes avant de soumettre.")]
    WizardIncomplete,
}

/// Public incident report form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncidentForm {
    pub station_id: Option<StationId>,
    pub incident_type: IncidentType,
    pub description: String,
}

impl Default for IncidentForm {
    fn default() -> Self {
        Self {
            station_id: None,
            incident_type: IncidentType::Abuse,
            description: String::new(),
        }
    }
}

/// A validated incident report awaiting an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentDraft {
    pub station_id: StationId,
    pub incident_type: IncidentType,
    pub description: String,
}

impl IncidentForm {
    /// Checks the form. Only the station is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingStation`] if no station is selected.
    pub fn validate(self) -> Result<IncidentDraft, FormError> {
        let station_id = self.station_id.ok_or(FormError::MissingStation)?;
        Ok(IncidentDraft {
            station_id,
            incident_type: self.incident_type,
            description: self.description.trim().to_string(),
        })
    }
}

impl IncidentDraft {
    /// Stamps the draft with its id and submission time.
    #[must_use]
    pub fn into_report(self, id: ReportId, now: DateTime<Utc>) -> IncidentReport {
        IncidentReport {
            id,
            station_id: self.station_id,
            incident_type: self.incident_type,
            description: self.description,
            reported_at: now,
        }
    }
}

/// Confidential integrity (fraud) report form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegrityForm {
    pub station_id: Option<StationId>,
    pub fraud_types: BTreeSet<FraudType>,
    pub other_fraud_description: String,
    pub observation_date_time: String,
    pub description: String,
    pub is_anonymous: bool,
    pub contact_info: String,
}

impl Default for IntegrityForm {
    fn default() -> Self {
        Self {
            station_id: None,
            fraud_types: BTreeSet::new(),
            other_fraud_description: String::new(),
            observation_date_time: String::new(),
            description: String::new(),
            is_anonymous: true,
            contact_info: String::new(),
        }
    }
}

/// A validated integrity report awaiting an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityDraft {
    pub station_id: StationId,
    pub fraud_types: BTreeSet<FraudType>,
    pub other_fraud_description: Option<String>,
    pub observation_date_time: String,
    pub description: String,
    pub is_anonymous: bool,
    pub contact_info: Option<String>,
}

impl IntegrityForm {
    /// Checks the form, reporting the first failing rule in this order:
    /// station, fraud types, "other" description, observation time,
    /// description (present, then within [`DESCRIPTION_CHARACTER_LIMIT`]),
    /// contact details.
    ///
    /// # Errors
    ///
    /// Returns the [`FormError`] of the first failing rule.
    pub fn validate(self) -> Result<IntegrityDraft, FormError> {
        let station_id = self.station_id.ok_or(FormError::MissingStation)?;

        if self.fraud_types.is_empty() {
            return Err(FormError::NoFraudType);
        }
        let has_other = self.fraud_types.contains(&FraudType::Other);
        if has_other && self.other_fraud_description.trim().is_empty() {
            return Err(FormError::MissingOtherFraudDescription);
        }
        if self.observation_date_time.trim().is_empty() {
            return Err(FormError::MissingObservationTime);
        }
        if self.description.trim().is_empty() {
            return Err(FormError::MissingDescription);
        }
        if self.description.chars().count() > DESCRIPTION_CHARACTER_LIMIT {
            return Err(FormError::DescriptionTooLong {
                limit: DESCRIPTION_CHARACTER_LIMIT,
            });
        }
        if !self.is_anonymous && self.contact_info.trim().is_empty() {
            return Err(FormError::MissingContact);
        }

        Ok(IntegrityDraft {
            station_id,
            fraud_types: self.fraud_types,
            other_fraud_description: has_other.then_some(self.other_fraud_description),
            observation_date_time: self.observation_date_time,
            description: self.description,
            is_anonymous: self.is_anonymous,
            contact_info: (!self.is_anonymous).then_some(self.contact_info),
        })
    }
}

impl IntegrityDraft {
    /// Stamps the draft with its id and submission time.
    #[must_use]
    pub fn into_report(self, id: ReportId, now: DateTime<Utc>) -> IntegrityReport {
        IntegrityReport {
            id,
            station_id: self.station_id,
            fraud_types: self.fraud_types,
            other_fraud_description: self.other_fraud_description,
            observation_date_time: self.observation_date_time,
            description: self.description,
            is_anonymous: self.is_anonymous,
            contact_info: self.contact_info,
            reported_at: now,
        }
    }
}

/// Step 1 of the new station wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityStep {
    pub name: String,
    pub address: String,
}

impl IdentityStep {
    fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        if self.address.trim().is_empty() {
            return Err(FormError::MissingAddress);
        }
        Ok(())
    }
}

/// Step 2 of the new station wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationStep {
    pub commune_id: u32,
    pub location: GeoPoint,
    pub image_url: Option<String>,
}

impl LocationStep {
    /// First commune and central Bamako.
    #[must_use]
    pub fn with_defaults(communes: &[Commune]) -> Self {
        Self {
            commune_id: communes.first().map_or(0, |c| c.id),
            location: DEFAULT_LOCATION,
            image_url: None,
        }
    }

    fn validate(&self, communes: &[Commune]) -> Result<(), FormError> {
        if !communes.iter().any(|c| c.id == self.commune_id) {
            return Err(FormError::UnknownCommune);
        }
        let GeoPoint { lat, lon } = self.location;
        if !self.location.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lon)
        {
            return Err(FormError::InvalidLocation);
        }
        Ok(())
    }
}

/// Three-step wizard for submitting a new station. Each variant holds the
/// validated data of the steps before it.
#[derive(Debug, Clone, PartialEq)]
pub enum NewStationWizard {
    /// Name and address.
    Identity(IdentityStep),
    /// Commune, coordinates, and photo.
    Location(IdentityStep, LocationStep),
    /// Fuels on sale.
    Fuels(IdentityStep, LocationStep, FuelAvailability),
}

impl Default for NewStationWizard {
    fn default() -> Self {
        Self::Identity(IdentityStep::default())
    }
}

impl NewStationWizard {
    /// Total number of steps.
    pub const STEPS: u8 = 3;

    /// 1-based index of the current step.
    #[must_use]
    pub const fn step_number(&self) -> u8 {
        match self {
            Self::Identity(_) => 1,
            Self::Location(..) => 2,
            Self::Fuels(..) => 3,
        }
    }

    /// Validates the current step and moves to the next one. Does nothing
    /// on the last step.
    ///
    /// # Errors
    ///
    /// Returns the current step's [`FormError`]; the wizard stays put.
    pub fn advance(&mut self, communes: &[Commune]) -> Result<(), FormError> {
        let next = match self {
            Self::Identity(identity) => {
                identity.validate()?;
                Self::Location(identity.clone(), LocationStep::with_defaults(communes))
            }
            Self::Location(identity, location) => {
                location.validate(communes)?;
                Self::Fuels(
                    identity.clone(),
                    location.clone(),
                    FuelAvailability::default(),
                )
            }
            Self::Fuels(..) => return Ok(()),
        };
        *self = next;
        Ok(())
    }

    /// Returns to the previous step, keeping what was entered there.
    pub fn back(&mut self) {
        let previous = match self {
            Self::Identity(_) => return,
            Self::Location(identity, _) => Self::Identity(identity.clone()),
            Self::Fuels(identity, location, _) => {
                Self::Location(identity.clone(), location.clone())
            }
        };
        *self = previous;
    }

    /// Completes the wizard.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::WizardIncomplete`] before the last step, or a
    /// step error if earlier data no longer validates.
    pub fn finish(self, communes: &[Commune]) -> Result<StationDetails, FormError> {
        let Self::Fuels(identity, location, fuels) = self else {
            return Err(FormError::WizardIncomplete);
        };
        identity.validate()?;
        location.validate(communes)?;

        Ok(StationDetails {
            name: identity.name.trim().to_string(),
            address: identity.address.trim().to_string(),
            commune_id: location.commune_id,
            location: location.location,
            fuel_availability: fuels,
            image_url: location.image_url,
        })
    }

    /// Runs already-collected `details` through every step.
    ///
    /// # Errors
    ///
    /// Returns the first step's [`FormError`].
    pub fn complete(details: StationDetails, communes: &[Commune]) -> Result<StationDetails, FormError> {
        let mut wizard = Self::Identity(IdentityStep {
            name: details.name,
            address: details.address,
        });
        wizard.advance(communes)?;
        if let Self::Location(_, location) = &mut wizard {
            *location = LocationStep {
                commune_id: details.commune_id,
                location: details.location,
                image_url: details.image_url,
            };
        }
        wizard.advance(communes)?;
        if let Self::Fuels(_, _, fuels) = &mut wizard {
            *fuels = details.fuel_availability;
        }
        wizard.finish(communes)
    }
}

#[cfg(test)]
mod tests {
    use fuel_map_station_models::FuelType;

    use super::*;

    fn communes() -> Vec<Commune> {
        vec![
            Commune {
                id: 1,
                name: "Commune I".to_string(),
            },
            Commune {
                id: 5,
                name: "Commune V".to_string(),
            },
        ]
    }

    fn complete_integrity() -> IntegrityForm {
        IntegrityForm {
            station_id: Some(2),
            fraud_types: BTreeSet::from([FraudType::Favoritism]),
            observation_date_time: "2025-06-01T08:30".to_string(),
            description: "Vente réservée aux proches du gérant.".to_string(),
            ..IntegrityForm::default()
        }
    }

    #[test]
    fn incident_requires_station() {
        assert_eq!(
            IncidentForm::default().validate(),
            Err(FormError::MissingStation)
        );
        let draft = IncidentForm {
            station_id: Some(3),
            ..IncidentForm::default()
        }
        .validate()
        .unwrap();
        assert_eq!(draft.incident_type, IncidentType::Abuse);
    }

    #[test]
    fn integrity_rules_fire_in_order() {
        assert_eq!(
            IntegrityForm::default().validate(),
            Err(FormError::MissingStation)
        );

        let mut form = complete_integrity();
        form.fraud_types.clear();
        form.description.clear();
        assert_eq!(form.validate(), Err(FormError::NoFraudType));

        let mut form = complete_integrity();
        form.fraud_types.insert(FraudType::Other);
        form.observation_date_time.clear();
        assert_eq!(
            form.validate(),
            Err(FormError::MissingOtherFraudDescription)
        );

        let mut form = complete_integrity();
        form.observation_date_time.clear();
        assert_eq!(form.validate(), Err(FormError::MissingObservationTime));

        let mut form = complete_integrity();
        form.description = "   ".to_string();
        assert_eq!(form.validate(), Err(FormError::MissingDescription));

        let mut form = complete_integrity();
        form.is_anonymous = false;
        assert_eq!(form.validate(), Err(FormError::MissingContact));
    }

    #[test]
    fn integrity_description_is_capped() {
        let mut form = complete_integrity();
        form.description = "é".repeat(DESCRIPTION_CHARACTER_LIMIT);
        assert!(form.clone().validate().is_ok());

        form.description.push('x');
        assert_eq!(
            form.validate(),
            Err(FormError::DescriptionTooLong { limit: 500 })
        );
    }

    #[test]
    fn integrity_draft_drops_unused_optional_fields() {
        let mut form = complete_integrity();
        form.other_fraud_description = "ignored".to_string();
        form.contact_info = "ignored".to_string();
        let draft = form.validate().unwrap();
        assert_eq!(draft.other_fraud_description, None);
        assert_eq!(draft.contact_info, None);

        let mut form = complete_integrity();
        form.is_anonymous = false;
        form.contact_info = "+223 70 00 00 00".to_string();
        let report = form
            .validate()
            .unwrap()
            .into_report(9, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(report.contact_info.as_deref(), Some("+223 70 00 00 00"));
        assert_eq!(report.id, 9);
    }

    #[test]
    fn integrity_form_deserializes_with_anonymous_default() {
        let form: IntegrityForm = serde_json::from_str(r#"{"stationId": 4}"#).unwrap();
        assert!(form.is_anonymous);
        assert_eq!(form.station_id, Some(4));
    }

    #[test]
    fn wizard_walks_three_steps() {
        let communes = communes();
        let mut wizard = NewStationWizard::default();
        assert_eq!(wizard.step_number(), 1);
        assert_eq!(wizard.advance(&communes), Err(FormError::MissingName));

        if let NewStationWizard::Identity(identity) = &mut wizard {
            identity.name = "Station Kalaban".to_string();
            identity.address = "Route de Ségou".to_string();
        }
        wizard.advance(&communes).unwrap();
        assert_eq!(wizard.step_number(), 2);
        let NewStationWizard::Location(_, location) = &wizard else {
            panic!("expected location step");
        };
        assert_eq!(location.commune_id, 1);
        assert_eq!(location.location, DEFAULT_LOCATION);

        wizard.advance(&communes).unwrap();
        if let NewStationWizard::Fuels(_, _, fuels) = &mut wizard {
            fuels.set(FuelType::Diesel, true);
        }
        let details = wizard.finish(&communes).unwrap();
        assert_eq!(details.name, "Station Kalaban");
        assert!(details.fuel_availability.is_available(FuelType::Diesel));
    }

    #[test]
    fn wizard_back_keeps_entered_data() {
        let communes = communes();
        let mut wizard = NewStationWizard::Location(
            IdentityStep {
                name: "A".to_string(),
                address: "B".to_string(),
            },
            LocationStep::with_defaults(&communes),
        );
        wizard.back();
        assert_eq!(
            wizard,
            NewStationWizard::Identity(IdentityStep {
                name: "A".to_string(),
                address: "B".to_string(),
            })
        );
        wizard.back();
        assert_eq!(wizard.step_number(), 1);
    }

    #[test]
    fn wizard_cannot_finish_early() {
        assert_eq!(
            NewStationWizard::default().finish(&communes()),
            Err(FormError::WizardIncomplete)
        );
    }

    #[test]
    fn complete_validates_location() {
        let details = StationDetails {
            name: "Nouvelle".to_string(),
            address: "Kati".to_string(),
            commune_id: 5,
            location: GeoPoint::new(f64::NAN, -8.0),
            fuel_availability: FuelAvailability::default(),
            image_url: None,
        };
        assert_eq!(
            NewStationWizard::complete(details.clone(), &communes()),
            Err(FormError::InvalidLocation)
        );

        let unknown_commune = StationDetails {
            commune_id: 42,
            location: DEFAULT_LOCATION,
            ..details.clone()
        };
        assert_eq!(
            NewStationWizard::complete(unknown_commune, &communes()),
            Err(FormError::UnknownCommune)
        );

        let ok = StationDetails {
            location: DEFAULT_LOCATION,
            ..details
        };
        assert_eq!(
            NewStationWizard::complete(ok, &communes()).map(|d| d.commune_id),
            Ok(5)
        );
    }
}

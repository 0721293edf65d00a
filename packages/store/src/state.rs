//! Application state and its reducer.
//!
//! [`FuelState`] owns every station and report. All mutations go through
//! [`FuelState::apply`], which takes the current time explicitly so the
//! reducer stays deterministic under test.

use chrono::{DateTime, Utc};
use fuel_map_spatial::distance;
use fuel_map_station_models::{
    Commune, FuelType, GeoPoint, IncidentReport, IntegrityReport, QueueLength, ReportId,
    ReviewRequest, Station, StationDetails, StationId, StationStatus, StationUpdate,
};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::forms::{FormError, IncidentForm, IntegrityForm, NewStationWizard};
use crate::map_view::{MapAction, MapView};
use crate::seed::Seed;
use crate::toast::{self, Toast};

/// Password of the built-in moderator account.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin2024";

/// Errors surfaced to the user when an action cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("Station introuvable.")]
    StationNotFound(StationId),
    #[error("Cette station n'est pas en attente de validation.")]
    NotPending(StationId),
    #[error("Authentification administrateur requise.")]
    AdminAuthRequired,
    #[error("Mot de passe incorrect. Veuillez réessayer.")]
    InvalidPassword,
    #[error("Impossible d'obtenir votre position. Veuillez activer la géolocalisation.")]
    GeolocationUnavailable,
    #[error("Désolé, aucune station disponible n'a été trouvée.")]
    NoAvailableStation,
    #[error(transparent)]
    Form(#[from] FormError),
}

/// Top-level screens.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum View {
    #[default]
    Dashboard,
    Map,
    List,
    Admin,
}

/// Everything a user can do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate(View),
    /// Opens the map on a station (from the list or a search result).
    ShowOnMap(StationId),
    /// Selects the available station nearest to `origin`. `None` means the
    /// position could not be obtained.
    FindNearby { origin: Option<GeoPoint> },
    Map(MapAction),
    SetFuel {
        station_id: StationId,
        fuel: FuelType,
        available: bool,
    },
    SetQueue {
        station_id: StationId,
        queue: QueueLength,
    },
    SubmitForReview {
        station_id: StationId,
        changes: StationDetails,
    },
    SubmitNewStation(StationDetails),
    ReportIncident(IncidentForm),
    ReportIntegrity(IntegrityForm),
    AdminLogin { password: String },
    AdminLogout,
    Approve(StationId),
    Reject(StationId),
    DismissToast,
}

/// In-memory application state. Lost on restart.
#[derive(Debug, Clone)]
pub struct FuelState {
    communes: Vec<Commune>,
    verified: Vec<Station>,
    unverified: Vec<Station>,
    incidents: Vec<IncidentReport>,
    integrity_reports: Vec<IntegrityReport>,
    review_requests: Vec<ReviewRequest>,
    view: View,
    map: MapView,
    admin_authenticated: bool,
    admin_password: String,
    toast: Option<Toast>,
    next_id: u64,
}

impl FuelState {
    /// Builds state from seed data, splitting stations into the public and
    /// moderation sets.
    #[must_use]
    pub fn from_seed(seed: Seed, admin_password: impl Into<String>) -> Self {
        let (verified, unverified): (Vec<Station>, Vec<Station>) =
            seed.stations.into_iter().partition(Station::is_public);

        let next_id = verified
            .iter()
            .chain(&unverified)
            .map(|s| s.id)
            .chain(seed.incidents.iter().map(|r| r.id))
            .max()
            .unwrap_or(0)
            + 1;

        log::info!(
            "Loaded {} verified and {} unverified stations across {} communes",
            verified.len(),
            unverified.len(),
            seed.communes.len()
        );

        Self {
            communes: seed.communes,
            verified,
            unverified,
            incidents: seed.incidents,
            integrity_reports: Vec::new(),
            review_requests: Vec::new(),
            view: View::default(),
            map: MapView::default(),
            admin_authenticated: false,
            admin_password: admin_password.into(),
            toast: None,
            next_id,
        }
    }

    #[must_use]
    pub fn communes(&self) -> &[Commune] {
        &self.communes
    }

    /// Stations visible to the public.
    #[must_use]
    pub fn verified_stations(&self) -> &[Station] {
        &self.verified
    }

    /// Stations awaiting moderation.
    #[must_use]
    pub fn unverified_stations(&self) -> &[Station] {
        &self.unverified
    }

    /// Every station, public first.
    #[must_use]
    pub fn all_stations(&self) -> Vec<Station> {
        self.verified
            .iter()
            .chain(&self.unverified)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.verified
            .iter()
            .chain(&self.unverified)
            .find(|s| s.id == id)
    }

    /// Incident reports, newest submission first.
    #[must_use]
    pub fn incidents(&self) -> &[IncidentReport] {
        &self.incidents
    }

    /// Confidential reports, in submission order.
    #[must_use]
    pub fn integrity_reports(&self) -> &[IntegrityReport] {
        &self.integrity_reports
    }

    /// Owner change requests, in submission order.
    #[must_use]
    pub fn review_requests(&self) -> &[ReviewRequest] {
        &self.review_requests
    }

    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub const fn map(&self) -> &MapView {
        &self.map
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.admin_authenticated
    }

    /// The current toast, unless it has expired at `now`.
    #[must_use]
    pub fn toast(&self, now: DateTime<Utc>) -> Option<&Toast> {
        self.toast.as_ref().filter(|t| !t.is_expired(now))
    }

    /// Applies `action` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] when the action is rejected. State is left
    /// unchanged in that case.
    pub fn apply(&mut self, action: Action, now: DateTime<Utc>) -> Result<(), StateError> {
        log::debug!("Applying {action:?}");

        match action {
            Action::Navigate(View::Admin) if !self.admin_authenticated => {
                return Err(StateError::AdminAuthRequired);
            }
            Action::Navigate(view) => {
                if view == View::Map && self.view != View::Map {
                    self.map.reset_filters();
                }
                self.view = view;
            }
            Action::ShowOnMap(station_id) => {
                self.station(station_id)
                    .ok_or(StateError::StationNotFound(station_id))?;
                self.open_map_on(station_id);
            }
            Action::FindNearby { origin } => {
                let origin = origin
                    .filter(GeoPoint::is_finite)
                    .ok_or(StateError::GeolocationUnavailable)?;
                let (nearest, km) =
                    distance::nearest(origin, self.verified.iter().filter(|s| s.is_available()))
                        .ok_or(StateError::NoAvailableStation)?;
                log::info!("Nearest available station: {} ({km:.2} km)", nearest.name);
                let id = nearest.id;
                self.open_map_on(id);
            }
            Action::Map(map_action) => {
                self.map.apply(map_action, &self.verified);
            }
            Action::SetFuel {
                station_id,
                fuel,
                available,
            } => {
                let mut fuels = self
                    .station(station_id)
                    .ok_or(StateError::StationNotFound(station_id))?
                    .fuel_availability
                    .clone();
                fuels.set(fuel, available);
                let status = if fuels.any_available() {
                    StationStatus::Available
                } else {
                    StationStatus::Unavailable
                };
                self.update_station(
                    station_id,
                    &StationUpdate {
                        status: Some(status),
                        fuel_availability: Some(fuels),
                        ..StationUpdate::default()
                    },
                    now,
                )?;
                self.show_toast(toast::status_updated(now), now);
            }
            Action::SetQueue { station_id, queue } => {
                self.update_station(
                    station_id,
                    &StationUpdate {
                        queue: Some(queue),
                        queue_size: Some(Some(queue.estimated_size())),
                        ..StationUpdate::default()
                    },
                    now,
                )?;
                self.show_toast(toast::status_updated(now), now);
            }
            Action::SubmitForReview {
                station_id,
                changes,
            } => {
                self.station(station_id)
                    .ok_or(StateError::StationNotFound(station_id))?;
                let changes = NewStationWizard::complete(changes, &self.communes)?;
                let id = self.allocate_id();
                self.review_requests.push(ReviewRequest {
                    id,
                    station_id,
                    changes,
                    submitted_at: now,
                });
                self.show_toast(toast::REVIEW_SUBMITTED, now);
            }
            Action::SubmitNewStation(details) => {
                let details = NewStationWizard::complete(details, &self.communes)?;
                let id = self.allocate_id();
                let commune_name = self
                    .communes
                    .iter()
                    .find(|c| c.id == details.commune_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                self.unverified.push(Station {
                    id,
                    name: details.name,
                    address: details.address,
                    commune_id: details.commune_id,
                    commune_name,
                    location: details.location,
                    status: StationStatus::PendingValidation,
                    fuel_availability: details.fuel_availability,
                    queue: QueueLength::None,
                    queue_size: Some(0),
                    last_update: now,
                    verified: Some(false),
                    image_url: details.image_url,
                });
                log::info!("New station {id} submitted for validation");
                self.show_toast(toast::STATION_SUBMITTED, now);
            }
            Action::ReportIncident(form) => {
                let draft = form.validate()?;
                if self.station(draft.station_id).is_none() {
                    return Err(StateError::StationNotFound(draft.station_id));
                }
                let id = self.allocate_id();
                self.incidents.insert(0, draft.into_report(id, now));
                self.show_toast(toast::INCIDENT_REPORTED, now);
            }
            Action::ReportIntegrity(form) => {
                let draft = form.validate()?;
                if self.station(draft.station_id).is_none() {
                    return Err(StateError::StationNotFound(draft.station_id));
                }
                let id = self.allocate_id();
                self.integrity_reports.push(draft.into_report(id, now));
                log::info!("Integrity report {id} received for moderation");
                self.show_toast(toast::INTEGRITY_REPORTED, now);
            }
            Action::AdminLogin { password } => {
                if password != self.admin_password {
                    log::warn!("Rejected admin login attempt");
                    return Err(StateError::InvalidPassword);
                }
                self.admin_authenticated = true;
                self.view = View::Admin;
                self.show_toast(toast::ADMIN_WELCOME, now);
            }
            Action::AdminLogout => {
                self.admin_authenticated = false;
                self.view = View::Dashboard;
                self.show_toast(toast::ADMIN_LOGGED_OUT, now);
            }
            Action::Approve(station_id) => {
                let mut station = self.take_pending(station_id)?;
                station.merge(
                    &StationUpdate {
                        status: Some(StationStatus::Available),
                        verified: Some(true),
                        ..StationUpdate::default()
                    },
                    now,
                );
                log::info!("Station {station_id} approved");
                self.verified.push(station);
                self.show_toast(toast::STATION_APPROVED, now);
            }
            Action::Reject(station_id) => {
                self.take_pending(station_id)?;
                log::info!("Station {station_id} rejected");
                self.show_toast(toast::STATION_REJECTED, now);
            }
            Action::DismissToast => self.toast = None,
        }

        self.map.reconcile(&self.verified);
        Ok(())
    }

    fn open_map_on(&mut self, station_id: StationId) {
        if self.view != View::Map {
            self.map.reset_filters();
        }
        self.view = View::Map;
        self.map
            .apply(MapAction::Select(Some(station_id)), &self.verified);
    }

    fn update_station(
        &mut self,
        station_id: StationId,
        update: &StationUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), StateError> {
        let station = self
            .verified
            .iter_mut()
            .chain(self.unverified.iter_mut())
            .find(|s| s.id == station_id)
            .ok_or(StateError::StationNotFound(station_id))?;
        station.merge(update, now);
        Ok(())
    }

    fn take_pending(&mut self, station_id: StationId) -> Result<Station, StateError> {
        if !self.admin_authenticated {
            return Err(StateError::AdminAuthRequired);
        }
        match self.unverified.iter().position(|s| s.id == station_id) {
            Some(index) => Ok(self.unverified.remove(index)),
            None if self.station(station_id).is_some() => Err(StateError::NotPending(station_id)),
            None => Err(StateError::StationNotFound(station_id)),
        }
    }

    fn allocate_id(&mut self) -> ReportId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn show_toast(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.toast = Some(Toast::new(message, now));
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use fuel_map_spatial::{MapMarker, ThresholdPolicy, ZoomLevel, BAMAKO_BBOX};
    use fuel_map_station_models::{FraudType, FuelAvailability, IncidentType};

    use super::*;
    use crate::seed;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000) + Duration::hours(9)
    }

    fn state() -> FuelState {
        FuelState::from_seed(seed::embedded(now()).unwrap(), DEFAULT_ADMIN_PASSWORD)
    }

    fn admin_state() -> FuelState {
        let mut state = state();
        state
            .apply(
                Action::AdminLogin {
                    password: DEFAULT_ADMIN_PASSWORD.to_string(),
                },
                now(),
            )
            .unwrap();
        state
    }

    fn details(name: &str) -> StationDetails {
        StationDetails {
            name: name.to_string(),
            address: "Route de Koulikoro".to_string(),
            commune_id: 7,
            location: GeoPoint::new(12.57, -7.92),
            fuel_availability: FuelAvailability::with_available(&[FuelType::Gasoline]),
            image_url: None,
        }
    }

    #[test]
    fn seed_is_split_into_public_and_pending() {
        let state = state();
        assert_eq!(state.verified_stations().len(), 19);
        assert_eq!(state.unverified_stations().len(), 1);
        assert_eq!(state.unverified_stations()[0].id, 4);
        assert_eq!(state.all_stations().len(), 20);
        assert_eq!(state.view(), View::Dashboard);
    }

    #[test]
    fn fuel_toggle_rederives_status() {
        let mut state = state();
        state
            .apply(
                Action::SetFuel {
                    station_id: 3,
                    fuel: FuelType::Diesel,
                    available: true,
                },
                now(),
            )
            .unwrap();
        let oryx = state.station(3).unwrap();
        assert_eq!(oryx.status, StationStatus::Available);
        assert_eq!(oryx.last_update, now());
        assert_eq!(
            state.toast(now()).map(|t| t.message.as_str()),
            Some("Statut mis à jour avec succès à 09:00.")
        );

        state
            .apply(
                Action::SetFuel {
                    station_id: 3,
                    fuel: FuelType::Diesel,
                    available: false,
                },
                now(),
            )
            .unwrap();
        assert_eq!(state.station(3).unwrap().status, StationStatus::Unavailable);
    }

    #[test]
    fn owner_updates_reach_pending_stations() {
        let mut state = state();
        state
            .apply(
                Action::SetQueue {
                    station_id: 4,
                    queue: QueueLength::Long,
                },
                now(),
            )
            .unwrap();
        let sotuba = state.station(4).unwrap();
        assert_eq!(sotuba.queue, QueueLength::Long);
        assert_eq!(sotuba.queue_size, Some(75));
    }

    #[test]
    fn updating_unknown_station_fails_without_toast() {
        let mut state = state();
        assert_eq!(
            state.apply(
                Action::SetQueue {
                    station_id: 999,
                    queue: QueueLength::Short,
                },
                now(),
            ),
            Err(StateError::StationNotFound(999))
        );
        assert!(state.toast(now()).is_none());
    }

    #[test]
    fn new_station_goes_to_moderation_with_fresh_id() {
        let mut state = state();
        state
            .apply(Action::SubmitNewStation(details("Kalaban Carburant")), now())
            .unwrap();
        let pending = state.unverified_stations().last().unwrap();
        assert_eq!(pending.id, 21);
        assert_eq!(pending.status, StationStatus::PendingValidation);
        assert_eq!(pending.commune_name, "Kalaban Coro");
        assert_eq!(pending.queue, QueueLength::None);
        assert_eq!(pending.queue_size, Some(0));
        assert_eq!(pending.verified, Some(false));
        assert!(state.verified_stations().iter().all(|s| s.id != 21));
        assert_eq!(
            state.toast(now()).map(|t| t.message.as_str()),
            Some(toast::STATION_SUBMITTED)
        );
    }

    #[test]
    fn invalid_new_station_is_rejected() {
        let mut state = state();
        let err = state
            .apply(Action::SubmitNewStation(details("  ")), now())
            .unwrap_err();
        assert_eq!(err, StateError::Form(FormError::MissingName));
        assert_eq!(state.unverified_stations().len(), 1);
    }

    #[test]
    fn moderation_requires_admin() {
        let mut state = state();
        assert_eq!(
            state.apply(Action::Approve(4), now()),
            Err(StateError::AdminAuthRequired)
        );
        assert_eq!(
            state.apply(Action::Navigate(View::Admin), now()),
            Err(StateError::AdminAuthRequired)
        );
    }

    #[test]
    fn wrong_password_is_rejected() {
        let mut state = state();
        assert_eq!(
            state.apply(
                Action::AdminLogin {
                    password: "nope".to_string()
                },
                now()
            ),
            Err(StateError::InvalidPassword)
        );
        assert!(!state.is_admin());
        assert_eq!(
            StateError::InvalidPassword.to_string(),
            "Mot de passe incorrect. Veuillez réessayer."
        );
    }

    #[test]
    fn approve_publishes_station() {
        let mut state = admin_state();
        assert_eq!(state.view(), View::Admin);
        let later = now() + Duration::minutes(3);
        state.apply(Action::Approve(4), later).unwrap();

        assert!(state.unverified_stations().is_empty());
        let sotuba = state.verified_stations().last().unwrap();
        assert_eq!(sotuba.id, 4);
        assert_eq!(sotuba.status, StationStatus::Available);
        assert_eq!(sotuba.verified, Some(true));
        assert_eq!(sotuba.last_update, later);
        assert_eq!(
            state.toast(later).map(|t| t.message.as_str()),
            Some(toast::STATION_APPROVED)
        );
    }

    #[test]
    fn reject_discards_submission() {
        let mut state = admin_state();
        state.apply(Action::Reject(4), now()).unwrap();
        assert!(state.station(4).is_none());
        assert_eq!(
            state.apply(Action::Reject(4), now()),
            Err(StateError::StationNotFound(4))
        );
        assert_eq!(
            state.apply(Action::Approve(1), now()),
            Err(StateError::NotPending(1))
        );
    }

    #[test]
    fn logout_returns_to_dashboard() {
        let mut state = admin_state();
        state.apply(Action::AdminLogout, now()).unwrap();
        assert!(!state.is_admin());
        assert_eq!(state.view(), View::Dashboard);
        assert_eq!(
            state.toast(now()).map(|t| t.message.as_str()),
            Some(toast::ADMIN_LOGGED_OUT)
        );
    }

    #[test]
    fn incidents_are_prepended() {
        let mut state = state();
        state
            .apply(
                Action::ReportIncident(IncidentForm {
                    station_id: Some(9),
                    incident_type: IncidentType::BlackMarket,
                    description: "Bidons revendus".to_string(),
                }),
                now(),
            )
            .unwrap();
        let newest = &state.incidents()[0];
        assert_eq!(newest.station_id, 9);
        assert_eq!(newest.id, 21);
        assert_eq!(state.incidents().len(), 4);
    }

    #[test]
    fn integrity_reports_are_validated_and_kept_private() {
        let mut state = state();
        let empty = IntegrityForm::default();
        assert_eq!(
            state.apply(Action::ReportIntegrity(empty), now()),
            Err(StateError::Form(FormError::MissingStation))
        );

        let form = IntegrityForm {
            station_id: Some(15),
            fraud_types: [FraudType::StockRetention].into_iter().collect(),
            observation_date_time: "2025-06-01T07:00".to_string(),
            description: "Cuves pleines mais station fermée.".to_string(),
            ..IntegrityForm::default()
        };
        state.apply(Action::ReportIntegrity(form), now()).unwrap();
        assert_eq!(state.integrity_reports().len(), 1);
        assert_eq!(state.incidents().len(), 3);
    }

    #[test]
    fn review_requests_are_queued() {
        let mut state = state();
        state
            .apply(
                Action::SubmitForReview {
                    station_id: 1,
                    changes: details("TotalEnergies ACI 2000 (rénovée)"),
                },
                now(),
            )
            .unwrap();
        assert_eq!(state.review_requests().len(), 1);
        assert_eq!(state.station(1).unwrap().name, "TotalEnergies ACI 2000");
    }

    #[test]
    fn find_nearby_selects_closest_available_station() {
        let mut state = state();
        // Next to Oryx Magnambougou (id 9).
        state
            .apply(
                Action::FindNearby {
                    origin: Some(GeoPoint::new(12.611, -7.931)),
                },
                now(),
            )
            .unwrap();
        assert_eq!(state.view(), View::Map);
        assert_eq!(state.map().selected, Some(9));
    }

    #[test]
    fn find_nearby_without_position_or_stock() {
        let mut state = state();
        assert_eq!(
            state.apply(Action::FindNearby { origin: None }, now()),
            Err(StateError::GeolocationUnavailable)
        );

        let mut dry = FuelState::from_seed(
            Seed {
                communes: Vec::new(),
                stations: Vec::new(),
                incidents: Vec::new(),
            },
            DEFAULT_ADMIN_PASSWORD,
        );
        assert_eq!(
            dry.apply(
                Action::FindNearby {
                    origin: Some(GeoPoint::new(12.6, -8.0))
                },
                now()
            ),
            Err(StateError::NoAvailableStation)
        );
    }

    #[test]
    fn map_filters_deselect_hidden_station() {
        let mut state = state();
        state.apply(Action::ShowOnMap(3), now()).unwrap();
        assert_eq!(state.map().selected, Some(3));

        state
            .apply(Action::Map(MapAction::SetAvailableOnly(true)), now())
            .unwrap();
        assert_eq!(state.map().selected, None);
    }

    #[test]
    fn owner_update_deselects_station_hidden_by_filters() {
        let mut state = state();
        state.apply(Action::ShowOnMap(1), now()).unwrap();
        state
            .apply(Action::Map(MapAction::SetAvailableOnly(true)), now())
            .unwrap();
        assert_eq!(state.map().selected, Some(1));

        for &fuel in FuelType::all() {
            state
                .apply(
                    Action::SetFuel {
                        station_id: 1,
                        fuel,
                        available: false,
                    },
                    now(),
                )
                .unwrap();
        }

        assert_eq!(state.station(1).unwrap().status, StationStatus::Unavailable);
        assert_eq!(state.map().selected, None);
    }

    #[test]
    fn map_markers_at_max_zoom_cover_every_public_station() {
        let mut state = state();
        state
            .apply(Action::Map(MapAction::SetZoom(ZoomLevel::MAX)), now())
            .unwrap();
        let markers =
            state
                .map()
                .markers(state.verified_stations(), ThresholdPolicy::default(), &BAMAKO_BBOX);
        assert_eq!(markers.len(), 19);
        assert!(markers.iter().all(|m| matches!(m, MapMarker::Station(_))));
    }

    #[test]
    fn toast_expires_and_can_be_dismissed() {
        let mut state = admin_state();
        assert!(state.toast(now()).is_some());
        assert!(state.toast(now() + Duration::seconds(3)).is_none());

        state.apply(Action::DismissToast, now()).unwrap();
        assert!(state.toast(now()).is_none());
    }
}

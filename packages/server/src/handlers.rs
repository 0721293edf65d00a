//! HTTP handler functions for the fuel map API.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use fuel_map_ai::{ANALYSIS_FALLBACK, analyze_fuel_trends};
use fuel_map_server_models::{
    AnalysisResponse, ApiAck, ApiHealth, ApiMarker, ApiStation, FuelToggleRequest, LoginRequest,
    MapQueryParams, MapResponse, NearbyRequest, NearbyResponse, QueueRequest,
};
use fuel_map_spatial::distance;
use fuel_map_station_models::{Station, StationDetails, StationId};
use fuel_map_store::{
    Action, DashboardSummary, FuelState, IncidentForm, IntegrityForm, MapView, StateError,
    StationListFilter,
};

use crate::AppState;

/// Maps a rejected action to a JSON error response carrying its French
/// message.
fn error_response(e: &StateError) -> HttpResponse {
    let mut builder = match e {
        StateError::StationNotFound(_) | StateError::NoAvailableStation => {
            HttpResponse::NotFound()
        }
        StateError::AdminAuthRequired | StateError::InvalidPassword => {
            HttpResponse::Unauthorized()
        }
        StateError::NotPending(_) => HttpResponse::Conflict(),
        StateError::GeolocationUnavailable | StateError::Form(_) => HttpResponse::BadRequest(),
    };
    builder.json(serde_json::json!({ "error": e.to_string() }))
}

/// Applies `action` and acknowledges it with the resulting toast and the
/// station picked from the new state.
fn respond(
    state: &AppState,
    action: Action,
    pick: impl FnOnce(&FuelState) -> Option<&Station>,
) -> HttpResponse {
    let now = Utc::now();
    let mut fuel = state.lock();

    match fuel.apply(action, now) {
        Ok(()) => HttpResponse::Ok().json(ApiAck {
            message: fuel.toast(now).map(|t| t.message.clone()),
            station: pick(&fuel).map(ApiStation::from),
        }),
        Err(e) => {
            log::warn!("Rejected action: {e}");
            error_response(&e)
        }
    }
}

fn api_stations<'a>(stations: impl IntoIterator<Item = &'a Station>) -> Vec<ApiStation> {
    stations.into_iter().map(ApiStation::from).collect()
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/communes`
pub async fn communes(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.lock().communes())
}

/// `GET /api/stations`
///
/// Stations visible to the public.
pub async fn stations(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(api_stations(state.lock().verified_stations()))
}

/// `GET /api/stations/search`
///
/// Full station list, moderation queue included, narrowed by the list
/// filters.
pub async fn search_stations(
    state: web::Data<AppState>,
    filter: web::Query<StationListFilter>,
) -> HttpResponse {
    let stations = state.lock().all_stations();
    HttpResponse::Ok().json(api_stations(filter.apply(&stations)))
}

/// `GET /api/stations/{id}`
pub async fn station(state: web::Data<AppState>, path: web::Path<StationId>) -> HttpResponse {
    let id = path.into_inner();
    state.lock().station(id).map_or_else(
        || error_response(&StateError::StationNotFound(id)),
        |s| HttpResponse::Ok().json(ApiStation::from(s)),
    )
}

/// `GET /api/map`
///
/// Clusters the public stations for the requested zoom and filters. A
/// selection the filters hide is dropped from the response.
pub async fn map(state: web::Data<AppState>, params: web::Query<MapQueryParams>) -> HttpResponse {
    let fuel = state.lock();
    let stations = fuel.verified_stations();

    let mut view = MapView::from(&*params);
    view.reconcile(stations);

    let markers = view
        .markers(stations, state.policy, &state.bbox)
        .into_iter()
        .map(|marker| ApiMarker::new(marker, &state.bbox))
        .collect();

    HttpResponse::Ok().json(MapResponse {
        zoom: view.zoom,
        policy: state.policy,
        threshold: state.policy.threshold(view.zoom),
        visible_count: view.filtered(stations).len(),
        markers,
        selected: view.selected_station(stations).map(ApiStation::from),
    })
}

/// `GET /api/dashboard`
pub async fn dashboard(state: web::Data<AppState>) -> HttpResponse {
    let fuel = state.lock();
    HttpResponse::Ok().json(DashboardSummary::compute(
        fuel.verified_stations(),
        fuel.communes(),
        fuel.incidents(),
        Utc::now(),
    ))
}

/// `POST /api/nearby`
///
/// Selects the available station nearest to the caller's position.
pub async fn nearby(state: web::Data<AppState>, body: web::Json<NearbyRequest>) -> HttpResponse {
    let origin = body.origin();
    let mut fuel = state.lock();

    if let Err(e) = fuel.apply(Action::FindNearby { origin }, Utc::now()) {
        log::info!("Nearby lookup failed: {e}");
        return error_response(&e);
    }

    let found = origin.zip(fuel.map().selected.and_then(|id| fuel.station(id)));
    match found {
        Some((origin, station)) => HttpResponse::Ok().json(NearbyResponse {
            distance_km: distance::distance_km(origin, station.location),
            station: ApiStation::from(station),
        }),
        None => error_response(&StateError::NoAvailableStation),
    }
}

/// `GET /api/incidents`
pub async fn incidents(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.lock().incidents())
}

/// `POST /api/incidents`
pub async fn report_incident(
    state: web::Data<AppState>,
    body: web::Json<IncidentForm>,
) -> HttpResponse {
    respond(&state, Action::ReportIncident(body.into_inner()), |_| None)
}

/// `POST /api/integrity-reports`
///
/// Confidential: the report is acknowledged but never listed publicly.
pub async fn report_integrity(
    state: web::Data<AppState>,
    body: web::Json<IntegrityForm>,
) -> HttpResponse {
    respond(&state, Action::ReportIntegrity(body.into_inner()), |_| None)
}

/// `POST /api/owner/stations`
pub async fn submit_station(
    state: web::Data<AppState>,
    body: web::Json<StationDetails>,
) -> HttpResponse {
    respond(&state, Action::SubmitNewStation(body.into_inner()), |s| {
        s.unverified_stations().last()
    })
}

/// `POST /api/owner/stations/{id}/fuel`
pub async fn set_fuel(
    state: web::Data<AppState>,
    path: web::Path<StationId>,
    body: web::Json<FuelToggleRequest>,
) -> HttpResponse {
    let station_id = path.into_inner();
    let FuelToggleRequest { fuel, available } = body.into_inner();
    respond(
        &state,
        Action::SetFuel {
            station_id,
            fuel,
            available,
        },
        |s| s.station(station_id),
    )
}

/// `POST /api/owner/stations/{id}/queue`
pub async fn set_queue(
    state: web::Data<AppState>,
    path: web::Path<StationId>,
    body: web::Json<QueueRequest>,
) -> HttpResponse {
    let station_id = path.into_inner();
    respond(
        &state,
        Action::SetQueue {
            station_id,
            queue: body.queue,
        },
        |s| s.station(station_id),
    )
}

/// `POST /api/owner/stations/{id}/review`
pub async fn submit_review(
    state: web::Data<AppState>,
    path: web::Path<StationId>,
    body: web::Json<StationDetails>,
) -> HttpResponse {
    let station_id = path.into_inner();
    respond(
        &state,
        Action::SubmitForReview {
            station_id,
            changes: body.into_inner(),
        },
        |s| s.station(station_id),
    )
}

/// `POST /api/admin/login`
pub async fn admin_login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> HttpResponse {
    let password = body.into_inner().password;
    respond(&state, Action::AdminLogin { password }, |_| None)
}

/// `POST /api/admin/logout`
pub async fn admin_logout(state: web::Data<AppState>) -> HttpResponse {
    respond(&state, Action::AdminLogout, |_| None)
}

/// `GET /api/admin/pending`
pub async fn pending(state: web::Data<AppState>) -> HttpResponse {
    let fuel = state.lock();
    if !fuel.is_admin() {
        return error_response(&StateError::AdminAuthRequired);
    }
    HttpResponse::Ok().json(api_stations(fuel.unverified_stations()))
}

/// `POST /api/admin/stations/{id}/approve`
pub async fn approve(state: web::Data<AppState>, path: web::Path<StationId>) -> HttpResponse {
    let station_id = path.into_inner();
    respond(&state, Action::Approve(station_id), |s| {
        s.station(station_id)
    })
}

/// `POST /api/admin/stations/{id}/reject`
pub async fn reject(state: web::Data<AppState>, path: web::Path<StationId>) -> HttpResponse {
    respond(&state, Action::Reject(path.into_inner()), |_| None)
}

/// `POST /api/analysis`
///
/// Asks the configured model for a French trend report over the public
/// stations. Failures degrade to the fallback apology; nothing is retried.
pub async fn analysis(state: web::Data<AppState>) -> HttpResponse {
    let stations = state.lock().verified_stations().to_vec();

    let text = match state.provider.as_deref() {
        Some(provider) => analyze_fuel_trends(provider, &stations).await,
        None => {
            log::warn!("Trend analysis requested but no AI provider is configured");
            ANALYSIS_FALLBACK.to_string()
        }
    };

    HttpResponse::Ok().json(AnalysisResponse::from(text))
}

/// `GET /api/toast`
///
/// The current confirmation message, or `null` once it has expired.
pub async fn toast(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.lock().toast(Utc::now()))
}

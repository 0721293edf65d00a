#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the fuel map application.
//!
//! Serves the REST API over a single in-memory [`FuelState`] seeded at
//! startup. Every request locks the state, applies one action or reads a
//! snapshot, and releases it. AI trend analysis snapshots the verified
//! stations first so the lock is never held across the model call.

mod handlers;
pub mod interactive;

use std::sync::{Mutex, MutexGuard, PoisonError};

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use chrono::Utc;
use fuel_map_ai::providers::{LlmProvider, create_provider_from_env};
use fuel_map_spatial::{BAMAKO_BBOX, BoundingBox, ThresholdPolicy};
use fuel_map_store::{DEFAULT_ADMIN_PASSWORD, FuelState, SeedError, seed};
use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or running the HTTP server failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The seed data could not be loaded.
    #[error(transparent)]
    Seed(#[from] SeedError),
}

/// Shared application state.
pub struct AppState {
    /// Stations, reports, and session flags. Lost on restart.
    pub state: Mutex<FuelState>,
    /// Trend summarizer. `None` when no provider is configured, in which
    /// case analysis requests get the fallback apology.
    pub provider: Option<Box<dyn LlmProvider>>,
    /// How the clustering radius is derived from the zoom level.
    pub policy: ThresholdPolicy,
    /// Region mapped onto the display plane.
    pub bbox: BoundingBox,
}

impl AppState {
    #[must_use]
    pub fn new(
        state: FuelState,
        provider: Option<Box<dyn LlmProvider>>,
        policy: ThresholdPolicy,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            state: Mutex::new(state),
            provider,
            policy,
            bbox,
        }
    }

    /// Builds the state from `FUEL_MAP_SEED`, `ADMIN_PASSWORD`,
    /// `CLUSTER_POLICY`, and the AI provider variables.
    ///
    /// A missing AI provider only disables trend analysis.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] if the seed data cannot be loaded.
    pub fn from_env() -> Result<Self, SeedError> {
        let seed = seed::load_from_env(Utc::now())?;

        let admin_password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());

        let policy = std::env::var("CLUSTER_POLICY")
            .ok()
            .and_then(|raw| {
                raw.parse::<ThresholdPolicy>()
                    .inspect_err(|_| log::warn!("Unknown CLUSTER_POLICY '{raw}', using default"))
                    .ok()
            })
            .unwrap_or_default();
        log::info!("Clustering policy: {policy}");

        let provider = match create_provider_from_env() {
            Ok(provider) => {
                log::info!("AI provider: {}", provider.name());
                Some(provider)
            }
            Err(e) => {
                log::warn!("AI trend analysis disabled: {e}");
                None
            }
        };

        Ok(Self::new(
            FuelState::from_seed(seed, admin_password),
            provider,
            policy,
            BAMAKO_BBOX,
        ))
    }

    /// Locks the fuel state. A poisoned lock is recovered: every action
    /// either applies fully or leaves the state untouched.
    pub fn lock(&self) -> MutexGuard<'_, FuelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/communes", web::get().to(handlers::communes))
            .route("/stations", web::get().to(handlers::stations))
            .route("/stations/search", web::get().to(handlers::search_stations))
            .route("/stations/{id}", web::get().to(handlers::station))
            .route("/map", web::get().to(handlers::map))
            .route("/dashboard", web::get().to(handlers::dashboard))
            .route("/nearby", web::post().to(handlers::nearby))
            .route("/incidents", web::get().to(handlers::incidents))
            .route("/incidents", web::post().to(handlers::report_incident))
            .route(
                "/integrity-reports",
                web::post().to(handlers::report_integrity),
            )
            .route("/owner/stations", web::post().to(handlers::submit_station))
            .route(
                "/owner/stations/{id}/fuel",
                web::post().to(handlers::set_fuel),
            )
            .route(
                "/owner/stations/{id}/queue",
                web::post().to(handlers::set_queue),
            )
            .route(
                "/owner/stations/{id}/review",
                web::post().to(handlers::submit_review),
            )
            .route("/admin/login", web::post().to(handlers::admin_login))
            .route("/admin/logout", web::post().to(handlers::admin_logout))
            .route("/admin/pending", web::get().to(handlers::pending))
            .route(
                "/admin/stations/{id}/approve",
                web::post().to(handlers::approve),
            )
            .route(
                "/admin/stations/{id}/reject",
                web::post().to(handlers::reject),
            )
            .route("/analysis", web::post().to(handlers::analysis))
            .route("/toast", web::get().to(handlers::toast)),
    );
}

/// Starts the fuel map API server.
///
/// Loads the seed data, configures the AI provider, and starts the
/// Actix-Web HTTP server. The caller is responsible for providing the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the seed cannot be loaded or the HTTP
/// server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    // The CLI may already have installed a logger.
    let _ = pretty_env_logger::try_init_custom_env("RUST_LOG");

    log::info!("Loading station data...");
    let state = web::Data::new(AppState::from_env()?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use fuel_map_store::Toast;
    use serde_json::{Value, json};

    use super::*;

    const PASSWORD: &str = "secret";

    fn app_state() -> web::Data<AppState> {
        let seed = seed::embedded(Utc::now()).unwrap();
        web::Data::new(AppState::new(
            FuelState::from_seed(seed, PASSWORD),
            None,
            ThresholdPolicy::default(),
            BAMAKO_BBOX,
        ))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = app!(app_state());
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["healthy"], true);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn stations_lists_only_verified() {
        let app = app!(app_state());
        let req = test::TestRequest::get().uri("/api/stations").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let stations = body.as_array().unwrap();
        assert_eq!(stations.len(), 19);
        assert!(stations.iter().all(|s| s["id"] != 4));
        assert!(stations[0]["directionsUrl"].is_string());
    }

    #[actix_web::test]
    async fn search_covers_unverified_stations() {
        let app = app!(app_state());
        let req = test::TestRequest::get()
            .uri("/api/stations/search?search=sotuba&status=AVAILABLE")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let ids: Vec<i64> = body
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|s| s["id"].as_i64())
            .collect();
        assert_eq!(ids, vec![13, 4]);
    }

    #[actix_web::test]
    async fn unknown_station_is_404() {
        let app = app!(app_state());
        let req = test::TestRequest::get().uri("/api/stations/999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn map_at_max_zoom_has_one_pin_per_station() {
        let app = app!(app_state());
        let req = test::TestRequest::get().uri("/api/map?zoom=5").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["zoom"], 5);
        assert_eq!(body["threshold"], 0.0);
        assert_eq!(body["markers"].as_array().map(Vec::len), Some(19));
        assert_eq!(body["visibleCount"], 19);
    }

    #[actix_web::test]
    async fn map_zoomed_out_groups_stations() {
        let app = app!(app_state());
        let req = test::TestRequest::get().uri("/api/map?zoom=1").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let markers = body["markers"].as_array().unwrap();
        assert!(markers.len() < 19);
        let total: u64 = markers
            .iter()
            .filter_map(|m| m["stationCount"].as_u64())
            .sum();
        assert_eq!(total, 19);
    }

    #[actix_web::test]
    async fn map_drops_filtered_out_selection() {
        let app = app!(app_state());
        let req = test::TestRequest::get()
            .uri("/api/map?selected=3&available=true")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["selected"].is_null());

        let req = test::TestRequest::get()
            .uri("/api/map?selected=3")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["selected"]["id"], 3);
    }

    #[actix_web::test]
    async fn fuel_toggle_updates_station_and_toast() {
        let state = app_state();
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/api/owner/stations/3/fuel")
            .set_json(json!({"fuel": "DIESEL", "available": true}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["station"]["status"], "AVAILABLE");
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("Statut mis à jour avec succès à ")
        );

        let req = test::TestRequest::get().uri("/api/toast").to_request();
        let toast: Option<Toast> = test::call_and_read_body_json(&app, req).await;
        assert!(toast.is_some());
    }

    #[actix_web::test]
    async fn moderation_requires_login() {
        let state = app_state();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/admin/pending").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(json!({"password": "wrong"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Mot de passe incorrect. Veuillez réessayer.");

        let req = test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(json!({"password": PASSWORD}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/admin/pending").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let req = test::TestRequest::post()
            .uri("/api/admin/stations/4/approve")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["station"]["verified"], true);
        assert_eq!(state.lock().verified_stations().len(), 20);
    }

    #[actix_web::test]
    async fn invalid_integrity_report_is_400_with_message() {
        let app = app!(app_state());
        let req = test::TestRequest::post()
            .uri("/api/integrity-reports")
            .set_json(json!({"stationId": 2}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["error"],
            "Veuillez sélectionner au moins un type de fraude."
        );
    }

    #[actix_web::test]
    async fn nearby_without_fix_is_400() {
        let app = app!(app_state());
        let req = test::TestRequest::post()
            .uri("/api/nearby")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn nearby_returns_station_and_distance() {
        let app = app!(app_state());
        let req = test::TestRequest::post()
            .uri("/api/nearby")
            .set_json(json!({"lat": 12.611, "lon": -7.931}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["station"]["id"], 9);
        assert!(body["distanceKm"].as_f64().unwrap() < 1.0);
    }

    #[actix_web::test]
    async fn analysis_without_provider_falls_back() {
        let app = app!(app_state());
        let req = test::TestRequest::post().uri("/api/analysis").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["text"], fuel_map_ai::ANALYSIS_FALLBACK);
        assert_eq!(body["structured"], false);
    }
}

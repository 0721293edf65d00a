#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the fuel map API server.

#[actix_web::main]
async fn main() -> Result<(), fuel_map_server::ServerError> {
    fuel_map_server::run_server().await
}

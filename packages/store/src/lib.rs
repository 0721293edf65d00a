#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory state of the fuel map.
//!
//! Stations, reports, and UI state live in a single [`FuelState`] that is
//! seeded from embedded TOML at startup and mutated only through
//! [`FuelState::apply`]. Nothing is persisted.

pub mod dashboard;
pub mod forms;
pub mod list;
pub mod map_view;
pub mod seed;
pub mod state;
pub mod toast;

pub use dashboard::DashboardSummary;
pub use forms::{FormError, IncidentForm, IntegrityForm, NewStationWizard};
pub use list::StationListFilter;
pub use map_view::{MapAction, MapView};
pub use seed::{Seed, SeedError};
pub use state::{Action, DEFAULT_ADMIN_PASSWORD, FuelState, StateError, View};
pub use toast::Toast;

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geo-clustering projector for the station map.
//!
//! Projects station coordinates into a bounded `[0, 100]` display plane
//! and greedily groups nearby stations into cluster markers. The grouping
//! radius shrinks non-linearly as the zoom level increases, so the map
//! shows a few large clusters when zoomed out and individual pins when
//! fully zoomed in.

pub mod cluster;
pub mod distance;
pub mod pin;
pub mod projection;
pub mod threshold;

pub use cluster::{Cluster, MapMarker, cluster_stations};
pub use pin::AvailabilityBand;
pub use projection::{BAMAKO_BBOX, BoundingBox, DisplayPoint};
pub use threshold::{ThresholdPolicy, ZoomLevel};

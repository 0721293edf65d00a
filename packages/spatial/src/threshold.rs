//! Zoom levels and the zoom-dependent clustering radius.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A discrete map zoom level, always within `[MIN, MAX]`.
///
/// 1 is fully zoomed out; [`ZoomLevel::MAX`] is fully zoomed in, where
/// clustering is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct ZoomLevel(u8);

impl ZoomLevel {
    /// Most zoomed-out level.
    pub const MIN: Self = Self(1);
    /// Most zoomed-in level.
    pub const MAX: Self = Self(5);
    /// Level the map opens at.
    pub const INITIAL: Self = Self(3);

    /// Creates a zoom level, clamping `level` into range.
    #[must_use]
    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN.0, Self::MAX.0))
    }

    /// The raw level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// One level further in, saturating at [`ZoomLevel::MAX`].
    #[must_use]
    pub fn zoomed_in(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    /// One level further out, saturating at [`ZoomLevel::MIN`].
    #[must_use]
    pub fn zoomed_out(self) -> Self {
        Self::new(self.0.saturating_sub(1))
    }

    /// Whether the map is fully zoomed in.
    #[must_use]
    pub fn is_max(self) -> bool {
        self == Self::MAX
    }
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl From<u8> for ZoomLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl From<ZoomLevel> for u8 {
    fn from(zoom: ZoomLevel) -> Self {
        zoom.0
    }
}

impl std::fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Largest clustering radius, reached at [`ZoomLevel::MIN`].
pub const MAX_CLUSTER_DISTANCE: f64 = 20.0;

/// Steepness of the radius decay. Values above 1 shrink clusters faster
/// as the user zooms in.
pub const DECAY_EXPONENT: f64 = 1.5;

/// Selects the policy used to derive a clustering radius from a zoom level.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ThresholdPolicy {
    /// `MAX_CLUSTER_DISTANCE * ((MAX - zoom) / (MAX - MIN)) ^ DECAY_EXPONENT`
    #[default]
    #[strum(serialize = "continuous")]
    #[serde(rename = "continuous")]
    ContinuousDecay,
    /// Fixed per-level table `{1: 15, 2: 10, 3: 7, 4: 4, 5: 0}` kept for
    /// parity with older builds of the map.
    #[strum(serialize = "lookup")]
    #[serde(rename = "lookup")]
    LegacyLookup,
}

impl ThresholdPolicy {
    /// Clustering radius in display units for `zoom`. Zero disables
    /// clustering.
    #[must_use]
    pub fn threshold(self, zoom: ZoomLevel) -> f64 {
        match self {
            Self::ContinuousDecay => {
                let span = f64::from(ZoomLevel::MAX.0 - ZoomLevel::MIN.0);
                let remaining = f64::from(ZoomLevel::MAX.0 - zoom.0);
                MAX_CLUSTER_DISTANCE * (remaining / span).powf(DECAY_EXPONENT)
            }
            Self::LegacyLookup => match zoom.0 {
                1 => 15.0,
                2 => 10.0,
                3 => 7.0,
                4 => 4.0,
                _ => 0.0,
            },
        }
    }
}

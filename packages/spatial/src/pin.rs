//! Marker sizing and availability colour bands.

use serde::{Deserialize, Serialize};

/// Diameter of the smallest cluster pin, in display units.
pub const BASE_PIN_DIAMETER: f64 = 32.0;

/// Cluster pins never grow past this diameter.
pub const MAX_PIN_DIAMETER: f64 = 64.0;

/// Diameter added each time a cluster doubles in size. A two-station
/// cluster is 40 units and growth stops at sixteen stations.
pub const PIN_GROWTH_PER_DOUBLING: f64 = 8.0;

/// Badge font size of the smallest cluster pin.
pub const BASE_FONT_SIZE: f64 = 12.0;

/// Pin diameter for a cluster of `member_count` stations.
///
/// Grows with `log2(member_count)` and is clamped to
/// [`MAX_PIN_DIAMETER`].
#[must_use]
pub fn pin_diameter(member_count: usize) -> f64 {
    (BASE_PIN_DIAMETER + PIN_GROWTH_PER_DOUBLING * log2_count(member_count))
        .min(MAX_PIN_DIAMETER)
}

/// Badge font size for a cluster of `member_count` stations.
#[must_use]
pub fn font_size(member_count: usize) -> f64 {
    BASE_FONT_SIZE + log2_count(member_count)
}

#[allow(clippy::cast_precision_loss)]
fn log2_count(member_count: usize) -> f64 {
    (member_count.max(1) as f64).log2()
}

/// Coarse availability rating used to colour clusters and commune cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityBand {
    /// More than two thirds of stations selling fuel
    Good,
    /// More than a third
    Limited,
    /// A third or less
    Critical,
}

impl AvailabilityBand {
    /// Classifies an availability percentage.
    #[must_use]
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage > 66.0 {
            Self::Good
        } else if percentage > 33.0 {
            Self::Limited
        } else {
            Self::Critical
        }
    }

    /// French label shown to citizens.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Bonne disponibilité",
            Self::Limited => "Disponibilité limitée",
            Self::Critical => "Pénurie critique",
        }
    }
}

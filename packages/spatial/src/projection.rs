//! Coordinate normalization into the map's display plane.

use fuel_map_station_models::GeoPoint;
use serde::{Deserialize, Serialize};

/// Geographic bounding box that maps onto the full display plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Southern latitude boundary.
    pub min_lat: f64,
    /// Northern latitude boundary.
    pub max_lat: f64,
    /// Western longitude boundary.
    pub min_lon: f64,
    /// Eastern longitude boundary.
    pub max_lon: f64,
}

/// Bounding box covering the Bamako metro area.
pub const BAMAKO_BBOX: BoundingBox = BoundingBox::new(12.55, 12.70, -8.10, -7.90);

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Whether `point` lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }

    /// Projects `point` into display space.
    ///
    /// `x` grows eastward from 0 at `min_lon` to 100 at `max_lon`. `y` is
    /// inverted because screen rows grow downward while latitude grows
    /// northward: `max_lat` maps to 0 and `min_lat` to 100.
    ///
    /// No clamping is performed. Points outside the box project outside
    /// `[0, 100]` and render off-canvas.
    #[must_use]
    pub fn normalize(&self, point: GeoPoint) -> DisplayPoint {
        let x = (point.lon - self.min_lon) / (self.max_lon - self.min_lon) * 100.0;
        let y = 100.0 - (point.lat - self.min_lat) / (self.max_lat - self.min_lat) * 100.0;
        DisplayPoint { x, y }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        BAMAKO_BBOX
    }
}

/// A position in display space (percent of map width/height).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayPoint {
    /// Horizontal offset from the left edge.
    pub x: f64,
    /// Vertical offset from the top edge.
    pub y: f64,
}

impl DisplayPoint {
    /// Euclidean distance to `other` in display units.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Whether the point falls on the visible canvas.
    #[must_use]
    pub fn is_on_canvas(&self) -> bool {
        (0.0..=100.0).contains(&self.x) && (0.0..=100.0).contains(&self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn corners_map_to_canvas_corners() {
        let top_left = BAMAKO_BBOX.normalize(GeoPoint::new(12.70, -8.10));
        assert!(approx(top_left.x, 0.0));
        assert!(approx(top_left.y, 0.0));

        let bottom_right = BAMAKO_BBOX.normalize(GeoPoint::new(12.55, -7.90));
        assert!(approx(bottom_right.x, 100.0));
        assert!(approx(bottom_right.y, 100.0));
    }

    #[test]
    fn centre_maps_to_middle() {
        let p = BAMAKO_BBOX.normalize(GeoPoint::new(12.625, -8.0));
        assert!(approx(p.x, 50.0));
        assert!(approx(p.y, 50.0));
    }

    #[test]
    fn points_inside_the_box_stay_on_canvas() {
        for i in 0..=20 {
            for j in 0..=20 {
                // Ten-thousandths of a degree, so the edges land exactly on the box.
                let lat = f64::from(125_500 + 75 * i) / 10_000.0;
                let lon = f64::from(-81_000 + 100 * j) / 10_000.0;
                let point = GeoPoint::new(lat, lon);
                assert!(BAMAKO_BBOX.contains(point));
                let p = BAMAKO_BBOX.normalize(point);
                assert!(
                    (-EPSILON..=100.0 + EPSILON).contains(&p.x)
                        && (-EPSILON..=100.0 + EPSILON).contains(&p.y),
                    "{point:?} projected to {p:?}"
                );
            }
        }
    }

    #[test]
    fn points_outside_the_box_are_not_clamped() {
        let north = BAMAKO_BBOX.normalize(GeoPoint::new(12.85, -8.0));
        assert!(approx(north.y, -100.0));
        assert!(!north.is_on_canvas());

        let west = BAMAKO_BBOX.normalize(GeoPoint::new(12.6, -8.30));
        assert!(approx(west.x, -100.0));
        assert!(!west.is_on_canvas());
    }

    #[test]
    fn overflow_grows_monotonically_with_distance_from_the_box() {
        let mut last_x = 100.0;
        for step in 1..10 {
            let lon = -7.90 + 0.01 * f64::from(step);
            let p = BAMAKO_BBOX.normalize(GeoPoint::new(12.6, lon));
            assert!(p.x > last_x);
            last_x = p.x;
        }

        let mut last_y = 100.0;
        for step in 1..10 {
            let lat = 12.55 - 0.01 * f64::from(step);
            let p = BAMAKO_BBOX.normalize(GeoPoint::new(lat, -8.0));
            assert!(p.y > last_y);
            last_y = p.y;
        }
    }

    #[test]
    fn display_distance_is_euclidean() {
        let a = DisplayPoint { x: 0.0, y: 0.0 };
        let b = DisplayPoint { x: 3.0, y: 4.0 };
        assert!(approx(a.distance(&b), 5.0));
    }
}

//! Contour geometry: area, perimeter, and the circularity band.
//!
//! The shape analyzer hands boundary polygons here and gets back the scalar
//! attributes the leaf-likeness test runs on. Area uses the shoelace formula
//! over the boundary points; perimeter is the closed-loop sum of Euclidean
//! steps between consecutive points; circularity is 4π·area/perimeter²
//! (1.0 for a perfect circle).

use std::f64::consts::PI;

use crate::config::GateConfig;

/// Scalar attributes of one boundary polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourMetrics {
    pub area: f64,
    pub perimeter: f64,
    /// 4π·area/perimeter². Zero for degenerate contours whose perimeter is
    /// zero; division never happens in that case.
    pub circularity: f64,
}

impl ContourMetrics {
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let area = polygon_area(points);
        let perimeter = polygon_perimeter(points);
        let circularity = if perimeter > 0.0 {
            (4.0 * PI * area) / (perimeter * perimeter)
        } else {
            0.0
        };
        Self {
            area,
            perimeter,
            circularity,
        }
    }

    /// A contour reads as a leaf silhouette when its circularity falls
    /// strictly inside the configured band: below it lies jagged noise,
    /// above it near-perfect circles and ellipses. Degenerate contours
    /// (zero perimeter) never qualify.
    pub fn is_leaf_like(&self, config: &GateConfig) -> bool {
        self.perimeter > 0.0
            && self.circularity > config.circularity_min
            && self.circularity < config.circularity_max
    }
}

/// Shoelace area of the polygon described by `points`, closing the loop
/// from the last point back to the first. Orientation-independent.
pub fn polygon_area(points: &[(f64, f64)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..points.len() {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % points.len()];
        twice_area += x1 * y2 - x2 * y1;
    }
    twice_area.abs() / 2.0
}

/// Closed-loop boundary length of the polygon described by `points`.
pub fn polygon_perimeter(points: &[(f64, f64)]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut perimeter = 0.0;
    for i in 0..points.len() {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % points.len()];
        perimeter += ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
    }
    perimeter
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

//! Gate thresholds as named, overridable configuration.
//!
//! Every cutoff the leaf gate applies lives here. The defaults are the
//! empirically tuned values the screen has always shipped with; they have no
//! documented derivation, so they are preserved exactly rather than
//! recalibrated. Callers that need a stricter or looser gate override
//! individual fields (struct update syntax or a partial JSON document) and
//! validate before use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid gate configuration: {0}")]
    Invalid(String),
}

// ═══════════════════════════════════════════════════════════
// Gate configuration
// ═══════════════════════════════════════════════════════════

/// Thresholds for the three leaf analyzers and the vote cutoffs they feed.
///
/// Hue values use the half-degree scale (0–179) with saturation and value on
/// 0–255, so the band constants match the classical HSV convention the
/// original calibration was done in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Lower hue bound of the standard green band.
    pub green_hue_min: u8,
    /// Upper hue bound of the standard green band.
    pub green_hue_max: u8,
    /// Lower hue bound of the yellow-green band (autumn and stressed foliage).
    pub yellow_green_hue_min: u8,
    /// Upper hue bound of the yellow-green band.
    pub yellow_green_hue_max: u8,
    /// Minimum saturation for a pixel to count as green. Excludes washed-out
    /// pixels whose hue is unreliable.
    pub min_saturation: u8,
    /// Minimum value (brightness) for a pixel to count as green. Excludes
    /// shadowed pixels.
    pub min_value: u8,
    /// Green-pixel fraction above which the color analyzer votes leaf.
    pub min_green_fraction: f64,

    /// Sigma of the Gaussian smoothing pass before adaptive thresholding.
    pub blur_sigma: f32,
    /// Radius of the adaptive-threshold window; the window spans
    /// `2 * radius + 1` pixels per side.
    pub threshold_block_radius: u32,
    /// Contours with boundary-polygon area at or below this are noise.
    pub min_contour_area: f64,
    /// Lower circularity bound of the leaf-like band. Below it a contour is
    /// a jagged fragment.
    pub circularity_min: f64,
    /// Upper circularity bound of the leaf-like band. Above it a contour is
    /// too close to a perfect circle or ellipse.
    pub circularity_max: f64,
    /// Leaf-like contour area share above which the shape analyzer votes leaf.
    pub min_leaf_contour_ratio: f64,

    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Edge-pixel fraction below which an image is too blank to be a leaf.
    pub edge_density_min: f64,
    /// Edge-pixel fraction above which an image is too cluttered to be a leaf.
    pub edge_density_max: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            green_hue_min: 35,
            green_hue_max: 85,
            yellow_green_hue_min: 25,
            yellow_green_hue_max: 35,
            min_saturation: 40,
            min_value: 40,
            min_green_fraction: 0.15,

            blur_sigma: 1.1,
            threshold_block_radius: 5,
            min_contour_area: 500.0,
            circularity_min: 0.1,
            circularity_max: 0.8,
            min_leaf_contour_ratio: 0.4,

            canny_low: 50.0,
            canny_high: 150.0,
            edge_density_min: 0.01,
            edge_density_max: 0.4,
        }
    }
}

impl GateConfig {
    /// Check structural sanity: bands ordered and in range, fractions in
    /// [0, 1], filter parameters usable. Values inside valid bands are never
    /// second-guessed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.green_hue_min > self.green_hue_max {
            return Err(ConfigError::Invalid(
                "green hue band is inverted (min > max)".into(),
            ));
        }
        if self.yellow_green_hue_min > self.yellow_green_hue_max {
            return Err(ConfigError::Invalid(
                "yellow-green hue band is inverted (min > max)".into(),
            ));
        }
        if self.green_hue_max > 179 || self.yellow_green_hue_max > 179 {
            return Err(ConfigError::Invalid(
                "hue bounds exceed the 0-179 half-degree scale".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_green_fraction) {
            return Err(ConfigError::Invalid(
                "min_green_fraction must lie in [0, 1]".into(),
            ));
        }
        if self.blur_sigma <= 0.0 {
            return Err(ConfigError::Invalid("blur_sigma must be positive".into()));
        }
        if self.threshold_block_radius == 0 {
            return Err(ConfigError::Invalid(
                "threshold_block_radius must be at least 1".into(),
            ));
        }
        if self.min_contour_area < 0.0 {
            return Err(ConfigError::Invalid(
                "min_contour_area cannot be negative".into(),
            ));
        }
        if self.circularity_min >= self.circularity_max {
            return Err(ConfigError::Invalid(
                "circularity band is inverted or empty (min >= max)".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_leaf_contour_ratio) {
            return Err(ConfigError::Invalid(
                "min_leaf_contour_ratio must lie in [0, 1]".into(),
            ));
        }
        if self.canny_low <= 0.0 || self.canny_high <= self.canny_low {
            return Err(ConfigError::Invalid(
                "Canny thresholds must satisfy 0 < low < high".into(),
            ));
        }
        if self.edge_density_min >= self.edge_density_max
            || self.edge_density_min < 0.0
            || self.edge_density_max > 1.0
        {
            return Err(ConfigError::Invalid(
                "edge density band must be an ordered sub-range of [0, 1]".into(),
            ));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

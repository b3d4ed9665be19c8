//! Shape analysis: how much of the image's significant contour area has a
//! leaf-like silhouette.
//!
//! Pipeline per image: BT.601 grayscale, Gaussian smoothing, adaptive
//! thresholding inverted so dark objects on light ground become foreground,
//! Suzuki border following for external contours only, then the area filter
//! and the circularity band from [`super::contour`].

use image::imageops;
use image::RgbImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::adaptive_threshold;
use imageproc::filter::gaussian_blur_f32;
use tracing::debug;

use super::contour::ContourMetrics;
use super::types::ShapeAnalysis;
use super::{rgb_to_luma, GateError};
use crate::config::GateConfig;

/// Measure the leaf-like share of contour area and vote on it.
///
/// Only external boundaries count: a blob's internal holes belong to the
/// blob, not to the population of candidate objects. Contours at or below
/// the area floor are noise and join neither side of the ratio. With no
/// surviving contour the ratio is defined as zero.
pub fn analyze_shape(image: &RgbImage, config: &GateConfig) -> Result<ShapeAnalysis, GateError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(GateError::Analysis("image has no pixels".into()));
    }

    let gray = rgb_to_luma(image);
    let smoothed = gaussian_blur_f32(&gray, config.blur_sigma);
    let mut mask = adaptive_threshold(&smoothed, config.threshold_block_radius);
    // adaptive_threshold marks the locally bright side; the gate wants dark
    // objects on light ground as the "on" class.
    imageops::invert(&mut mask);

    let contours: Vec<Contour<i32>> = find_contours(&mask);

    let mut total_area = 0.0;
    let mut leaf_area = 0.0;
    let mut survivors = 0usize;
    for contour in &contours {
        if contour.parent.is_some() || !matches!(contour.border_type, BorderType::Outer) {
            continue;
        }
        let points: Vec<(f64, f64)> = contour
            .points
            .iter()
            .map(|p| (f64::from(p.x), f64::from(p.y)))
            .collect();
        let metrics = ContourMetrics::from_points(&points);
        if metrics.area <= config.min_contour_area {
            continue;
        }
        survivors += 1;
        total_area += metrics.area;
        if metrics.is_leaf_like(config) {
            leaf_area += metrics.area;
        }
    }

    let leaf_contour_ratio = if total_area > 0.0 {
        leaf_area / total_area
    } else {
        0.0
    };
    debug!(
        contours = contours.len(),
        survivors, leaf_contour_ratio, "contour analysis complete"
    );

    Ok(ShapeAnalysis {
        leaf_contour_ratio,
        vote: leaf_contour_ratio > config.min_leaf_contour_ratio,
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

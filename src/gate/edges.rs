//! Edge density: is the image textured like an organic object at all.
//!
//! Canny with a fixed hysteresis pair, then count edge pixels. Leaves land
//! in a middle band: a near-blank frame has almost no edges, while dense
//! clutter (gravel, fabric, text) saturates the detector. The detector runs
//! on the raw grayscale image; it applies its own internal smoothing.

use image::RgbImage;
use imageproc::edges::canny;
use tracing::debug;

use super::types::EdgeAnalysis;
use super::{rgb_to_luma, GateError};
use crate::config::GateConfig;

/// Measure the edge-pixel fraction and vote on the plausible-texture band.
pub fn analyze_edges(image: &RgbImage, config: &GateConfig) -> Result<EdgeAnalysis, GateError> {
    let total = u64::from(image.width()) * u64::from(image.height());
    if total == 0 {
        return Err(GateError::Analysis("image has no pixels".into()));
    }

    let gray = rgb_to_luma(image);
    let edges = canny(&gray, config.canny_low, config.canny_high);
    let edge_pixels = edges.pixels().filter(|p| p.0[0] > 0).count();

    let edge_density = edge_pixels as f64 / total as f64;
    debug!(edge_pixels, edge_density, "edge detection complete");

    Ok(EdgeAnalysis {
        edge_density,
        vote: config.edge_density_min < edge_density && edge_density < config.edge_density_max,
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

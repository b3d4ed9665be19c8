//! Color segmentation: what fraction of the image is foliage-green.
//!
//! Works in HSV because the green bands were calibrated there; hue is stable
//! under the lighting swings that wreck RGB-ratio checks. Two bands cover
//! healthy green and the yellow-green of stressed or autumn leaves, each
//! additionally gated on saturation and value so washed-out and shadowed
//! pixels never count.

use image::RgbImage;
use tracing::debug;

use super::types::ColorAnalysis;
use super::GateError;
use crate::config::GateConfig;

/// RGB to HSV on the classical 8-bit scale: hue 0–179 (half degrees),
/// saturation and value 0–255. Gray pixels (zero delta) get hue 0 and
/// saturation 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));
    let value = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = value - min;

    let saturation = if value > 0.0 { 255.0 * delta / value } else { 0.0 };

    let hue = if delta > 0.0 {
        let degrees = if value == rf {
            60.0 * (gf - bf) / delta
        } else if value == gf {
            120.0 + 60.0 * (bf - rf) / delta
        } else {
            240.0 + 60.0 * (rf - gf) / delta
        };
        let degrees = if degrees < 0.0 {
            degrees + 360.0
        } else {
            degrees
        };
        degrees / 2.0
    } else {
        0.0
    };

    // Hue wraps at 180 on the half-degree scale.
    (
        (hue.round() as u16 % 180) as u8,
        saturation.round() as u8,
        value.round() as u8,
    )
}

/// Measure the green-pixel fraction and vote on it.
///
/// A pixel counts when its hue falls in either band (inclusive bounds, the
/// union counts a pixel once) and both saturation and value clear their
/// minimums. The mask is never materialized; a running count is enough.
pub fn analyze_color(image: &RgbImage, config: &GateConfig) -> Result<ColorAnalysis, GateError> {
    let total = u64::from(image.width()) * u64::from(image.height());
    if total == 0 {
        return Err(GateError::Analysis("image has no pixels".into()));
    }

    let mut green: u64 = 0;
    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        let (h, s, v) = rgb_to_hsv(r, g, b);
        if s < config.min_saturation || v < config.min_value {
            continue;
        }
        let standard = (config.green_hue_min..=config.green_hue_max).contains(&h);
        let yellowish = (config.yellow_green_hue_min..=config.yellow_green_hue_max).contains(&h);
        if standard || yellowish {
            green += 1;
        }
    }

    let green_fraction = green as f64 / total as f64;
    debug!(green_fraction, "color segmentation complete");

    Ok(ColorAnalysis {
        green_fraction,
        vote: green_fraction > config.min_green_fraction,
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

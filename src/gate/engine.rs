//! The decision engine: decode once, fan the analyzers out, majority-vote.
//!
//! `LeafGate` owns a validated [`GateConfig`] and nothing else: no caches,
//! no pools, no state between evaluations. Every call decodes its own input
//! and discards all intermediates, so parallel and sequential execution of
//! the analyzers give byte-identical verdicts.

use std::path::Path;

use image::RgbImage;
use tracing::{info, warn};

use super::{color, edges, shape, GateError, GateVerdict};
use crate::config::{ConfigError, GateConfig};

// ═══════════════════════════════════════════════════════════
// Input bounds
// ═══════════════════════════════════════════════════════════

/// Maximum input size before rejecting without a decode attempt.
/// Prevents OOM on corrupt or adversarial files.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Minimum plausible input size (the smallest valid PNG is ~67 bytes).
const MIN_IMAGE_BYTES: usize = 67;

fn oversize_error() -> GateError {
    GateError::Decode(format!(
        "Image data exceeds {}MB limit",
        MAX_IMAGE_BYTES / (1024 * 1024)
    ))
}

fn validate_image_bytes(bytes: &[u8]) -> Result<(), GateError> {
    if bytes.len() < MIN_IMAGE_BYTES {
        return Err(GateError::Decode(
            "Image data too small to be a valid raster".into(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(oversize_error());
    }
    Ok(())
}

/// Decode raster bytes into the RGB buffer the analyzers consume. Format is
/// sniffed from the magic bytes; anything the decode layer supports
/// (JPEG/PNG/BMP/TIFF class) is accepted.
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, GateError> {
    validate_image_bytes(bytes)?;
    let decoded = image::load_from_memory(bytes).map_err(|e| GateError::Decode(e.to_string()))?;
    Ok(decoded.to_rgb8())
}

/// Read an image file into memory for [`decode_image`]. The size ceiling is
/// held against the file's metadata, before any bytes are loaded.
pub fn read_image_file(path: &Path) -> Result<Vec<u8>, GateError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| GateError::Decode(format!("Unable to read {}: {e}", path.display())))?;
    if metadata.len() > MAX_IMAGE_BYTES as u64 {
        return Err(oversize_error());
    }
    std::fs::read(path)
        .map_err(|e| GateError::Decode(format!("Unable to read {}: {e}", path.display())))
}

// ═══════════════════════════════════════════════════════════
// Engine
// ═══════════════════════════════════════════════════════════

/// The leaf gate: three analyzers and a 2-of-3 majority vote.
#[derive(Debug, Clone)]
pub struct LeafGate {
    config: GateConfig,
}

impl Default for LeafGate {
    fn default() -> Self {
        Self {
            config: GateConfig::default(),
        }
    }
}

impl LeafGate {
    /// Build a gate around an overridden configuration. Validation happens
    /// here, once, so the per-image path never re-checks thresholds.
    pub fn new(config: GateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Evaluate a decoded image. Always produces a verdict: analyzer
    /// failures are logged and absorbed into a rejection, never raised.
    pub fn evaluate(&self, image: &RgbImage) -> GateVerdict {
        let (color_res, (shape_res, edges_res)) = rayon::join(
            || color::analyze_color(image, &self.config),
            || {
                rayon::join(
                    || shape::analyze_shape(image, &self.config),
                    || edges::analyze_edges(image, &self.config),
                )
            },
        );

        let (color, shape, edges) = match (color_res, shape_res, edges_res) {
            (Ok(color), Ok(shape), Ok(edges)) => (color, shape, edges),
            (color_res, shape_res, edges_res) => {
                // A degenerate input trips every analyzer with the same
                // message; each distinct reason is reported once.
                let mut reasons: Vec<String> = Vec::new();
                for err in [color_res.err(), shape_res.err(), edges_res.err()]
                    .into_iter()
                    .flatten()
                {
                    let message = err.to_string();
                    if !reasons.contains(&message) {
                        reasons.push(message);
                    }
                }
                let reason = reasons.join("; ");
                warn!(%reason, "analyzer failure absorbed; image rejected");
                return GateVerdict::failed(reason);
            }
        };

        let verdict = GateVerdict::from_analyses(color, shape, edges);
        info!(
            is_leaf = verdict.is_leaf,
            confidence = verdict.confidence,
            green_fraction = verdict.diagnostics.green_fraction,
            leaf_contour_ratio = verdict.diagnostics.leaf_contour_ratio,
            edge_density = verdict.diagnostics.edge_density,
            "leaf gate verdict"
        );
        verdict
    }

    /// Evaluate raw raster bytes. Undecodable input is the one failure the
    /// gate surfaces distinctly, so callers can tell "bad input" from
    /// "not a leaf".
    pub fn evaluate_bytes(&self, bytes: &[u8]) -> Result<GateVerdict, GateError> {
        let image = decode_image(bytes)?;
        Ok(self.evaluate(&image))
    }

    /// Evaluate the image file at `path`. An oversized file is rejected on
    /// its metadata alone, never read.
    pub fn evaluate_path(&self, path: &Path) -> Result<GateVerdict, GateError> {
        let bytes = read_image_file(path)?;
        self.evaluate_bytes(&bytes)
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

//! The leaf gate: classical image heuristics that screen uploads before the
//! disease classifier runs.
//!
//! Three independent analyzers each reduce the image to one statistic and one
//! boolean vote:
//! - `color`: fraction of pixels inside the green hue bands,
//! - `shape`: share of significant contour area with leaf-like circularity,
//! - `edges`: fraction of edge pixels (organic texture, not blank or noise).
//!
//! `engine::LeafGate` fans the analyzers out, takes a 2-of-3 majority vote,
//! and always produces a [`types::GateVerdict`]; analyzer failures are
//! absorbed into a rejection, never propagated past the gate.

pub mod color;
pub mod contour;
pub mod edges;
pub mod engine;
pub mod shape;
pub mod types;

pub use engine::{decode_image, read_image_file, LeafGate};
pub use types::{
    ColorAnalysis, EdgeAnalysis, GateDiagnostics, GateVerdict, ScreeningReport, ShapeAnalysis,
};

use image::{GrayImage, RgbImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    /// Input could not be read as a raster image. At the gate boundary this
    /// is a distinct outcome; service callers collapse it into a rejection.
    #[error("Failed to read image: {0}")]
    Decode(String),

    /// An analyzer hit a degenerate input mid-pipeline. Absorbed by the
    /// decision engine into a rejecting verdict.
    #[error("{0}")]
    Analysis(String),
}

/// Grayscale with the BT.601 weights (0.299 R, 0.587 G, 0.114 B) the gate
/// thresholds were calibrated against. The `image` crate's own luma
/// conversion uses BT.709, which shifts green-heavy pixels enough to move
/// borderline contours.
pub fn rgb_to_luma(rgb: &RgbImage) -> GrayImage {
    let (width, height) = rgb.dimensions();
    let mut gray = GrayImage::new(width, height);
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma =
            (0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)).round() as u8;
        gray.put_pixel(x, y, image::Luma([luma]));
    }
    gray
}

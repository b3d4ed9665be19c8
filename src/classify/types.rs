use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::catalog::ClassCatalog;
use super::ClassifyError;

/// Abstraction over the disease classifier so orchestration code can be
/// exercised without the model service running.
pub trait LeafClassifier: Send + Sync {
    /// Classify a decoded image. Called only for images the gate admitted.
    fn classify(&self, image: &RgbImage) -> Result<Classification, ClassifyError>;
}

/// One classifier verdict: the winning label, its confidence as a
/// percentage, and the full per-class probability distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,

    /// Percent scale, 0 to 100.
    pub confidence: f64,

    /// Per-class probabilities on the 0 to 1 scale, indexed by catalog order.
    pub distribution: Vec<f64>,
}

/// One row of a descending top-k summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPrediction {
    pub label: String,
    pub probability: f64,
}

impl Classification {
    /// The `k` most probable classes in descending order, labels resolved
    /// through the catalog. Distribution entries with no catalog label are
    /// dropped rather than invented, so the summary never exceeds the
    /// catalog size.
    pub fn top_k(&self, catalog: &ClassCatalog, k: usize) -> Vec<RankedPrediction> {
        let mut indexed: Vec<(usize, f64)> = self.distribution.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed
            .into_iter()
            .filter_map(|(index, probability)| {
                catalog.label(index).map(|label| RankedPrediction {
                    label: label.to_string(),
                    probability,
                })
            })
            .take(k)
            .collect()
    }
}

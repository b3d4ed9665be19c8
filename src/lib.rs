//! Leafgate screens plant photos before disease classification runs.
//!
//! The core is a three-analyzer heuristic gate: color segmentation in HSV
//! green bands, contour shape filtering, and Canny edge density, combined
//! by a 2-of-3 majority vote with `confidence = votes / 3`. Admitted
//! images flow to a remote classifier; rejected ones return a diagnostic
//! report without spending model time. A separate query path answers
//! plant-health questions through a retrieval-augmented chat service.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use leafgate::{ChatAdvisor, ClassCatalog, DiagnosisPipeline, HttpClassifier, LeafGate};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = DiagnosisPipeline::new(
//!     LeafGate::default(),
//!     ClassCatalog::load(Path::new("assets/classes.json"))?,
//!     HttpClassifier::new("http://localhost:8600", 60),
//!     ChatAdvisor::new("https://api.example.com/v1", "api-key", "gpt-4o-mini", 30),
//! );
//!
//! let report = pipeline.diagnose_path(Path::new("upload.jpg"))?;
//! println!("{}", serde_json::to_string(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod advisory;
pub mod classify;
pub mod config;
pub mod diagnosis;
pub mod gate;

pub use advisory::{AdvisoryError, AnswerService, ChatAdvisor, MockAdvisor};
pub use classify::{
    ClassCatalog, Classification, ClassifyError, HttpClassifier, LeafClassifier, MockClassifier,
    RankedPrediction,
};
pub use config::{ConfigError, GateConfig};
pub use diagnosis::{
    DiagnosisError, DiagnosisPipeline, DiagnosisReport, DiseaseReport, RejectionReport,
    REJECTION_MESSAGE,
};
pub use gate::{
    decode_image, read_image_file, ColorAnalysis, EdgeAnalysis, GateDiagnostics, GateError,
    GateVerdict, LeafGate, ScreeningReport, ShapeAnalysis,
};

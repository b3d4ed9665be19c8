//! Request-level composition: gate first, classifier only on admit.
//!
//! `DiagnosisPipeline` owns the leaf gate, the class catalog, and handles
//! to the two collaborators. It produces the JSON report shapes a service
//! boundary returns verbatim. Bad uploads (undecodable bytes, unreadable
//! paths, gate rejections) are all **rejected reports**, never errors;
//! the error surface is reserved for collaborator faults.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::advisory::{AdvisoryError, AnswerService};
use crate::classify::{ClassCatalog, ClassifyError, LeafClassifier};
use crate::gate::{decode_image, read_image_file, LeafGate};

/// User-facing rejection text, part of the service contract.
pub const REJECTION_MESSAGE: &str = "The uploaded image does not appear to be a plant leaf. \
Please upload a clear image of a plant leaf for disease detection.";

/// How many ranked classes an admitted report carries.
const TOP_K: usize = 5;

#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error("Classification failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Advisory failed: {0}")]
    Advisory(#[from] AdvisoryError),
}

// ═══════════════════════════════════════════════════════════
// Report shapes
// ═══════════════════════════════════════════════════════════

/// Admitted report: classification results plus the gate diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseReport {
    pub prediction: String,

    /// Percent scale, 0 to 100, as reported by the classifier.
    pub confidence: f64,

    /// Top-ranked class labels, descending. Parallel to `top_probabilities`.
    pub top_classes: Vec<String>,

    /// Raw 0 to 1 probabilities, descending. Parallel to `top_classes`.
    pub top_probabilities: Vec<f64>,

    pub is_leaf: bool,
    pub detection_message: String,
}

/// Rejected report: the fixed user-facing error plus the gate diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionReport {
    pub error: String,
    pub is_leaf: bool,
    pub detection_message: String,
}

/// Service-boundary output of one diagnosis request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiagnosisReport {
    Admitted(DiseaseReport),
    Rejected(RejectionReport),
}

impl DiagnosisReport {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }
}

// ═══════════════════════════════════════════════════════════
// Pipeline
// ═══════════════════════════════════════════════════════════

/// End-to-end diagnosis: decode, gate, classify, summarize.
pub struct DiagnosisPipeline<C, A> {
    gate: LeafGate,
    catalog: ClassCatalog,
    classifier: C,
    advisor: A,
}

impl<C: LeafClassifier, A: AnswerService> DiagnosisPipeline<C, A> {
    pub fn new(gate: LeafGate, catalog: ClassCatalog, classifier: C, advisor: A) -> Self {
        Self {
            gate,
            catalog,
            classifier,
            advisor,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn advisor(&self) -> &A {
        &self.advisor
    }

    /// Diagnose raster bytes. Undecodable input collapses into a rejected
    /// report carrying the failure reason; only collaborator failures
    /// surface as errors.
    pub fn diagnose_bytes(&self, bytes: &[u8]) -> Result<DiagnosisReport, DiagnosisError> {
        let image = match decode_image(bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!(%e, "undecodable upload rejected");
                return Ok(rejected(format!("Error in leaf detection: {e}")));
            }
        };

        let verdict = self.gate.evaluate(&image);
        if !verdict.is_leaf {
            info!(
                confidence = verdict.confidence,
                "image rejected by leaf gate"
            );
            return Ok(rejected(verdict.detection_message()));
        }

        let classification = self.classifier.classify(&image)?;
        let (top_classes, top_probabilities) = classification
            .top_k(&self.catalog, TOP_K)
            .into_iter()
            .map(|ranked| (ranked.label, ranked.probability))
            .unzip();

        info!(
            prediction = %classification.label,
            confidence = classification.confidence,
            "diagnosis complete"
        );
        Ok(DiagnosisReport::Admitted(DiseaseReport {
            prediction: classification.label,
            confidence: classification.confidence,
            top_classes,
            top_probabilities,
            is_leaf: true,
            detection_message: verdict.detection_message(),
        }))
    }

    /// Diagnose the image file at `path`. An unreadable or oversized file
    /// is a rejected report, same as undecodable bytes; the size ceiling is
    /// checked against file metadata before the file is read.
    pub fn diagnose_path(&self, path: &Path) -> Result<DiagnosisReport, DiagnosisError> {
        let bytes = match read_image_file(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%e, "unreadable upload rejected");
                return Ok(rejected(format!("Error in leaf detection: {e}")));
            }
        };
        self.diagnose_bytes(&bytes)
    }

    /// Answer a plant-health question. Empty and whitespace-only queries
    /// are rejected before the answer service is touched.
    pub fn ask(&self, query: &str) -> Result<String, DiagnosisError> {
        if query.trim().is_empty() {
            return Err(AdvisoryError::EmptyQuery.into());
        }
        Ok(self.advisor.answer(query)?)
    }
}

fn rejected(detection_message: String) -> DiagnosisReport {
    DiagnosisReport::Rejected(RejectionReport {
        error: REJECTION_MESSAGE.to_string(),
        is_leaf: false,
        detection_message,
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point;

    use crate::advisory::MockAdvisor;
    use crate::classify::{Classification, MockClassifier};

    /// Jagged green blob on white, tuned to pass all three gate votes.
    fn leaf_png() -> Vec<u8> {
        let mut img = RgbImage::from_pixel(160, 160, Rgb([255, 255, 255]));
        let vertices: Vec<Point<i32>> = (0..28)
            .map(|i| {
                let angle = 2.0 * std::f64::consts::PI * f64::from(i) / 28.0;
                let r = if i % 2 == 0 { 55.0 } else { 45.0 };
                Point::new(
                    (80.0 + r * angle.cos()).round() as i32,
                    (80.0 + r * angle.sin()).round() as i32,
                )
            })
            .collect();
        draw_polygon_mut(&mut img, &vertices, Rgb([60, 160, 70]));
        png_bytes(&img)
    }

    /// All-black frame: fails every gate vote.
    fn non_leaf_png() -> Vec<u8> {
        png_bytes(&RgbImage::from_pixel(160, 160, Rgb([0, 0, 0])))
    }

    fn png_bytes(img: &RgbImage) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        cursor.into_inner()
    }

    fn catalog() -> ClassCatalog {
        ClassCatalog::from_labels(vec![
            "Apple___Apple_scab".into(),
            "Apple___healthy".into(),
            "Tomato___Late_blight".into(),
            "Tomato___Septoria_leaf_spot".into(),
            "Tomato___healthy".into(),
            "Potato___Early_blight".into(),
        ])
        .unwrap()
    }

    fn classification() -> Classification {
        Classification {
            label: "Tomato___Late_blight".into(),
            confidence: 91.4,
            distribution: vec![0.010, 0.020, 0.914, 0.030, 0.016, 0.010],
        }
    }

    fn pipeline(
        classifier: MockClassifier,
        advisor: MockAdvisor,
    ) -> DiagnosisPipeline<MockClassifier, MockAdvisor> {
        DiagnosisPipeline::new(LeafGate::default(), catalog(), classifier, advisor)
    }

    // ── image path ──

    #[test]
    fn rejected_image_never_reaches_the_classifier() {
        let pipeline = pipeline(
            MockClassifier::returning(classification()),
            MockAdvisor::replying("unused"),
        );
        let report = pipeline.diagnose_bytes(&non_leaf_png()).unwrap();

        assert!(!report.is_admitted());
        assert_eq!(pipeline.classifier().calls(), 0);
        match report {
            DiagnosisReport::Rejected(rejection) => {
                assert_eq!(rejection.error, REJECTION_MESSAGE);
                assert!(!rejection.is_leaf);
                assert!(rejection
                    .detection_message
                    .starts_with("Leaf detection confidence: 0.00"));
            }
            DiagnosisReport::Admitted(_) => panic!("black frame must be rejected"),
        }
    }

    #[test]
    fn admitted_image_is_classified_once() {
        let pipeline = pipeline(
            MockClassifier::returning(classification()),
            MockAdvisor::replying("unused"),
        );
        let report = pipeline.diagnose_bytes(&leaf_png()).unwrap();

        assert_eq!(pipeline.classifier().calls(), 1);
        match report {
            DiagnosisReport::Admitted(disease) => {
                assert_eq!(disease.prediction, "Tomato___Late_blight");
                assert_eq!(disease.confidence, 91.4);
                assert!(disease.is_leaf);
                assert!(disease
                    .detection_message
                    .starts_with("Leaf detection confidence:"));
            }
            DiagnosisReport::Rejected(rejection) => {
                panic!("leaf fixture was rejected: {}", rejection.detection_message)
            }
        }
    }

    #[test]
    fn admitted_report_ranks_the_top_five_classes() {
        let pipeline = pipeline(
            MockClassifier::returning(classification()),
            MockAdvisor::replying("unused"),
        );
        let report = pipeline.diagnose_bytes(&leaf_png()).unwrap();

        let DiagnosisReport::Admitted(disease) = report else {
            panic!("expected an admitted report");
        };
        assert_eq!(disease.top_classes.len(), 5);
        assert_eq!(disease.top_probabilities.len(), 5);
        assert_eq!(disease.top_classes[0], "Tomato___Late_blight");
        assert_eq!(disease.top_probabilities[0], 0.914);
        for pair in disease.top_probabilities.windows(2) {
            assert!(pair[0] >= pair[1], "probabilities not descending: {pair:?}");
        }
    }

    #[test]
    fn classifier_failure_is_a_fault_not_a_rejection() {
        let pipeline = pipeline(
            MockClassifier::failing("model service down"),
            MockAdvisor::replying("unused"),
        );
        let err = pipeline.diagnose_bytes(&leaf_png()).unwrap_err();
        assert!(matches!(err, DiagnosisError::Classify(_)));
    }

    #[test]
    fn undecodable_bytes_collapse_to_rejection() {
        let pipeline = pipeline(
            MockClassifier::returning(classification()),
            MockAdvisor::replying("unused"),
        );
        let report = pipeline.diagnose_bytes(&[0xAB; 256]).unwrap();

        assert_eq!(pipeline.classifier().calls(), 0);
        let DiagnosisReport::Rejected(rejection) = report else {
            panic!("expected a rejected report");
        };
        assert!(rejection
            .detection_message
            .starts_with("Error in leaf detection:"));
        assert!(rejection.detection_message.contains("Failed to read image"));
    }

    #[test]
    fn unreadable_path_collapses_to_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(
            MockClassifier::returning(classification()),
            MockAdvisor::replying("unused"),
        );
        let report = pipeline
            .diagnose_path(&dir.path().join("missing.jpg"))
            .unwrap();

        let DiagnosisReport::Rejected(rejection) = report else {
            panic!("expected a rejected report");
        };
        assert!(rejection
            .detection_message
            .starts_with("Error in leaf detection:"));
    }

    #[test]
    fn oversized_file_collapses_to_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(50 * 1024 * 1024 + 1).unwrap();

        let pipeline = pipeline(
            MockClassifier::returning(classification()),
            MockAdvisor::replying("unused"),
        );
        let report = pipeline.diagnose_path(&path).unwrap();

        assert_eq!(pipeline.classifier().calls(), 0);
        let DiagnosisReport::Rejected(rejection) = report else {
            panic!("expected a rejected report");
        };
        assert!(rejection.detection_message.contains("50MB"));
    }

    #[test]
    fn readable_path_diagnoses_like_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::write(&path, leaf_png()).unwrap();

        let pipeline = pipeline(
            MockClassifier::returning(classification()),
            MockAdvisor::replying("unused"),
        );
        let report = pipeline.diagnose_path(&path).unwrap();
        assert!(report.is_admitted());
    }

    // ── query path ──

    #[test]
    fn empty_query_never_reaches_the_answer_service() {
        let pipeline = pipeline(
            MockClassifier::returning(classification()),
            MockAdvisor::replying("unused"),
        );
        for query in ["", "   ", "\n\t"] {
            let err = pipeline.ask(query).unwrap_err();
            assert!(
                matches!(err, DiagnosisError::Advisory(AdvisoryError::EmptyQuery)),
                "query {query:?} produced {err:?}"
            );
        }
        assert_eq!(pipeline.advisor().calls(), 0);
    }

    #[test]
    fn ask_delegates_to_the_answer_service() {
        let pipeline = pipeline(
            MockClassifier::returning(classification()),
            MockAdvisor::replying("Remove infected foliage and rotate crops."),
        );
        let reply = pipeline.ask("how do I treat late blight?").unwrap();
        assert_eq!(reply, "Remove infected foliage and rotate crops.");
        assert_eq!(pipeline.advisor().calls(), 1);
    }

    #[test]
    fn advisor_failure_surfaces_as_advisory_error() {
        let pipeline = pipeline(
            MockClassifier::returning(classification()),
            MockAdvisor::failing("answer service down"),
        );
        let err = pipeline.ask("is my basil salvageable?").unwrap_err();
        assert!(matches!(err, DiagnosisError::Advisory(_)));
    }

    // ── wire shapes ──

    #[test]
    fn admitted_report_serializes_the_contract_fields() {
        let report = DiagnosisReport::Admitted(DiseaseReport {
            prediction: "Tomato___Late_blight".into(),
            confidence: 91.4,
            top_classes: vec!["Tomato___Late_blight".into()],
            top_probabilities: vec![0.914],
            is_leaf: true,
            detection_message: "Leaf detection confidence: 1.00. Green percentage: 0.31, Leaf contour ratio: 1.00".into(),
        });
        let value = serde_json::to_value(&report).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 6);
        for key in [
            "prediction",
            "confidence",
            "top_classes",
            "top_probabilities",
            "is_leaf",
            "detection_message",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(value["is_leaf"], true);
    }

    #[test]
    fn rejected_report_serializes_the_contract_fields() {
        let report = rejected("Leaf detection confidence: 0.33. Green percentage: 0.02, Leaf contour ratio: 0.70".to_string());
        let value = serde_json::to_value(&report).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(value["error"], REJECTION_MESSAGE);
        assert_eq!(value["is_leaf"], false);
        assert!(object.contains_key("detection_message"));
    }
}

//! Verdict and per-analyzer result types.
//!
//! Each analyzer reduces the image to the same shape: one statistic in
//! [0, 1] plus the boolean vote derived from it. The verdict combines the
//! three votes and keeps the statistics around as diagnostics, because the
//! user-facing rejection message quotes them.

use serde::Serialize;

// ═══════════════════════════════════════════════════════════
// Analyzer results
// ═══════════════════════════════════════════════════════════

/// Color segmentation result: how green the image is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorAnalysis {
    /// Fraction of pixels inside the green hue bands, in [0, 1].
    pub green_fraction: f64,
    pub vote: bool,
}

/// Contour-shape result: how much significant contour area looks like a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapeAnalysis {
    /// Leaf-like share of surviving contour area, in [0, 1]. Zero when no
    /// contour survives the noise filter.
    pub leaf_contour_ratio: f64,
    pub vote: bool,
}

/// Edge texture result: how busy the image is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeAnalysis {
    /// Fraction of edge pixels, in [0, 1].
    pub edge_density: f64,
    pub vote: bool,
}

// ═══════════════════════════════════════════════════════════
// Verdict
// ═══════════════════════════════════════════════════════════

/// The three statistics behind a verdict, plus the failure reason when the
/// analysis could not complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateDiagnostics {
    pub green_fraction: f64,
    pub leaf_contour_ratio: f64,
    pub edge_density: f64,
    pub color_vote: bool,
    pub shape_vote: bool,
    pub edge_vote: bool,
    /// Set when an analyzer failed and the image was rejected without a
    /// completed vote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// The gate's answer for one image. Immutable, produced once per evaluation,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateVerdict {
    pub is_leaf: bool,
    /// Votes in favor over total votes: one of 0, 1/3, 2/3, 1.
    pub confidence: f64,
    pub diagnostics: GateDiagnostics,
}

impl GateVerdict {
    /// Combine the three analyzer results into the majority-vote verdict.
    /// At least two of three votes admit the image; no single analyzer is
    /// authoritative in either direction.
    pub fn from_analyses(color: ColorAnalysis, shape: ShapeAnalysis, edges: EdgeAnalysis) -> Self {
        let votes_true = [color.vote, shape.vote, edges.vote]
            .into_iter()
            .filter(|v| *v)
            .count();
        Self {
            is_leaf: votes_true >= 2,
            confidence: votes_true as f64 / 3.0,
            diagnostics: GateDiagnostics {
                green_fraction: color.green_fraction,
                leaf_contour_ratio: shape.leaf_contour_ratio,
                edge_density: edges.edge_density,
                color_vote: color.vote,
                shape_vote: shape.vote,
                edge_vote: edges.vote,
                failure: None,
            },
        }
    }

    /// Rejecting verdict for an image whose analysis could not complete.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            is_leaf: false,
            confidence: 0.0,
            diagnostics: GateDiagnostics {
                green_fraction: 0.0,
                leaf_contour_ratio: 0.0,
                edge_density: 0.0,
                color_vote: false,
                shape_vote: false,
                edge_vote: false,
                failure: Some(reason.into()),
            },
        }
    }

    /// The user-facing diagnostics line. The format (statistic names, two
    /// decimals) is a stable contract; callers embed it verbatim in
    /// responses.
    pub fn detection_message(&self) -> String {
        match &self.diagnostics.failure {
            Some(reason) => format!("Error in leaf detection: {reason}"),
            None => format!(
                "Leaf detection confidence: {:.2}. Green percentage: {:.2}, Leaf contour ratio: {:.2}",
                self.confidence,
                self.diagnostics.green_fraction,
                self.diagnostics.leaf_contour_ratio
            ),
        }
    }
}

/// Service-boundary form of a verdict: the admit flag plus the diagnostics
/// line, nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningReport {
    pub is_leaf: bool,
    pub detection_message: String,
}

impl From<&GateVerdict> for ScreeningReport {
    fn from(verdict: &GateVerdict) -> Self {
        Self {
            is_leaf: verdict.is_leaf,
            detection_message: verdict.detection_message(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict_for(color: bool, shape: bool, edge: bool) -> GateVerdict {
        GateVerdict::from_analyses(
            ColorAnalysis {
                green_fraction: 0.5,
                vote: color,
            },
            ShapeAnalysis {
                leaf_contour_ratio: 0.5,
                vote: shape,
            },
            EdgeAnalysis {
                edge_density: 0.1,
                vote: edge,
            },
        )
    }

    #[test]
    fn majority_vote_over_all_eight_combinations() {
        for color in [false, true] {
            for shape in [false, true] {
                for edge in [false, true] {
                    let votes = [color, shape, edge].iter().filter(|v| **v).count();
                    let verdict = verdict_for(color, shape, edge);
                    assert_eq!(
                        verdict.is_leaf,
                        votes >= 2,
                        "votes ({color}, {shape}, {edge}) decided {}",
                        verdict.is_leaf
                    );
                    let expected_confidence = votes as f64 / 3.0;
                    assert!(
                        (verdict.confidence - expected_confidence).abs() < 1e-12,
                        "confidence for {votes} votes was {}",
                        verdict.confidence
                    );
                }
            }
        }
    }

    #[test]
    fn confidence_takes_only_third_step_values() {
        let allowed = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0];
        for color in [false, true] {
            for shape in [false, true] {
                for edge in [false, true] {
                    let confidence = verdict_for(color, shape, edge).confidence;
                    assert!(
                        allowed.iter().any(|a| (a - confidence).abs() < 1e-12),
                        "unexpected confidence {confidence}"
                    );
                }
            }
        }
    }

    #[test]
    fn no_single_analyzer_is_authoritative() {
        // One vote in favor never admits; one vote against never rejects.
        assert!(!verdict_for(true, false, false).is_leaf);
        assert!(!verdict_for(false, true, false).is_leaf);
        assert!(!verdict_for(false, false, true).is_leaf);
        assert!(verdict_for(false, true, true).is_leaf);
        assert!(verdict_for(true, false, true).is_leaf);
        assert!(verdict_for(true, true, false).is_leaf);
    }

    #[test]
    fn detection_message_reports_two_decimal_statistics() {
        let verdict = GateVerdict::from_analyses(
            ColorAnalysis {
                green_fraction: 0.5,
                vote: true,
            },
            ShapeAnalysis {
                leaf_contour_ratio: 0.25,
                vote: false,
            },
            EdgeAnalysis {
                edge_density: 0.02,
                vote: true,
            },
        );
        assert_eq!(
            verdict.detection_message(),
            "Leaf detection confidence: 0.67. Green percentage: 0.50, Leaf contour ratio: 0.25"
        );
    }

    #[test]
    fn failed_verdict_rejects_with_reason() {
        let verdict = GateVerdict::failed("image has no pixels");
        assert!(!verdict.is_leaf);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(
            verdict.detection_message(),
            "Error in leaf detection: image has no pixels"
        );
    }

    #[test]
    fn screening_report_carries_wire_fields() {
        let verdict = verdict_for(true, true, true);
        let report = ScreeningReport::from(&verdict);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["is_leaf"], true);
        assert!(json["detection_message"]
            .as_str()
            .unwrap()
            .starts_with("Leaf detection confidence: 1.00."));
        assert_eq!(json.as_object().unwrap().len(), 2);
    }

    #[test]
    fn completed_verdict_serializes_without_failure_field() {
        let json = serde_json::to_value(verdict_for(true, false, true)).unwrap();
        assert!(json["diagnostics"].get("failure").is_none());
        assert_eq!(json["diagnostics"]["green_fraction"], 0.5);
    }
}

//! Disease classification collaborators.
//!
//! The classifier itself is a black box behind [`LeafClassifier`]: the
//! production adapter posts the admitted image to a remote model service,
//! the mock returns canned verdicts so orchestration tests can run without
//! a network. The class catalog maps distribution indexes back to label
//! strings and is loaded once, fail-fast, at startup.

pub mod catalog;
pub mod remote;
pub mod types;

pub use catalog::*;
pub use remote::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Failed to read class catalog at {path}: {source}")]
    CatalogRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed class catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("Class catalog contains no labels")]
    CatalogEmpty,

    #[error("Classifier is not reachable at {0}")]
    Unreachable(String),

    #[error("Classifier request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Classifier returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Classifier returned an empty probability distribution")]
    EmptyDistribution,

    #[error("Failed to encode image for transport: {0}")]
    ImageEncoding(String),
}

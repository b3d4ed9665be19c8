//! Agronomy question answering.
//!
//! Queries travel a path of their own: they never touch the leaf gate or
//! the classifier. The retrieval-augmented service that actually produces
//! answers sits behind [`AnswerService`]; the crate ships a chat-completions
//! adapter and a mock.

pub mod chat;

pub use chat::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("No query provided")]
    EmptyQuery,

    #[error("Answer service is not reachable at {0}")]
    Unreachable(String),

    #[error("Answer request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Answer service returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Answer service returned an empty reply")]
    EmptyReply,
}

/// Abstraction over the retrieval-augmented answer service.
pub trait AnswerService: Send + Sync {
    /// Answer a free-form plant-health question. The query is expected to
    /// be non-empty; emptiness is screened before this call.
    fn answer(&self, query: &str) -> Result<String, AdvisoryError>;
}

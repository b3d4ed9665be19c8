use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AdvisoryError, AnswerService};

/// System preamble pinning the assistant to plant-health topics.
const SYSTEM_PREAMBLE: &str = "You are an agricultural assistant specializing in plant diseases. \
Answer questions about plant health, disease symptoms, prevention and treatment concisely and \
factually. If a question falls outside plant care, say that it is out of scope.";

/// Chat-completions adapter for the retrieval-augmented answer service.
pub struct ChatAdvisor {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl ChatAdvisor {
    /// Create an advisor for an OpenAI-style chat-completions endpoint.
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }
}

/// Request body for POST /chat/completions
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from POST /chat/completions
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

/// Pull the reply text out of a parsed completion. Missing choices and
/// whitespace-only content both count as an empty reply.
fn extract_reply(response: ChatResponse) -> Result<String, AdvisoryError> {
    let reply = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .unwrap_or_default();
    if reply.trim().is_empty() {
        return Err(AdvisoryError::EmptyReply);
    }
    Ok(reply)
}

impl AnswerService for ChatAdvisor {
    fn answer(&self, query: &str) -> Result<String, AdvisoryError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PREAMBLE,
                },
                ChatMessage {
                    role: "user",
                    content: query,
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    AdvisoryError::Unreachable(self.base_url.clone())
                } else if e.is_timeout() {
                    AdvisoryError::Timeout(self.timeout_secs)
                } else {
                    AdvisoryError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AdvisoryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| AdvisoryError::ResponseParsing(e.to_string()))?;
        let reply = extract_reply(parsed)?;

        info!(reply_chars = reply.len(), "answer received");
        Ok(reply)
    }
}

/// Mock answer service. Canned reply or configured failure, with an
/// invocation counter.
pub struct MockAdvisor {
    outcome: MockOutcome,
    calls: AtomicUsize,
}

enum MockOutcome {
    Reply(String),
    Failing(String),
}

impl MockAdvisor {
    pub fn replying(reply: &str) -> Self {
        Self {
            outcome: MockOutcome::Reply(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: MockOutcome::Failing(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `answer` has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AnswerService for MockAdvisor {
    fn answer(&self, _query: &str) -> Result<String, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            MockOutcome::Reply(reply) => Ok(reply.clone()),
            MockOutcome::Failing(message) => Err(AdvisoryError::HttpClient(message.clone())),
        }
    }
}

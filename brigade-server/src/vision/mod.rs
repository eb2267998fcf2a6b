//! Vision providers for AI photo review
//!
//! Each provider is a [`VisionProvider`]; [`VisionChain`] tries them in
//! priority order and returns the first verdict.

pub mod chain;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod parse;
pub mod review;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use chain::{ChainOutcome, VisionChain};
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Photo to analyze plus what it should show
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub image: Vec<u8>,
    pub mime: String,
    /// Task title, SOP steps and any extra check prompt
    pub instructions: String,
}

impl VisionRequest {
    pub fn image_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.image)
    }

    /// Full prompt sent to every provider
    pub fn prompt(&self) -> String {
        format!(
            "You are reviewing a photo submitted by restaurant staff as proof that a task was completed.\n\n\
             {}\n\n\
             Decide whether the photo shows the task completed to standard. \
             Respond with strict JSON only, no prose: \
             {{\"approved\": true|false, \"score\": <integer 0-100>, \"feedback\": \"<one or two sentences>\"}}",
            self.instructions.trim()
        )
    }
}

/// Parsed provider answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionVerdict {
    pub approved: bool,
    /// 0..=100
    pub score: i32,
    pub feedback: String,
}

/// A provider that failed inside the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

impl From<ProviderFailure> for shared::models::ProviderAttempt {
    fn from(f: ProviderFailure) -> Self {
        Self {
            provider: f.provider,
            error: f.error,
        }
    }
}

fn join_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unusable response: {0}")]
    BadResponse(String),
    #[error("timed out after {0}s")]
    Timeout(u64),
    #[error("no vision providers configured")]
    NoProviders,
    #[error("all vision providers failed: {}", join_failures(.0))]
    AllFailed(Vec<ProviderFailure>),
}

impl From<reqwest::Error> for VisionError {
    fn from(e: reqwest::Error) -> Self {
        VisionError::Http(e.to_string())
    }
}

const MAX_ERROR_BODY_CHARS: usize = 500;

/// First `max` characters of a provider error body
fn clip_error_body(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}

/// Status check shared by the HTTP providers
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, VisionError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(VisionError::Status {
        status: status.as_u16(),
        body: clip_error_body(&body, MAX_ERROR_BODY_CHARS),
    })
}

#[async_trait]
pub trait VisionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    async fn analyze(&self, request: &VisionRequest) -> Result<VisionVerdict, VisionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_instructions_and_schema() {
        let req = VisionRequest {
            image: vec![1, 2, 3],
            mime: "image/jpeg".into(),
            instructions: "Task: Clean the grill".into(),
        };
        let prompt = req.prompt();
        assert!(prompt.contains("Task: Clean the grill"));
        assert!(prompt.contains("\"approved\""));
        assert!(prompt.contains("\"score\""));
        assert_eq!(req.image_base64(), "AQID");
    }

    #[test]
    fn all_failed_lists_every_provider() {
        let err = VisionError::AllFailed(vec![
            ProviderFailure {
                provider: "openai".into(),
                error: "timed out after 30s".into(),
            },
            ProviderFailure {
                provider: "ollama".into(),
                error: "request failed: connection refused".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("openai: timed out after 30s"));
        assert!(msg.contains("ollama: request failed"));
    }

    #[test]
    fn error_body_clipped_on_char_boundary() {
        let body = "x".repeat(499) + "€ quota exceeded";
        let clipped = clip_error_body(&body, MAX_ERROR_BODY_CHARS);
        assert_eq!(clipped.chars().count(), 500);
        assert!(clipped.ends_with('€'));

        assert_eq!(clip_error_body("Kontingent überschritten", 10), "Kontingent");
        assert_eq!(clip_error_body("short", MAX_ERROR_BODY_CHARS), "short");
    }
}

//! Google Gemini `generateContent` with `inline_data`

use async_trait::async_trait;
use serde_json::{Value, json};

use super::parse::parse_verdict;
use super::{VisionError, VisionProvider, VisionRequest, VisionVerdict, check_status};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    pub model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(model: String, api_key: String, client: reqwest::Client) -> Self {
        Self {
            model,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    fn build_body(request: &VisionRequest) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "text": request.prompt() },
                    { "inline_data": { "mime_type": request.mime, "data": request.image_base64() } }
                ]
            }],
            "generationConfig": {
                "temperature": 0.0,
                "responseMimeType": "application/json"
            }
        })
    }
}

/// Concatenated text parts of the first candidate
fn extract_text(json: &Value) -> Result<String, VisionError> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| VisionError::BadResponse("Gemini response missing candidates".into()))?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(VisionError::BadResponse("Gemini response has no text".into()));
    }
    Ok(text)
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, request: &VisionRequest) -> Result<VisionVerdict, VisionError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_body(request))
            .send()
            .await?;

        let json: Value = check_status(resp).await?.json().await?;
        parse_verdict(&extract_text(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_inline_data() {
        let body = GeminiProvider::build_body(&VisionRequest {
            image: vec![1, 2, 3],
            mime: "image/jpeg".into(),
            instructions: "Task: Stock fridge".into(),
        });
        assert_eq!(body.pointer("/contents/0/parts/1/inline_data/data").unwrap(), "AQID");
        assert_eq!(
            body.pointer("/contents/0/parts/1/inline_data/mime_type").unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn joins_text_parts() {
        let json = json!({"candidates": [{"content": {"parts": [
            {"text": "{\"approved\":true,"},
            {"text": "\"score\":81}"}
        ]}}]});
        let text = extract_text(&json).unwrap();
        assert_eq!(parse_verdict(&text).unwrap().score, 81);
    }

    #[test]
    fn blocked_reply_is_bad_response() {
        let json = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert!(matches!(extract_text(&json), Err(VisionError::BadResponse(_))));
    }
}

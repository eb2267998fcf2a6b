//! Local Ollama `/api/generate` with base64 `images`

use async_trait::async_trait;
use serde_json::{Value, json};

use super::parse::parse_verdict;
use super::{VisionError, VisionProvider, VisionRequest, VisionVerdict, check_status};

pub struct OllamaProvider {
    pub model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(model: String, base_url: &str, client: reqwest::Client) -> Self {
        Self {
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn build_body(&self, request: &VisionRequest) -> Value {
        json!({
            "model": self.model,
            "prompt": request.prompt(),
            "images": [request.image_base64()],
            "format": "json",
            "stream": false,
            "options": { "temperature": 0.0 }
        })
    }
}

#[async_trait]
impl VisionProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, request: &VisionRequest) -> Result<VisionVerdict, VisionError> {
        let url = format!("{}/api/generate", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&self.build_body(request))
            .send()
            .await?;

        let json: Value = check_status(resp).await?.json().await?;
        let text = json
            .get("response")
            .and_then(Value::as_str)
            .ok_or_else(|| VisionError::BadResponse("Ollama response missing text".into()))?;
        parse_verdict(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_requests_json_without_streaming() {
        let provider = OllamaProvider::new("llava".into(), "http://localhost:11434/", reqwest::Client::new());
        assert_eq!(provider.base_url, "http://localhost:11434");
        let body = provider.build_body(&VisionRequest {
            image: vec![1, 2, 3],
            mime: "image/jpeg".into(),
            instructions: "Task: Label containers".into(),
        });
        assert_eq!(body["format"], "json");
        assert_eq!(body["stream"], false);
        assert_eq!(body["images"][0], "AQID");
    }
}

//! OpenAI chat completions with an inline `image_url` data URL

use async_trait::async_trait;
use serde_json::{Value, json};

use super::parse::parse_verdict;
use super::{VisionError, VisionProvider, VisionRequest, VisionVerdict, check_status};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    pub model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(model: String, api_key: String, client: reqwest::Client) -> Self {
        Self {
            model,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    fn build_body(&self, request: &VisionRequest) -> Value {
        let data_url = format!("data:{};base64,{}", request.mime, request.image_base64());
        json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": request.prompt() },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }],
            "temperature": 0.0,
            "max_tokens": 300,
            "response_format": { "type": "json_object" }
        })
    }
}

/// choices[0].message.content
fn extract_text(json: &Value) -> Result<&str, VisionError> {
    json.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| VisionError::BadResponse("OpenAI response missing content".into()))
}

#[async_trait]
impl VisionProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, request: &VisionRequest) -> Result<VisionVerdict, VisionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await?;

        let json: Value = check_status(resp).await?.json().await?;
        parse_verdict(extract_text(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> VisionRequest {
        VisionRequest {
            image: vec![0xFF, 0xD8],
            mime: "image/jpeg".into(),
            instructions: "Task: Mop floor".into(),
        }
    }

    #[test]
    fn body_carries_data_url() {
        let provider = OpenAiProvider::new("gpt-4o-mini".into(), "k".into(), reqwest::Client::new());
        let body = provider.build_body(&request());
        assert_eq!(body["model"], "gpt-4o-mini");
        let url = body
            .pointer("/messages/0/content/1/image_url/url")
            .and_then(Value::as_str)
            .unwrap();
        assert_eq!(url, "data:image/jpeg;base64,/9g=");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn extracts_message_content() {
        let json = json!({"choices": [{"message": {"content": "{\"approved\":true,\"score\":90}"}}]});
        assert_eq!(extract_text(&json).unwrap(), "{\"approved\":true,\"score\":90}");
        assert!(extract_text(&json!({"choices": []})).is_err());
    }
}

//! Firebase Cloud Messaging (legacy HTTP API)

use async_trait::async_trait;
use serde_json::json;

use super::{PushError, PushMessage, PushSender};

pub struct FcmPushSender {
    endpoint: String,
    server_key: String,
    client: reqwest::Client,
}

impl FcmPushSender {
    pub fn new(endpoint: String, server_key: String, client: reqwest::Client) -> Self {
        Self {
            endpoint,
            server_key,
            client,
        }
    }
}

fn build_payload(device_token: &str, message: &PushMessage) -> serde_json::Value {
    json!({
        "to": device_token,
        "notification": {
            "title": message.title,
            "body": message.body,
        },
        "data": message.data,
        "priority": "high",
    })
}

#[async_trait]
impl PushSender for FcmPushSender {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), PushError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&build_payload(device_token, message))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PushError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape() {
        let message = PushMessage::new("New task", "Clean the walk-in").with_data("task_id", 7);
        let payload = build_payload("tok", &message);
        assert_eq!(payload["to"], "tok");
        assert_eq!(payload["notification"]["title"], "New task");
        assert_eq!(payload["data"]["task_id"], "7");
    }
}

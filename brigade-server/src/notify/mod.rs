//! Push notifications to staff devices
//!
//! Sends are fire-and-forget: [`Notifier::send`] spawns the delivery and
//! only logs failures.

pub mod fcm;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

pub use fcm::FcmPushSender;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl PushMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: HashMap::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl ToString) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("push request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("push service returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), PushError>;
}

/// Used when no push credentials are configured
pub struct NoopPushSender;

#[async_trait]
impl PushSender for NoopPushSender {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), PushError> {
        tracing::debug!(
            token_suffix = %token_suffix(device_token),
            title = %message.title,
            "Push disabled, dropping notification"
        );
        Ok(())
    }
}

/// Last characters of a device token, for logs
fn token_suffix(token: &str) -> &str {
    let start = token.len().saturating_sub(6);
    token.get(start..).unwrap_or("")
}

/// Cloneable handle that dispatches pushes in the background
#[derive(Clone)]
pub struct Notifier {
    sender: Arc<dyn PushSender>,
}

impl Notifier {
    pub fn new(sender: Arc<dyn PushSender>) -> Self {
        Self { sender }
    }

    /// Deliver in a background task; no-op when the user has no device token
    pub fn send(&self, device_token: Option<String>, message: PushMessage) {
        let Some(token) = device_token.filter(|t| !t.is_empty()) else {
            return;
        };
        let sender = self.sender.clone();
        tokio::spawn(async move {
            if let Err(e) = sender.send(&token, &message).await {
                tracing::warn!(
                    token_suffix = %token_suffix(&token),
                    title = %message.title,
                    error = %e,
                    "Push notification failed"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    struct ChannelSender(mpsc::UnboundedSender<(String, PushMessage)>);

    #[async_trait]
    impl PushSender for ChannelSender {
        async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), PushError> {
            let _ = self.0.send((device_token.to_string(), message.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatches_in_background() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = Notifier::new(Arc::new(ChannelSender(tx)));
        notifier.send(
            Some("device-1".into()),
            PushMessage::new("Task approved", "Nice work").with_data("task_id", 42),
        );
        let (token, message) = rx.recv().await.unwrap();
        assert_eq!(token, "device-1");
        assert_eq!(message.data.get("task_id").map(String::as_str), Some("42"));
    }

    #[tokio::test]
    async fn skips_users_without_token() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let notifier = Notifier::new(Arc::new(ChannelSender(tx)));
        notifier.send(None, PushMessage::new("a", "b"));
        notifier.send(Some(String::new()), PushMessage::new("a", "b"));
        drop(notifier);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn noop_sender_succeeds() {
        assert!(NoopPushSender
            .send("abc", &PushMessage::new("t", "b"))
            .await
            .is_ok());
    }

    #[test]
    fn token_suffix_is_short() {
        assert_eq!(token_suffix("abcdefghij"), "efghij");
        assert_eq!(token_suffix("abc"), "abc");
    }
}

use std::future::Future;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

use crate::DEFAULT_NTFY_BASE;
use crate::error::NotifyError;
use crate::types::Notification;

/// Push-notification sink. Delivery is best-effort.
pub trait Notifier {
    fn send(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// JSON body accepted by an ntfy server's root endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NtfyMessage {
    pub topic: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
}

/// Publishes messages to a single ntfy topic.
#[derive(Debug, Clone)]
pub struct NtfyClient {
    topic: String,
    server_url: String,
    access_token: Option<String>,
    http: reqwest::Client,
}

impl NtfyClient {
    /// An empty `server_url` falls back to the public ntfy.sh instance.
    pub fn new(
        topic: &str,
        server_url: &str,
        access_token: &str,
        insecure_skip_verify: bool,
    ) -> Result<Self, NotifyError> {
        let server_url = match server_url.trim().trim_end_matches('/') {
            "" => DEFAULT_NTFY_BASE.to_string(),
            url => url.to_string(),
        };
        let access_token = (!access_token.is_empty()).then(|| access_token.to_string());
        Ok(Self {
            topic: topic.to_string(),
            server_url,
            access_token,
            http: crate::http_client(insecure_skip_verify)?,
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Build a message addressed to this client's topic.
    pub fn message(&self, notification: &Notification) -> NtfyMessage {
        NtfyMessage {
            topic: self.topic.clone(),
            message: notification.message.clone(),
            title: notification.title.clone(),
            tags: notification.tags.clone(),
            priority: Some(notification.priority.clamp(1, 5)),
        }
    }

    pub async fn send_message(&self, msg: &NtfyMessage) -> Result<(), NotifyError> {
        let mut msg = msg.clone();
        if msg.topic.is_empty() {
            msg.topic = self.topic.clone();
        }

        let mut req = self
            .http
            .post(&self.server_url)
            .header(CONTENT_TYPE, "application/json")
            .json(&msg);
        if let Some(token) = &self.access_token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

impl Notifier for NtfyClient {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.send_message(&self.message(notification)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use serde_json::json;

    fn sample() -> Notification {
        Notification {
            message: "hello".to_string(),
            title: "Title".to_string(),
            tags: vec!["warning".to_string()],
            priority: 4,
        }
    }

    #[test]
    fn empty_server_defaults_to_ntfy_sh() {
        let client = NtfyClient::new("t", "", "", false).unwrap();
        assert_eq!(client.server_url(), "https://ntfy.sh");
        let client = NtfyClient::new("t", "https://push.example.com/", "", false).unwrap();
        assert_eq!(client.server_url(), "https://push.example.com");
    }

    #[test]
    fn message_omits_empty_fields() {
        let msg = NtfyMessage {
            topic: "alerts".to_string(),
            message: "hi".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"topic": "alerts", "message": "hi"})
        );
    }

    #[test]
    fn message_from_notification() {
        let client = NtfyClient::new("alerts", "", "", false).unwrap();
        let msg = client.message(&sample());
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "topic": "alerts",
                "message": "hello",
                "title": "Title",
                "tags": ["warning"],
                "priority": 4
            })
        );
    }

    #[tokio::test]
    async fn send_posts_json_with_bearer() {
        let (base, server) = serve_once(200, "{}").await;
        let client = NtfyClient::new("alerts", &base, "tk_secret", false).unwrap();
        client.send(&sample()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST / "));
        assert!(request.to_lowercase().contains("authorization: bearer tk_secret"));
        assert!(request.contains(r#""topic":"alerts""#));
        assert!(request.contains(r#""priority":4"#));
    }

    #[tokio::test]
    async fn send_without_token_has_no_auth_header() {
        let (base, server) = serve_once(200, "{}").await;
        let client = NtfyClient::new("alerts", &base, "", false).unwrap();
        client.send(&sample()).await.unwrap();
        assert!(!server.await.unwrap().to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn send_non_2xx_is_rejected() {
        let (base, _server) = serve_once(401, "unauthorized").await;
        let client = NtfyClient::new("alerts", &base, "", false).unwrap();
        let err = client.send(&sample()).await.unwrap_err();
        match err {
            NotifyError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

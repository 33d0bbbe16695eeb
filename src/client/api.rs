use crate::dispatch::{SendRequest, SendResult, SEND_FAILED_ERROR};
use crate::server::SEND_ROUTE;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The server answered with a non-2xx status and a body that is not JSON
    #[error("Failed to send message. Please try again.")]
    UnreadableReply { status: u16 },

    /// The request never completed or the reply could not be read
    #[error("Failed to send message. Please try again.")]
    Transport(#[source] reqwest::Error),
}

/// HTTP client for the dispatch endpoint
#[derive(Debug, Clone)]
pub struct DispatchClient {
    http: reqwest::Client,
    base_url: String,
}

impl DispatchClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn send(&self, request: &SendRequest) -> Result<SendResult, ClientError> {
        let url = format!("{}{}", self.base_url, SEND_ROUTE);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Dispatch endpoint error ({}): {}", status, body);

            let status = status.as_u16();
            let Ok(reply) = serde_json::from_str::<serde_json::Value>(&body) else {
                return Err(ClientError::UnreadableReply { status });
            };
            let message = reply
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or(SEND_FAILED_ERROR)
                .to_string();

            return Err(ClientError::Rejected { status, message });
        }

        response.json().await.map_err(ClientError::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_send_posts_json_and_parses_result() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/send-whatsapp"))
            .and(body_json(serde_json::json!({"to": "+15551234567", "message": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "Message sent successfully",
                "messageId": "SM1"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = DispatchClient::new(&format!("{}/", mock_server.uri()));
        let result = client
            .send(&SendRequest::new("+15551234567", "hello"))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.message_id.as_deref(), Some("SM1"));
    }

    #[tokio::test]
    async fn test_send_surfaces_server_error_text() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "Phone number and message are required"
            })))
            .mount(&mock_server)
            .await;

        let client = DispatchClient::new(&mock_server.uri());
        let err = client.send(&SendRequest::default()).await.unwrap_err();

        match err {
            ClientError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Phone number and message are required");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_unparsable_error_body_asks_to_retry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&mock_server)
            .await;

        let client = DispatchClient::new(&mock_server.uri());
        let err = client
            .send(&SendRequest::new("+15551234567", "hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::UnreadableReply { status: 502 }));
        assert_eq!(err.to_string(), "Failed to send message. Please try again.");
    }

    #[tokio::test]
    async fn test_send_json_error_body_without_error_field_uses_fallback() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(serde_json::json!({"details": "boom"})),
            )
            .mount(&mock_server)
            .await;

        let client = DispatchClient::new(&mock_server.uri());
        let err = client
            .send(&SendRequest::new("+15551234567", "hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Rejected { status: 500, .. }));
        assert_eq!(err.to_string(), "Failed to send message");
    }

    #[tokio::test]
    async fn test_send_unreadable_success_body_is_transport_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let client = DispatchClient::new(&mock_server.uri());
        let err = client
            .send(&SendRequest::new("+15551234567", "hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
        assert_eq!(err.to_string(), "Failed to send message. Please try again.");
    }
}

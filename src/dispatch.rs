//! Message dispatch: validate a send request and deliver it in demo or live mode.

use crate::config::{Config, DeliveryMode};
use crate::whatsapp::{ProviderError, TwilioClient};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Longest message preview returned by a demo send, in characters
pub const PREVIEW_MAX_CHARS: usize = 50;

pub const VALIDATION_ERROR: &str = "Phone number and message are required";
pub const INVALID_BODY_ERROR: &str = "Invalid request body";
pub const SEND_FAILED_ERROR: &str = "Failed to send message";

pub const DEMO_SENT_MESSAGE: &str = "Message sent (demo mode)";
pub const LIVE_SENT_MESSAGE: &str = "Message sent successfully";

/// Body of `POST /api/send-whatsapp`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendRequest {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SendRequest {
    pub fn new(to: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            to: Some(to.into()),
            message: Some(message.into()),
        }
    }

    /// Both fields present and non-empty, or a validation error.
    /// Whitespace is content and is passed through untouched.
    fn validated(&self) -> Result<(&str, &str), DispatchError> {
        let to = self.to.as_deref().filter(|v| !v.is_empty());
        let message = self.message.as_deref().filter(|v| !v.is_empty());

        match (to, message) {
            (Some(to), Some(message)) => Ok((to, message)),
            _ => Err(DispatchError::Validation),
        }
    }
}

/// Successful send, in the shape returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DemoDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DemoDetails {
    pub to: String,
    pub message_preview: String,
}

/// Failed send, in the shape returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Phone number and message are required")]
    Validation,

    #[error("Invalid request body")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Failed to send message: {0}")]
    Provider(#[from] ProviderError),
}

impl DispatchError {
    /// Client-facing error body
    pub fn to_body(&self) -> ErrorBody {
        match self {
            DispatchError::Validation => ErrorBody {
                error: VALIDATION_ERROR.to_string(),
                details: None,
            },
            DispatchError::InvalidBody(_) => ErrorBody {
                error: INVALID_BODY_ERROR.to_string(),
                details: None,
            },
            DispatchError::Provider(e) => ErrorBody {
                error: SEND_FAILED_ERROR.to_string(),
                details: Some(e.to_string()),
            },
        }
    }

    pub fn is_client_error(&self) -> bool {
        !matches!(self, DispatchError::Provider(_))
    }
}

/// Delivery backend picked once at construction
#[derive(Debug, Clone)]
enum Backend {
    Demo,
    Live(TwilioClient),
}

/// Sends messages in whichever mode the configuration resolved to
#[derive(Debug, Clone)]
pub struct Dispatcher {
    backend: Backend,
}

impl Dispatcher {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let backend = match config.delivery_mode() {
            DeliveryMode::Demo => Backend::Demo,
            DeliveryMode::Live(credentials) => Backend::Live(TwilioClient::new(config, credentials)?),
        };
        Ok(Self { backend })
    }

    pub fn demo() -> Self {
        Self {
            backend: Backend::Demo,
        }
    }

    pub fn live(client: TwilioClient) -> Self {
        Self {
            backend: Backend::Live(client),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self.backend {
            Backend::Demo => "demo",
            Backend::Live(_) => "live",
        }
    }

    /// Decode a raw request body and send it
    pub async fn send_raw(&self, body: &[u8]) -> Result<SendResult, DispatchError> {
        let request: SendRequest =
            serde_json::from_slice(body).map_err(DispatchError::InvalidBody)?;
        self.send(&request).await
    }

    pub async fn send(&self, request: &SendRequest) -> Result<SendResult, DispatchError> {
        let (to, message) = request.validated()?;

        match &self.backend {
            Backend::Demo => {
                info!("Demo mode: would send WhatsApp message");
                info!("To: {}", to);
                info!("Message: {}", message);

                Ok(SendResult {
                    success: true,
                    message: DEMO_SENT_MESSAGE.to_string(),
                    demo: Some(true),
                    message_id: None,
                    details: Some(DemoDetails {
                        to: to.to_string(),
                        message_preview: preview(message),
                    }),
                })
            }
            Backend::Live(client) => {
                let sid = client.send_message(to, message).await.map_err(|e| {
                    warn!("Failed to send WhatsApp message to {}: {}", to, e);
                    e
                })?;

                info!("✓ WhatsApp message sent to {} (sid: {})", to, sid);

                Ok(SendResult {
                    success: true,
                    message: LIVE_SENT_MESSAGE.to_string(),
                    demo: None,
                    message_id: Some(sid),
                    details: None,
                })
            }
        }
    }
}

/// First `PREVIEW_MAX_CHARS` characters of a message
pub fn preview(message: &str) -> String {
    message.chars().take(PREVIEW_MAX_CHARS).collect()
}

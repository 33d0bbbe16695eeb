use crate::config::{Config, TwilioCredentials};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

/// Channel prefix Twilio uses to route a message over WhatsApp
const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Twilio error codes meaning the recipient cannot be reached on WhatsApp
const RECIPIENT_ERROR_CODES: [u32; 3] = [
    21211, // Invalid 'To' phone number
    21614, // 'To' number is not a valid mobile number
    63003, // Channel could not find the 'To' address
];
const AUTH_ERROR_CODE: u32 = 20003;
const RATE_LIMIT_ERROR_CODE: u32 = 20429;

/// Failure categories surfaced to callers.
///
/// The display text is safe to hand back to API clients. The raw provider
/// response is only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Messaging provider rejected the configured credentials")]
    Unauthorized,

    #[error("Messaging provider is rate limiting requests")]
    RateLimited,

    #[error("Recipient is not reachable on WhatsApp")]
    InvalidRecipient,

    #[error("Messaging provider rejected the message{}", code_suffix(.code))]
    Rejected { code: Option<u32> },

    #[error("Messaging provider is temporarily unavailable")]
    Unavailable,

    #[error("Could not reach messaging provider")]
    Transport(#[source] reqwest::Error),

    #[error("Messaging provider returned an unexpected response")]
    InvalidResponse,
}

fn code_suffix(code: &Option<u32>) -> String {
    match code {
        Some(code) => format!(" (error {})", code),
        None => String::new(),
    }
}

/// Successful Twilio message resource (only the fields we use)
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Twilio error body
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    code: Option<u32>,
}

/// Client for the Twilio Messages API
#[derive(Debug, Clone)]
pub struct TwilioClient {
    http: reqwest::Client,
    api_url: String,
    credentials: TwilioCredentials,
}

impl TwilioClient {
    pub fn new(
        config: &Config,
        credentials: TwilioCredentials,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.twilio_timeout())
            .build()?;

        Ok(Self {
            http,
            api_url: config.twilio_api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Override the request timeout (mainly for tests)
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, reqwest::Error> {
        self.http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_url, self.credentials.account_sid
        )
    }

    /// Create a WhatsApp message and return the Twilio message SID
    pub async fn send_message(&self, to: &str, body: &str) -> Result<String, ProviderError> {
        let from = whatsapp_address(&self.credentials.whatsapp_number);
        let to = whatsapp_address(to);

        debug!("Creating Twilio message from {} to {}", from, to);

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .form(&[
                ("From", from.as_str()),
                ("To", to.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Twilio API: {}", e);
                ProviderError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Twilio API error ({}): {}", status, body);
            return Err(classify_failure(status, &body));
        }

        let message: MessageResource = response.json().await.map_err(|e| {
            error!("Failed to parse Twilio response: {}", e);
            ProviderError::InvalidResponse
        })?;

        Ok(message.sid)
    }
}

/// Prefix a phone number with the WhatsApp channel marker (idempotent)
pub fn whatsapp_address(number: &str) -> String {
    if number.starts_with(WHATSAPP_PREFIX) {
        number.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, number)
    }
}

/// Map a failed Twilio response onto a user-safe category
fn classify_failure(status: reqwest::StatusCode, body: &str) -> ProviderError {
    let code = serde_json::from_str::<TwilioErrorBody>(body)
        .ok()
        .and_then(|b| b.code);

    if status == reqwest::StatusCode::UNAUTHORIZED
        || status == reqwest::StatusCode::FORBIDDEN
        || code == Some(AUTH_ERROR_CODE)
    {
        return ProviderError::Unauthorized;
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || code == Some(RATE_LIMIT_ERROR_CODE) {
        return ProviderError::RateLimited;
    }

    if status.is_server_error() {
        return ProviderError::Unavailable;
    }

    match code {
        Some(code) if RECIPIENT_ERROR_CODES.contains(&code) => ProviderError::InvalidRecipient,
        code => ProviderError::Rejected { code },
    }
}

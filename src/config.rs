use std::time::Duration;

const DEFAULT_TWILIO_API_URL: &str = "https://api.twilio.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    // Twilio (all three required for live delivery)
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_whatsapp_number: Option<String>,

    // Twilio API
    pub twilio_api_url: String,
    pub twilio_timeout_secs: u64,

    // Server
    pub port: u16,
}

/// Credentials needed to talk to the Twilio Messages API
#[derive(Clone, PartialEq, Eq)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub whatsapp_number: String,
}

// Keep the auth token out of logs
impl std::fmt::Debug for TwilioCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("whatsapp_number", &self.whatsapp_number)
            .finish()
    }
}

/// How messages are delivered, decided once from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Credentials missing: log the message instead of sending it
    Demo,
    /// Credentials present: send through Twilio
    Live(TwilioCredentials),
}

impl DeliveryMode {
    pub fn name(&self) -> &'static str {
        match self {
            DeliveryMode::Demo => "demo",
            DeliveryMode::Live(_) => "live",
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, DeliveryMode::Demo)
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            // Twilio - empty values are treated as unset
            twilio_account_sid: non_empty_var("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: non_empty_var("TWILIO_AUTH_TOKEN"),
            twilio_whatsapp_number: non_empty_var("TWILIO_WHATSAPP_NUMBER"),

            // Twilio API
            twilio_api_url: std::env::var("TWILIO_API_URL")
                .unwrap_or_else(|_| DEFAULT_TWILIO_API_URL.to_string()),
            twilio_timeout_secs: std::env::var("TWILIO_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    /// Resolve the delivery mode. Any missing credential means demo mode.
    pub fn delivery_mode(&self) -> DeliveryMode {
        match (
            non_empty(&self.twilio_account_sid),
            non_empty(&self.twilio_auth_token),
            non_empty(&self.twilio_whatsapp_number),
        ) {
            (Some(account_sid), Some(auth_token), Some(whatsapp_number)) => {
                DeliveryMode::Live(TwilioCredentials {
                    account_sid: account_sid.to_string(),
                    auth_token: auth_token.to_string(),
                    whatsapp_number: whatsapp_number.to_string(),
                })
            }
            _ => DeliveryMode::Demo,
        }
    }

    pub fn twilio_timeout(&self) -> Duration {
        Duration::from_secs(self.twilio_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_whatsapp_number: None,
            twilio_api_url: DEFAULT_TWILIO_API_URL.to_string(),
            twilio_timeout_secs: DEFAULT_TIMEOUT_SECS,
            port: DEFAULT_PORT,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

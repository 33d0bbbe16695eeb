use super::api::{ClientError, DispatchClient};
use super::feedback::{Feedback, SEND_FEEDBACK_TTL};
use super::registry::ContactRegistry;
use crate::dispatch::{SendRequest, SendResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const SEND_SUCCESS_FEEDBACK: &str = "Message sent successfully! ✓";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ComposerError {
    #[error("Please select a phone number and enter a message")]
    Incomplete,

    #[error("A message is already being sent")]
    Busy,

    #[error("{0} is not a registered phone number")]
    UnknownRecipient(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sending,
    Sent,
    Failed(String),
}

/// Picks a recipient, holds the draft, and allows one send at a time
#[derive(Debug)]
pub struct Composer {
    selected: Option<String>,
    draft: String,
    last_outcome: SendState,
    in_flight: Arc<AtomicBool>,
}

impl Default for Composer {
    fn default() -> Self {
        Self {
            selected: None,
            draft: String::new(),
            last_outcome: SendState::Idle,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a recipient. Only registered phone numbers can be selected.
    pub fn select(&mut self, registry: &ContactRegistry, phone: &str) -> Result<(), ComposerError> {
        let registration = registry
            .find_by_phone(phone)
            .ok_or_else(|| ComposerError::UnknownRecipient(phone.to_string()))?;
        self.selected = Some(registration.phone.clone());
        Ok(())
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SendState {
        if self.is_sending() {
            SendState::Sending
        } else {
            self.last_outcome.clone()
        }
    }

    /// Claim the single send slot and build the request.
    ///
    /// The slot stays taken until the `PendingSend` is handed to `finish`
    /// (or dropped).
    pub fn begin_send(&mut self) -> Result<PendingSend, ComposerError> {
        if self.is_sending() {
            return Err(ComposerError::Busy);
        }

        let to = match self.selected.as_deref() {
            Some(to) if !self.draft.is_empty() => to.to_string(),
            _ => return Err(ComposerError::Incomplete),
        };

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ComposerError::Busy);
        }

        Ok(PendingSend {
            request: SendRequest::new(to, self.draft.clone()),
            _slot: SlotGuard(Arc::clone(&self.in_flight)),
        })
    }

    /// Record the outcome of a send, release its slot and produce the
    /// feedback to show
    pub fn finish(
        &mut self,
        pending: PendingSend,
        outcome: &Result<SendResult, ClientError>,
    ) -> Feedback {
        let feedback = match outcome {
            Ok(_) => {
                self.last_outcome = SendState::Sent;
                self.draft.clear();
                Feedback::success(SEND_SUCCESS_FEEDBACK, SEND_FEEDBACK_TTL)
            }
            Err(e) => {
                self.last_outcome = SendState::Failed(e.to_string());
                Feedback::error(format!("Error: {}", e), Some(SEND_FEEDBACK_TTL))
            }
        };
        drop(pending);
        feedback
    }
}

/// A send that holds the composer's in-flight slot
#[derive(Debug)]
pub struct PendingSend {
    request: SendRequest,
    _slot: SlotGuard,
}

impl PendingSend {
    pub fn request(&self) -> &SendRequest {
        &self.request
    }

    /// Issue the request. The slot stays taken until `Composer::finish`.
    pub async fn dispatch(&self, client: &DispatchClient) -> Result<SendResult, ClientError> {
        client.send(&self.request).await
    }
}

#[derive(Debug)]
struct SlotGuard(Arc<AtomicBool>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

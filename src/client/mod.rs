//! Operator-side session: contact registry, message composer and feedback.
//!
//! Everything here lives in memory for the lifetime of one session and is
//! gone when the process exits.

pub mod api;
pub mod composer;
pub mod feedback;
pub mod registry;

pub use api::{ClientError, DispatchClient};
pub use composer::{Composer, ComposerError, PendingSend, SendState};
pub use feedback::{Feedback, FeedbackBoard, Tone};
pub use registry::{ContactRegistry, Registration, RegistryError};

use crate::dispatch::SendResult;
use feedback::REGISTRATION_FEEDBACK_TTL;
use std::time::Instant;

pub const REGISTRATION_SUCCESS_FEEDBACK: &str = "Registration successful!";

/// One operator session
#[derive(Debug, Default)]
pub struct Session {
    pub registry: ContactRegistry,
    pub composer: Composer,
    feedback: FeedbackBoard,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contact and show the outcome
    pub fn register(&mut self, name: &str, phone: &str) -> Result<&Registration, RegistryError> {
        let now = Instant::now();
        match self.registry.register(name, phone) {
            Ok(registration) => {
                self.feedback.show(
                    Feedback::success(REGISTRATION_SUCCESS_FEEDBACK, REGISTRATION_FEEDBACK_TTL),
                    now,
                );
                Ok(registration)
            }
            Err(e) => {
                self.feedback.show(Feedback::error(e.to_string(), None), now);
                Err(e)
            }
        }
    }

    /// Select a registered recipient by phone number or 1-based position.
    ///
    /// An exact phone match wins, so a contact whose phone looks like a
    /// position can still be picked by phone.
    pub fn select(&mut self, choice: &str) -> Result<(), ComposerError> {
        let phone = match self.registry.find_by_phone(choice) {
            Some(registration) => registration.phone.clone(),
            None => choice
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|position| self.registry.get(position))
                .map(|r| r.phone.clone())
                .unwrap_or_else(|| choice.to_string()),
        };

        let result = self.composer.select(&self.registry, &phone);
        if let Err(e) = &result {
            self.feedback
                .show(Feedback::error(e.to_string(), None), Instant::now());
        }
        result
    }

    /// Start a send. On failure the reason is shown as feedback.
    ///
    /// While a send is in flight the draft is left untouched.
    pub fn begin_send(&mut self, message: &str) -> Result<PendingSend, ComposerError> {
        let result = if self.composer.is_sending() {
            Err(ComposerError::Busy)
        } else {
            self.composer.set_draft(message);
            self.composer.begin_send()
        };
        match &result {
            Ok(_) => self.feedback.clear(),
            Err(e) => self
                .feedback
                .show(Feedback::error(e.to_string(), None), Instant::now()),
        }
        result
    }

    /// Record a finished send, release its slot and show its feedback
    pub fn finish_send(
        &mut self,
        pending: PendingSend,
        outcome: &Result<SendResult, ClientError>,
    ) -> Feedback {
        let feedback = self.composer.finish(pending, outcome);
        self.feedback.show(feedback.clone(), Instant::now());
        feedback
    }

    /// Send a message to the selected recipient and wait for the outcome
    pub async fn send(
        &mut self,
        client: &DispatchClient,
        message: &str,
    ) -> Result<SendResult, Feedback> {
        let pending = match self.begin_send(message) {
            Ok(pending) => pending,
            Err(e) => return Err(Feedback::error(e.to_string(), None)),
        };

        let outcome = pending.dispatch(client).await;
        let feedback = self.finish_send(pending, &outcome);
        outcome.map_err(|_| feedback)
    }

    pub fn feedback(&mut self) -> Option<&Feedback> {
        self.feedback.visible(Instant::now())
    }
}

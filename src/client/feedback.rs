use std::time::{Duration, Instant};

/// How long registration feedback stays visible
pub const REGISTRATION_FEEDBACK_TTL: Duration = Duration::from_secs(3);
/// How long send feedback stays visible
pub const SEND_FEEDBACK_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

/// A short status line shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub text: String,
    pub tone: Tone,
    /// `None` means the feedback stays until replaced
    pub ttl: Option<Duration>,
}

impl Feedback {
    pub fn success(text: impl Into<String>, ttl: Duration) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Success,
            ttl: Some(ttl),
        }
    }

    pub fn error(text: impl Into<String>, ttl: Option<Duration>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Error,
            ttl,
        }
    }

    pub fn is_error(&self) -> bool {
        self.tone == Tone::Error
    }
}

/// Holds the latest feedback and hides it once its deadline passes.
///
/// Each feedback carries its own deadline, so a newer message is never
/// cleared by an older one's timer.
#[derive(Debug, Default)]
pub struct FeedbackBoard {
    current: Option<(Feedback, Option<Instant>)>,
}

impl FeedbackBoard {
    pub fn show(&mut self, feedback: Feedback, now: Instant) {
        let deadline = feedback.ttl.map(|ttl| now + ttl);
        self.current = Some((feedback, deadline));
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Current feedback, dropping it if it has expired
    pub fn visible(&mut self, now: Instant) -> Option<&Feedback> {
        let expired = matches!(&self.current, Some((_, Some(deadline))) if now >= *deadline);
        if expired {
            self.current = None;
        }
        self.current.as_ref().map(|(feedback, _)| feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_visible_until_deadline() {
        let start = Instant::now();
        let mut board = FeedbackBoard::default();
        board.show(
            Feedback::success("Registration successful!", REGISTRATION_FEEDBACK_TTL),
            start,
        );

        let shown = board.visible(start + Duration::from_millis(2999)).cloned();
        assert_eq!(shown.map(|f| f.text), Some("Registration successful!".to_string()));

        assert!(board.visible(start + Duration::from_secs(3)).is_none());
        // Stays cleared
        assert!(board.visible(start).is_none());
    }

    #[test]
    fn test_send_feedback_lasts_five_seconds() {
        let start = Instant::now();
        let mut board = FeedbackBoard::default();
        board.show(Feedback::error("Error: boom", Some(SEND_FEEDBACK_TTL)), start);

        assert!(board.visible(start + Duration::from_secs(4)).is_some());
        assert!(board.visible(start + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_feedback_without_ttl_persists() {
        let start = Instant::now();
        let mut board = FeedbackBoard::default();
        board.show(Feedback::error("Please fill in all fields", None), start);

        let feedback = board.visible(start + Duration::from_secs(3600)).unwrap();
        assert!(feedback.is_error());
    }

    #[test]
    fn test_newer_feedback_keeps_its_own_deadline() {
        let start = Instant::now();
        let mut board = FeedbackBoard::default();
        board.show(
            Feedback::success("Registration successful!", REGISTRATION_FEEDBACK_TTL),
            start,
        );
        board.show(
            Feedback::success("Message sent successfully! ✓", SEND_FEEDBACK_TTL),
            start + Duration::from_secs(2),
        );

        // The first deadline (3s) has passed, the second (7s) has not
        let feedback = board.visible(start + Duration::from_secs(4)).unwrap();
        assert_eq!(feedback.text, "Message sent successfully! ✓");
        assert!(board.visible(start + Duration::from_secs(7)).is_none());
    }

    #[test]
    fn test_clear() {
        let now = Instant::now();
        let mut board = FeedbackBoard::default();
        board.show(Feedback::error("x", None), now);
        board.clear();
        assert!(board.visible(now).is_none());
    }
}

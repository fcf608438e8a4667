//! Email notification channel.
//!
//! Recipients must look like a mailbox address (`local@domain.tld`). Bodies
//! may be up to 10 000 characters.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use eventpro_core::ChannelKind;
use regex::Regex;

use super::{NotificationChannel, Transmitter};

/// Maximum email body length in characters.
pub const EMAIL_MAX_LENGTH: usize = 10_000;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@([A-Za-z0-9.-]+\.[A-Za-z]{2,})$").expect("valid regex")
});

/// Sends notifications by email.
pub struct EmailChannel {
    transmitter: Arc<dyn Transmitter>,
}

impl EmailChannel {
    pub fn new(transmitter: Arc<dyn Transmitter>) -> Self {
        Self { transmitter }
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn channel_kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    fn validate_recipient(&self, address: &str) -> bool {
        EMAIL_RE.is_match(address)
    }

    fn max_message_length(&self) -> usize {
        EMAIL_MAX_LENGTH
    }

    fn transmitter(&self) -> &dyn Transmitter {
        self.transmitter.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::tests::CountingTransmitter;
    use crate::delivery::{DeliveryError, OutboundMessage, SendStatus};
    use assert_matches::assert_matches;
    use std::sync::atomic::Ordering;

    fn channel() -> (EmailChannel, Arc<CountingTransmitter>) {
        let transmitter = Arc::new(CountingTransmitter::default());
        (EmailChannel::new(transmitter.clone()), transmitter)
    }

    #[test]
    fn accepts_plain_addresses() {
        let (email, _) = channel();
        assert!(email.validate_recipient("user@example.com"));
        assert!(email.validate_recipient("first.last+tag@mail.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        let (email, _) = channel();
        assert!(!email.validate_recipient("not-an-email"));
        assert!(!email.validate_recipient("user@localhost"));
        assert!(!email.validate_recipient("@example.com"));
        assert!(!email.validate_recipient(""));
    }

    #[tokio::test]
    async fn invalid_recipient_is_rejected_without_transmitting() {
        let (email, transmitter) = channel();
        let outcome = email
            .send(&OutboundMessage::new("not-an-email", "Hello", "Body"))
            .await;

        assert!(!outcome.is_success());
        assert_matches!(
            outcome.status,
            SendStatus::Rejected(DeliveryError::InvalidRecipient { kind: ChannelKind::Email, .. })
        );
        assert_eq!(transmitter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_message_is_delivered() {
        let (email, transmitter) = channel();
        let body = "x".repeat(9_999);
        let outcome = email
            .send(&OutboundMessage::new("user@example.com", "Hello", body))
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.recipient, "user@example.com");
        assert_eq!(transmitter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn body_over_limit_is_rejected() {
        let (email, transmitter) = channel();
        let body = "x".repeat(EMAIL_MAX_LENGTH + 1);
        let outcome = email
            .send(&OutboundMessage::new("user@example.com", "Hello", body))
            .await;

        assert_matches!(
            outcome.status,
            SendStatus::Rejected(DeliveryError::MessageTooLong { max: EMAIL_MAX_LENGTH, .. })
        );
        assert_eq!(transmitter.calls.load(Ordering::SeqCst), 0);
    }
}

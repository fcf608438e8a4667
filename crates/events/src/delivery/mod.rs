//! Notification delivery channels.
//!
//! A [`NotificationChannel`] validates a message against its own recipient
//! format and size limit, then hands it to a [`Transmitter`]. Validation
//! problems and transmission failures come back as a [`SendOutcome`];
//! `send` itself never errors.
//!
//! The default transmitter is [`SimulatedTransmitter`], which only waits.
//! A production deployment injects a real one through the
//! [`ChannelFactory`](factory::ChannelFactory).

pub mod email;
pub mod factory;
pub mod push;
pub mod service;
pub mod sms;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eventpro_core::{ChannelKind, CoreError};
use tokio::task::JoinHandle;

pub use email::EmailChannel;
pub use push::PushChannel;
pub use sms::SmsChannel;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The factory was asked for a kind it does not build.
    #[error(transparent)]
    Channel(#[from] CoreError),

    #[error("Invalid {kind} recipient: {recipient}")]
    InvalidRecipient { kind: ChannelKind, recipient: String },

    #[error("Message too long for {kind}: {length} characters (max {max})")]
    MessageTooLong {
        kind: ChannelKind,
        length: usize,
        max: usize,
    },

    #[error("Transmission failed: {0}")]
    Transmission(String),
}

// ---------------------------------------------------------------------------
// Message and outcome
// ---------------------------------------------------------------------------

/// A message addressed to one recipient.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub recipient: String,
    /// Email subject or push title. SMS ignores it.
    pub subject: String,
    pub body: String,
    /// Extra key/value data passed through to the transmitter.
    pub metadata: serde_json::Value,
}

impl OutboundMessage {
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Body length in characters, as compared against channel limits.
    pub fn body_len(&self) -> usize {
        self.body.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendStatus {
    Delivered,
    /// Refused before any transmission was attempted.
    Rejected(DeliveryError),
    /// The transmitter reported a failure.
    Failed(DeliveryError),
}

/// Result of one `send` call.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub channel: ChannelKind,
    pub recipient: String,
    pub status: SendStatus,
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, SendStatus::Delivered)
    }
}

// ---------------------------------------------------------------------------
// Transmitter
// ---------------------------------------------------------------------------

/// The outward-facing half of a channel: actually moves a validated message.
#[async_trait]
pub trait Transmitter: Send + Sync {
    async fn transmit(&self, kind: ChannelKind, message: &OutboundMessage)
        -> Result<(), DeliveryError>;
}

/// Stand-in transport that waits `latency` and reports success.
#[derive(Debug, Clone)]
pub struct SimulatedTransmitter {
    latency: Duration,
}

impl SimulatedTransmitter {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl Transmitter for SimulatedTransmitter {
    async fn transmit(
        &self,
        kind: ChannelKind,
        message: &OutboundMessage,
    ) -> Result<(), DeliveryError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        tracing::debug!(
            channel = %kind,
            recipient = %message.recipient,
            latency_ms = self.latency.as_millis() as u64,
            "Simulated transmission complete"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NotificationChannel
// ---------------------------------------------------------------------------

/// One delivery mechanism (email, SMS or push).
///
/// Implementors supply validation rules and a transmitter; the provided
/// [`send`](NotificationChannel::send) applies them in order: recipient,
/// then length, then transmission.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn channel_kind(&self) -> ChannelKind;

    fn validate_recipient(&self, address: &str) -> bool;

    /// Maximum body length in characters.
    fn max_message_length(&self) -> usize;

    fn transmitter(&self) -> &dyn Transmitter;

    async fn send(&self, message: &OutboundMessage) -> SendOutcome {
        let kind = self.channel_kind();
        let outcome = |status| SendOutcome {
            channel: kind,
            recipient: message.recipient.clone(),
            status,
        };

        if !self.validate_recipient(&message.recipient) {
            tracing::warn!(channel = %kind, recipient = %message.recipient, "Invalid recipient");
            return outcome(SendStatus::Rejected(DeliveryError::InvalidRecipient {
                kind,
                recipient: message.recipient.clone(),
            }));
        }

        let length = message.body_len();
        let max = self.max_message_length();
        if length > max {
            tracing::warn!(channel = %kind, length, max, "Message too long");
            return outcome(SendStatus::Rejected(DeliveryError::MessageTooLong {
                kind,
                length,
                max,
            }));
        }

        match self.transmitter().transmit(kind, message).await {
            Ok(()) => {
                tracing::info!(channel = %kind, recipient = %message.recipient, "Notification sent");
                outcome(SendStatus::Delivered)
            }
            Err(e) => {
                tracing::error!(
                    channel = %kind,
                    recipient = %message.recipient,
                    error = %e,
                    "Notification transmission failed"
                );
                let e = match e {
                    DeliveryError::Transmission(_) => e,
                    other => DeliveryError::Transmission(other.to_string()),
                };
                outcome(SendStatus::Failed(e))
            }
        }
    }
}

/// Send on a background task. Await the handle for the outcome or drop it
/// to fire and forget.
pub fn spawn_send(
    channel: Arc<dyn NotificationChannel>,
    message: OutboundMessage,
) -> JoinHandle<SendOutcome> {
    tokio::spawn(async move { channel.send(&message).await })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts transmissions and optionally fails every one of them.
    #[derive(Default)]
    pub(crate) struct CountingTransmitter {
        pub calls: AtomicUsize,
        pub fail: bool,
    }

    #[async_trait]
    impl Transmitter for CountingTransmitter {
        async fn transmit(
            &self,
            _kind: ChannelKind,
            _message: &OutboundMessage,
        ) -> Result<(), DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DeliveryError::Transmission("gateway unavailable".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn body_len_counts_characters_not_bytes() {
        let msg = OutboundMessage::new("r", "s", "héllo");
        assert_eq!(msg.body_len(), 5);
    }

    #[tokio::test]
    async fn simulated_transmitter_succeeds() {
        let t = SimulatedTransmitter::new(Duration::from_millis(1));
        let msg = OutboundMessage::new("user@example.com", "Hi", "Body");
        assert!(t.transmit(ChannelKind::Email, &msg).await.is_ok());
    }

    #[tokio::test]
    async fn spawn_send_returns_outcome() {
        let channel: Arc<dyn NotificationChannel> =
            Arc::new(EmailChannel::new(Arc::new(CountingTransmitter::default())));
        let handle = spawn_send(channel, OutboundMessage::new("user@example.com", "Hi", "Body"));
        let outcome = handle.await.unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.channel, ChannelKind::Email);
    }

    #[test]
    fn metadata_defaults_to_empty_object() {
        let plain = OutboundMessage::new("r", "s", "b");
        assert_eq!(plain.metadata, serde_json::json!({}));

        let tagged = plain.with_metadata(serde_json::json!({ "subject_id": 7 }));
        assert_eq!(tagged.metadata["subject_id"], 7);
    }

    #[tokio::test]
    async fn metadata_reaches_transmitter() {
        struct Capture(std::sync::Mutex<Option<serde_json::Value>>);

        #[async_trait]
        impl Transmitter for Capture {
            async fn transmit(
                &self,
                _kind: ChannelKind,
                message: &OutboundMessage,
            ) -> Result<(), DeliveryError> {
                *self.0.lock().unwrap() = Some(message.metadata.clone());
                Ok(())
            }
        }

        let capture = Arc::new(Capture(std::sync::Mutex::new(None)));
        let channel = EmailChannel::new(capture.clone());
        let msg = OutboundMessage::new("user@example.com", "Hi", "Body")
            .with_metadata(serde_json::json!({ "kind": "created" }));

        assert!(channel.send(&msg).await.is_success());
        let seen = capture.0.lock().unwrap().clone();
        assert_eq!(seen, Some(serde_json::json!({ "kind": "created" })));
    }

    #[test]
    fn unsupported_kind_displays_core_message() {
        let err: DeliveryError = CoreError::UnsupportedChannelKind("fax".into()).into();
        assert_eq!(err.to_string(), "Unsupported channel kind: fax");
    }

    #[test]
    fn delivery_error_display() {
        let err = DeliveryError::MessageTooLong {
            kind: ChannelKind::Sms,
            length: 200,
            max: 160,
        };
        assert_eq!(
            err.to_string(),
            "Message too long for sms: 200 characters (max 160)"
        );
    }
}

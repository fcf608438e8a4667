//! Builds notification channels by kind.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use eventpro_core::{ChannelKind, CoreError};

use super::{
    DeliveryError, EmailChannel, NotificationChannel, PushChannel, SimulatedTransmitter,
    SmsChannel, Transmitter,
};
use crate::config::DeliveryConfig;

/// Creates [`NotificationChannel`]s for the kinds enabled in configuration.
///
/// The factory holds no per-call state: asking for the same kind twice
/// yields two channels that behave identically.
pub struct ChannelFactory {
    enabled: BTreeSet<ChannelKind>,
    transmitters: HashMap<ChannelKind, Arc<dyn Transmitter>>,
}

impl ChannelFactory {
    /// Build a factory whose channels use [`SimulatedTransmitter`]s with the
    /// configured latencies.
    pub fn new(config: &DeliveryConfig) -> Self {
        let transmitters = ChannelKind::ALL
            .into_iter()
            .map(|kind| {
                let t: Arc<dyn Transmitter> =
                    Arc::new(SimulatedTransmitter::new(config.latency(kind)));
                (kind, t)
            })
            .collect();

        Self {
            enabled: config.enabled.clone(),
            transmitters,
        }
    }

    /// Replace the transmitter used for `kind`.
    pub fn with_transmitter(mut self, kind: ChannelKind, transmitter: Arc<dyn Transmitter>) -> Self {
        self.transmitters.insert(kind, transmitter);
        self
    }

    /// Build a channel for `kind`.
    ///
    /// Fails with [`CoreError::UnsupportedChannelKind`] (wrapped in
    /// [`DeliveryError::Channel`]) if the kind is not enabled.
    pub fn create(&self, kind: ChannelKind) -> Result<Arc<dyn NotificationChannel>, DeliveryError> {
        let transmitter = match self.transmitters.get(&kind) {
            Some(t) if self.enabled.contains(&kind) => Arc::clone(t),
            _ => {
                tracing::error!(channel = %kind, "Unsupported channel kind requested");
                return Err(CoreError::UnsupportedChannelKind(kind.to_string()).into());
            }
        };

        tracing::debug!(channel = %kind, "Creating notification channel");
        let channel: Arc<dyn NotificationChannel> = match kind {
            ChannelKind::Email => Arc::new(EmailChannel::new(transmitter)),
            ChannelKind::Sms => Arc::new(SmsChannel::new(transmitter)),
            ChannelKind::Push => Arc::new(PushChannel::new(transmitter)),
        };
        Ok(channel)
    }

    /// Parse a kind name (case-insensitive) and build its channel.
    pub fn create_by_name(&self, name: &str) -> Result<Arc<dyn NotificationChannel>, DeliveryError> {
        let kind = name.parse::<ChannelKind>()?;
        self.create(kind)
    }

    pub fn supported_kinds(&self) -> BTreeSet<ChannelKind> {
        self.enabled.clone()
    }

    pub fn is_supported(&self, kind: ChannelKind) -> bool {
        self.enabled.contains(&kind)
    }
}

impl Default for ChannelFactory {
    fn default() -> Self {
        Self::new(&DeliveryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::tests::CountingTransmitter;
    use crate::delivery::{OutboundMessage, SendStatus};
    use assert_matches::assert_matches;

    #[test]
    fn creates_every_default_kind() {
        let factory = ChannelFactory::default();
        for kind in ChannelKind::ALL {
            let channel = factory.create(kind).unwrap();
            assert_eq!(channel.channel_kind(), kind);
        }
        assert_eq!(factory.supported_kinds().len(), 3);
    }

    #[test]
    fn channel_limits_match_kind() {
        let factory = ChannelFactory::default();
        assert_eq!(factory.create(ChannelKind::Email).unwrap().max_message_length(), 10_000);
        assert_eq!(factory.create(ChannelKind::Sms).unwrap().max_message_length(), 160);
        assert_eq!(factory.create(ChannelKind::Push).unwrap().max_message_length(), 256);
    }

    #[test]
    fn disabled_kind_is_unsupported() {
        let config = DeliveryConfig {
            enabled: [ChannelKind::Email].into_iter().collect(),
            ..DeliveryConfig::immediate()
        };
        let factory = ChannelFactory::new(&config);

        assert!(factory.is_supported(ChannelKind::Email));
        assert!(!factory.is_supported(ChannelKind::Sms));
        assert_matches!(
            factory.create(ChannelKind::Sms).err(),
            Some(DeliveryError::Channel(CoreError::UnsupportedChannelKind(name))) if name == "sms"
        );
    }

    #[test]
    fn create_by_name_rejects_unknown_names() {
        let factory = ChannelFactory::default();
        assert!(factory.create_by_name("PUSH").is_ok());
        assert_matches!(
            factory.create_by_name("carrier-pigeon").err(),
            Some(DeliveryError::Channel(CoreError::UnsupportedChannelKind(name)))
                if name == "carrier-pigeon"
        );
    }

    #[tokio::test]
    async fn injected_transmitter_is_used() {
        let failing = Arc::new(CountingTransmitter {
            fail: true,
            ..Default::default()
        });
        let factory = ChannelFactory::new(&DeliveryConfig::immediate())
            .with_transmitter(ChannelKind::Push, failing);

        let push = factory.create(ChannelKind::Push).unwrap();
        let outcome = push
            .send(&OutboundMessage::new("device_token-123", "Title", "Body"))
            .await;
        assert_matches!(outcome.status, SendStatus::Failed(_));

        let email = factory.create(ChannelKind::Email).unwrap();
        let outcome = email
            .send(&OutboundMessage::new("user@example.com", "Title", "Body"))
            .await;
        assert!(outcome.is_success());
    }
}

//! Convenience layer for sending one message over one or several channels.

use std::collections::BTreeMap;
use std::sync::Arc;

use eventpro_core::ChannelKind;
use futures::future::join_all;

use super::factory::ChannelFactory;
use super::{OutboundMessage, SendOutcome, SendStatus};

/// Sends messages by channel kind, turning factory errors into failed
/// outcomes so callers only ever deal with [`SendOutcome`]s.
#[derive(Clone)]
pub struct NotificationService {
    factory: Arc<ChannelFactory>,
}

impl NotificationService {
    pub fn new(factory: Arc<ChannelFactory>) -> Self {
        Self { factory }
    }

    pub async fn send(&self, kind: ChannelKind, message: &OutboundMessage) -> SendOutcome {
        match self.factory.create(kind) {
            Ok(channel) => channel.send(message).await,
            Err(e) => {
                tracing::error!(channel = %kind, error = %e, "Cannot send notification");
                SendOutcome {
                    channel: kind,
                    recipient: message.recipient.clone(),
                    status: SendStatus::Rejected(e),
                }
            }
        }
    }

    /// Send `message` on every kind in `kinds` concurrently. Duplicate kinds
    /// are sent once.
    pub async fn send_multiple(
        &self,
        kinds: &[ChannelKind],
        message: &OutboundMessage,
    ) -> BTreeMap<ChannelKind, SendOutcome> {
        let mut unique = kinds.to_vec();
        unique.sort();
        unique.dedup();

        let outcomes = join_all(unique.iter().map(|kind| self.send(*kind, message))).await;
        let delivered = outcomes.iter().filter(|o| o.is_success()).count();
        tracing::info!(
            recipient = %message.recipient,
            requested = unique.len(),
            delivered,
            "Multi-channel notification finished"
        );

        unique.into_iter().zip(outcomes).collect()
    }

    pub fn supported_kinds(&self) -> Vec<ChannelKind> {
        self.factory.supported_kinds().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeliveryConfig;
    use crate::delivery::DeliveryError;
    use eventpro_core::CoreError;
    use assert_matches::assert_matches;

    fn service(enabled: &[ChannelKind]) -> NotificationService {
        let config = DeliveryConfig {
            enabled: enabled.iter().copied().collect(),
            ..DeliveryConfig::immediate()
        };
        NotificationService::new(Arc::new(ChannelFactory::new(&config)))
    }

    #[tokio::test]
    async fn unsupported_kind_is_reported_as_outcome() {
        let svc = service(&[ChannelKind::Email]);
        let outcome = svc
            .send(ChannelKind::Sms, &OutboundMessage::new("+14155552671", "", "Hi"))
            .await;
        assert_matches!(
            outcome.status,
            SendStatus::Rejected(DeliveryError::Channel(CoreError::UnsupportedChannelKind(_)))
        );
    }

    #[tokio::test]
    async fn send_multiple_reports_each_kind() {
        let svc = service(&ChannelKind::ALL);
        // A device-token-shaped recipient: valid for push only.
        let message = OutboundMessage::new("device_token-123", "Registered", "See you there");

        let outcomes = svc
            .send_multiple(&[ChannelKind::Email, ChannelKind::Push, ChannelKind::Email], &message)
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[&ChannelKind::Email].is_success());
        assert!(outcomes[&ChannelKind::Push].is_success());
    }

    #[test]
    fn supported_kinds_follow_config() {
        let svc = service(&[ChannelKind::Push, ChannelKind::Email]);
        assert_eq!(svc.supported_kinds(), vec![ChannelKind::Email, ChannelKind::Push]);
    }
}

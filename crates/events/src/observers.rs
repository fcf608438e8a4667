//! Built-in observers.
//!
//! - [`EmailNotificationObserver`] mails a short notice for every lifecycle
//!   change to a fixed recipient list.
//! - [`AnalyticsObserver`] counts notifications per kind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use eventpro_core::{LifecycleKind, LifecycleNotification};
use futures::future::join_all;

use crate::bus::{Observer, ObserverError};
use crate::delivery::{NotificationChannel, OutboundMessage};

// ---------------------------------------------------------------------------
// EmailNotificationObserver
// ---------------------------------------------------------------------------

/// Sends an email per lifecycle change to every configured recipient.
pub struct EmailNotificationObserver {
    channel: Arc<dyn NotificationChannel>,
    recipients: Vec<String>,
}

impl EmailNotificationObserver {
    pub fn new(channel: Arc<dyn NotificationChannel>, recipients: Vec<String>) -> Self {
        Self {
            channel,
            recipients,
        }
    }
}

/// Subject and body for a lifecycle change.
pub fn compose_message(notification: &LifecycleNotification) -> (String, String) {
    let title = &notification.subject_title;
    let (subject, lead) = match notification.kind {
        LifecycleKind::Created => ("Event created", "has been created"),
        LifecycleKind::Updated => ("Event updated", "has been updated"),
        LifecycleKind::Cancelled => ("Event cancelled", "has been cancelled"),
        LifecycleKind::Completed => ("Event completed", "has finished. Thank you for attending"),
        LifecycleKind::RegistrationOpened => ("Registration open", "is now open for registration"),
        LifecycleKind::RegistrationClosed => ("Registration closed", "is no longer accepting registrations"),
    };
    let body = format!(
        "\"{title}\" {lead}.\n\nEvent id: {}\nTime: {}",
        notification.subject_id, notification.timestamp
    );
    (format!("{subject}: {title}"), body)
}

#[async_trait]
impl Observer for EmailNotificationObserver {
    fn name(&self) -> &str {
        "EmailNotificationObserver"
    }

    fn is_interested(&self, _kind: LifecycleKind) -> bool {
        true
    }

    async fn handle(&self, notification: &LifecycleNotification) -> Result<(), ObserverError> {
        if self.recipients.is_empty() {
            tracing::debug!(kind = %notification.kind, "No email recipients configured");
            return Ok(());
        }

        let (subject, body) = compose_message(notification);
        let metadata = serde_json::json!({
            "kind": notification.kind,
            "subject_id": notification.subject_id,
        });
        let messages: Vec<OutboundMessage> = self
            .recipients
            .iter()
            .map(|r| {
                OutboundMessage::new(r.clone(), subject.clone(), body.clone())
                    .with_metadata(metadata.clone())
            })
            .collect();

        let outcomes = join_all(messages.iter().map(|m| self.channel.send(m))).await;
        let delivered = outcomes.iter().filter(|o| o.is_success()).count();

        tracing::info!(
            kind = %notification.kind,
            subject_id = notification.subject_id,
            delivered,
            total = outcomes.len(),
            "Lifecycle emails sent"
        );

        if delivered == 0 {
            return Err(ObserverError::Failed(format!(
                "no lifecycle email delivered for {} ({} recipients)",
                notification.kind,
                outcomes.len()
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AnalyticsObserver
// ---------------------------------------------------------------------------

/// In-memory per-kind notification counter.
#[derive(Default)]
pub struct AnalyticsObserver {
    counts: Mutex<HashMap<LifecycleKind, u64>>,
}

impl AnalyticsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: LifecycleKind) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }
}

#[async_trait]
impl Observer for AnalyticsObserver {
    fn name(&self) -> &str {
        "AnalyticsObserver"
    }

    fn is_interested(&self, _kind: LifecycleKind) -> bool {
        true
    }

    async fn handle(&self, notification: &LifecycleNotification) -> Result<(), ObserverError> {
        let count = {
            let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = counts.entry(notification.kind).or_insert(0);
            *entry += 1;
            *entry
        };
        tracing::info!(
            kind = %notification.kind,
            title = %notification.subject_title,
            count,
            "Recorded lifecycle metric"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Typed entry point for raising lifecycle notifications.
//!
//! Owners of an event call one method per transition instead of building
//! [`LifecycleNotification`]s by hand. The publisher keeps no event state;
//! each call stamps a fresh notification and hands it to the shared bus.

use std::sync::Arc;

use eventpro_core::{EntityId, LifecycleKind, LifecycleNotification};
use serde_json::Value;

use crate::bus::EventBus;

/// Publishes lifecycle transitions onto a shared [`EventBus`].
#[derive(Clone)]
pub struct LifecyclePublisher {
    bus: Arc<EventBus>,
}

impl LifecyclePublisher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Build a `kind` notification for `(id, title)` and publish it.
    ///
    /// `payload` replaces the default empty object when given. Returns the
    /// number of observers the notification was dispatched to.
    pub async fn publish(
        &self,
        kind: LifecycleKind,
        id: EntityId,
        title: impl Into<String>,
        payload: Option<Value>,
    ) -> usize {
        let mut notification = LifecycleNotification::new(kind, id, title);
        if let Some(payload) = payload {
            notification = notification.with_payload(payload);
        }

        let dispatched = self.bus.publish(notification).await;
        tracing::info!(kind = %kind, subject_id = id, dispatched, "Lifecycle transition published");
        dispatched
    }

    pub async fn created(&self, id: EntityId, title: impl Into<String>, payload: Option<Value>) -> usize {
        self.publish(LifecycleKind::Created, id, title, payload).await
    }

    pub async fn updated(&self, id: EntityId, title: impl Into<String>, payload: Option<Value>) -> usize {
        self.publish(LifecycleKind::Updated, id, title, payload).await
    }

    pub async fn cancelled(&self, id: EntityId, title: impl Into<String>, payload: Option<Value>) -> usize {
        self.publish(LifecycleKind::Cancelled, id, title, payload).await
    }

    /// Publish `Completed`. Attach a certification request as `payload` to
    /// have certificates issued for the roster.
    pub async fn completed(&self, id: EntityId, title: impl Into<String>, payload: Option<Value>) -> usize {
        self.publish(LifecycleKind::Completed, id, title, payload).await
    }

    pub async fn registration_opened(
        &self,
        id: EntityId,
        title: impl Into<String>,
        payload: Option<Value>,
    ) -> usize {
        self.publish(LifecycleKind::RegistrationOpened, id, title, payload).await
    }

    pub async fn registration_closed(
        &self,
        id: EntityId,
        title: impl Into<String>,
        payload: Option<Value>,
    ) -> usize {
        self.publish(LifecycleKind::RegistrationClosed, id, title, payload).await
    }
}

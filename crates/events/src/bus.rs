//! In-process lifecycle event bus.
//!
//! [`EventBus`] keeps a copy-on-write list of [`Observer`]s and fans each
//! published [`LifecycleNotification`] out to the interested ones. Every
//! handler runs in its own tokio task, so a slow, failing or panicking
//! observer never holds up or disturbs the others. The bus is meant to be
//! constructed once and shared via `Arc<EventBus>`.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use eventpro_core::{LifecycleKind, LifecycleNotification};
use futures::FutureExt;
use tokio::task::JoinSet;

/// Default upper bound on a single observer invocation.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Error returned by an observer's handler. Logged by the bus, never
/// propagated to the publisher.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error("Observer failed: {0}")]
    Failed(String),

    #[error("Invalid notification payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// A listener for lifecycle notifications.
///
/// Observers must be `Send + Sync`; the bus may invoke the same observer
/// from several publishes at once.
#[async_trait]
pub trait Observer: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Whether this observer wants notifications of `kind`. The bus never
    /// calls [`handle`](Observer::handle) for a kind answered `false`.
    fn is_interested(&self, kind: LifecycleKind) -> bool;

    async fn handle(&self, notification: &LifecycleNotification) -> Result<(), ObserverError>;
}

/// Handle returned by [`EventBus::register`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Clone)]
struct Registration {
    id: ObserverId,
    observer: Arc<dyn Observer>,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Fan-out dispatcher for lifecycle notifications.
///
/// # Usage
///
/// ```rust,ignore
/// let bus = Arc::new(EventBus::default());
/// let id = bus.register(Arc::new(AnalyticsObserver::new()));
/// bus.publish(LifecycleNotification::new(LifecycleKind::Created, 1, "RustConf")).await;
/// bus.unregister(id);
/// ```
pub struct EventBus {
    /// Replaced wholesale on every register/unregister; publishers clone the
    /// inner `Arc` and iterate a list nobody else can change.
    observers: RwLock<Arc<Vec<Registration>>>,
    next_id: AtomicU64,
    handler_timeout: Duration,
}

impl EventBus {
    /// Create a bus whose observer invocations are bounded by `handler_timeout`.
    pub fn new(handler_timeout: Duration) -> Self {
        Self {
            observers: RwLock::new(Arc::new(Vec::new())),
            next_id: AtomicU64::new(1),
            handler_timeout,
        }
    }

    /// Add an observer. The same observer may be registered more than once;
    /// each registration receives its own id and its own deliveries.
    pub fn register(&self, observer: Arc<dyn Observer>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let name = observer.name().to_string();

        let mut guard = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(Registration { id, observer });
        *guard = Arc::new(next);
        let count = guard.len();
        drop(guard);

        tracing::info!(observer = %name, observer_count = count, "Observer registered");
        id
    }

    /// Remove a registration. Returns `false` if the id was not registered.
    ///
    /// A publish already in progress still delivers to the removed observer.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut guard = self.observers.write().unwrap_or_else(PoisonError::into_inner);
        let Some(pos) = guard.iter().position(|r| r.id == id) else {
            return false;
        };
        let mut next: Vec<Registration> = guard.iter().cloned().collect();
        let removed = next.remove(pos);
        *guard = Arc::new(next);
        let count = guard.len();
        drop(guard);

        tracing::info!(
            observer = %removed.observer.name(),
            observer_count = count,
            "Observer unregistered"
        );
        true
    }

    /// Deliver `notification` to every interested observer concurrently and
    /// wait until all of them have finished with it.
    ///
    /// Observer errors, panics and timeouts are logged here and go no
    /// further. Returns the number of observers the notification was
    /// dispatched to.
    pub async fn publish(&self, notification: LifecycleNotification) -> usize {
        let notification = Arc::new(notification);
        let snapshot = self.snapshot();

        let mut tasks = JoinSet::new();
        for registration in snapshot.iter() {
            if !interested(registration.observer.as_ref(), notification.kind) {
                continue;
            }
            let observer = Arc::clone(&registration.observer);
            let notification = Arc::clone(&notification);
            let timeout = self.handler_timeout;
            tasks.spawn(async move {
                invoke(observer.as_ref(), &notification, timeout).await;
            });
        }

        let dispatched = tasks.len();
        tracing::debug!(
            kind = %notification.kind,
            subject_id = notification.subject_id,
            registered = snapshot.len(),
            dispatched,
            "Publishing lifecycle notification"
        );

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                // Panics are caught inside `invoke`; this only fires if the
                // runtime aborted the task.
                tracing::error!(error = %e, "Observer task did not complete");
            }
        }

        dispatched
    }

    /// Number of current registrations.
    pub fn observer_count(&self) -> usize {
        self.snapshot().len()
    }

    /// Names of the current registrations, in registration order.
    pub fn observer_names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|r| r.observer.name().to_string())
            .collect()
    }

    fn snapshot(&self) -> Arc<Vec<Registration>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLER_TIMEOUT)
    }
}

/// Ask an observer whether it wants `kind`. A panic counts as "not interested".
fn interested(observer: &dyn Observer, kind: LifecycleKind) -> bool {
    match std::panic::catch_unwind(AssertUnwindSafe(|| observer.is_interested(kind))) {
        Ok(interested) => interested,
        Err(panic) => {
            tracing::error!(
                observer = %observer.name(),
                kind = %kind,
                panic = %panic_message(panic.as_ref()),
                "Observer panicked in interest check, skipping"
            );
            false
        }
    }
}

/// Run one observer against one notification, logging any failure.
async fn invoke(observer: &dyn Observer, notification: &LifecycleNotification, timeout: Duration) {
    let name = observer.name();
    let handled = AssertUnwindSafe(observer.handle(notification)).catch_unwind();

    match tokio::time::timeout(timeout, handled).await {
        Ok(Ok(Ok(()))) => {
            tracing::debug!(observer = %name, kind = %notification.kind, "Observer handled notification");
        }
        Ok(Ok(Err(e))) => {
            tracing::error!(
                observer = %name,
                kind = %notification.kind,
                error = %e,
                "Observer failed to handle notification"
            );
        }
        Ok(Err(panic)) => {
            tracing::error!(
                observer = %name,
                kind = %notification.kind,
                panic = %panic_message(panic.as_ref()),
                "Observer panicked while handling notification"
            );
        }
        Err(_) => {
            tracing::error!(
                observer = %name,
                kind = %notification.kind,
                timeout_ms = timeout.as_millis() as u64,
                "Observer timed out handling notification"
            );
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every notification it handles; interested in a fixed set of kinds.
    struct Recorder {
        name: String,
        kinds: Vec<LifecycleKind>,
        seen: Mutex<Vec<LifecycleKind>>,
    }

    impl Recorder {
        fn new(name: &str, kinds: &[LifecycleKind]) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                kinds: kinds.to_vec(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<LifecycleKind> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Observer for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_interested(&self, kind: LifecycleKind) -> bool {
            self.kinds.contains(&kind)
        }

        async fn handle(&self, n: &LifecycleNotification) -> Result<(), ObserverError> {
            self.seen.lock().unwrap().push(n.kind);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Observer for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn is_interested(&self, _kind: LifecycleKind) -> bool {
            true
        }

        async fn handle(&self, _n: &LifecycleNotification) -> Result<(), ObserverError> {
            Err(ObserverError::Failed("boom".into()))
        }
    }

    fn notification(kind: LifecycleKind) -> LifecycleNotification {
        LifecycleNotification::new(kind, 1, "RustConf")
    }

    #[tokio::test]
    async fn delivers_only_to_interested_observers() {
        let bus = EventBus::default();
        let completed = Recorder::new("completed-only", &[LifecycleKind::Completed]);
        let all = Recorder::new("all", &LifecycleKind::ALL);
        bus.register(completed.clone());
        bus.register(all.clone());

        for kind in LifecycleKind::ALL {
            bus.publish(notification(kind)).await;
        }

        assert_eq!(completed.seen(), vec![LifecycleKind::Completed]);
        assert_eq!(all.seen().len(), LifecycleKind::ALL.len());
    }

    #[tokio::test]
    async fn publish_returns_dispatch_count() {
        let bus = EventBus::default();
        bus.register(Recorder::new("a", &[LifecycleKind::Created]));
        bus.register(Recorder::new("b", &[LifecycleKind::Updated]));

        assert_eq!(bus.publish(notification(LifecycleKind::Created)).await, 1);
        assert_eq!(bus.publish(notification(LifecycleKind::Cancelled)).await, 0);
    }

    #[tokio::test]
    async fn failing_observer_does_not_block_others() {
        let bus = EventBus::default();
        let recorder = Recorder::new("recorder", &LifecycleKind::ALL);
        bus.register(Arc::new(Failing));
        bus.register(recorder.clone());

        bus.publish(notification(LifecycleKind::Updated)).await;

        assert_eq!(recorder.seen(), vec![LifecycleKind::Updated]);
    }

    #[tokio::test]
    async fn unregister_stops_delivery() {
        let bus = EventBus::default();
        let recorder = Recorder::new("recorder", &LifecycleKind::ALL);
        let id = bus.register(recorder.clone());

        assert!(bus.unregister(id));
        assert!(!bus.unregister(id));
        bus.publish(notification(LifecycleKind::Created)).await;

        assert!(recorder.seen().is_empty());
        assert_eq!(bus.observer_count(), 0);
    }

    #[test]
    fn observer_names_follow_registration_order() {
        let bus = EventBus::default();
        bus.register(Recorder::new("first", &[]));
        bus.register(Arc::new(Failing));
        assert_eq!(bus.observer_names(), vec!["first", "failing"]);
    }

    #[test]
    fn panic_message_extracts_strings() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}

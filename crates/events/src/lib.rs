//! EventPro lifecycle event bus and notification delivery.
//!
//! - [`EventBus`]: in-process fan-out of [`LifecycleNotification`]s to
//!   registered [`Observer`]s, each invoked concurrently and in isolation.
//! - [`LifecyclePublisher`]: one method per lifecycle transition, so event
//!   owners never build notifications by hand.
//! - [`observers`]: built-in observers (email notification, analytics).
//! - [`delivery`]: email/SMS/push channels, the [`ChannelFactory`] that
//!   builds them and the [`NotificationService`] convenience layer.
//! - [`DeliveryConfig`]: environment-driven channel settings.
//!
//! [`LifecycleNotification`]: eventpro_core::LifecycleNotification

pub mod bus;
pub mod config;
pub mod delivery;
pub mod observers;
pub mod publisher;

pub use bus::{EventBus, Observer, ObserverError, ObserverId};
pub use config::DeliveryConfig;
pub use delivery::factory::ChannelFactory;
pub use delivery::service::NotificationService;
pub use delivery::{
    DeliveryError, NotificationChannel, OutboundMessage, SendOutcome, SendStatus, Transmitter,
};
pub use observers::{AnalyticsObserver, EmailNotificationObserver};
pub use publisher::LifecyclePublisher;

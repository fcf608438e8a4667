//! Domain types shared by the EventPro notification and certificate crates.
//!
//! Everything here is plain data: lifecycle notifications, event context,
//! participant rosters and certificate records. The crate has no internal
//! dependencies so both the event bus and the certificate pipeline can use it.

pub mod certificate;
pub mod channels;
pub mod config;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod participant;
pub mod types;

pub use certificate::{CertificateKind, CertificateRecord};
pub use channels::ChannelKind;
pub use error::CoreError;
pub use event::{EventContext, EventType};
pub use lifecycle::{LifecycleKind, LifecycleNotification};
pub use participant::ParticipantRecord;
pub use types::{EntityId, Timestamp};

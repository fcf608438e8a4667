//! Lifecycle transitions of an event and the notification raised for each.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// LifecycleKind
// ---------------------------------------------------------------------------

/// The transition an event went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleKind {
    Created,
    Updated,
    Cancelled,
    Completed,
    RegistrationOpened,
    RegistrationClosed,
}

impl LifecycleKind {
    pub const ALL: [LifecycleKind; 6] = [
        LifecycleKind::Created,
        LifecycleKind::Updated,
        LifecycleKind::Cancelled,
        LifecycleKind::Completed,
        LifecycleKind::RegistrationOpened,
        LifecycleKind::RegistrationClosed,
    ];

    /// Dotted name used in log fields, e.g. `"event.completed"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleKind::Created => "event.created",
            LifecycleKind::Updated => "event.updated",
            LifecycleKind::Cancelled => "event.cancelled",
            LifecycleKind::Completed => "event.completed",
            LifecycleKind::RegistrationOpened => "event.registration_opened",
            LifecycleKind::RegistrationClosed => "event.registration_closed",
        }
    }
}

impl fmt::Display for LifecycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LifecycleNotification
// ---------------------------------------------------------------------------

/// A lifecycle change raised by whoever owns the event.
///
/// Constructed via [`LifecycleNotification::new`] and optionally enriched with
/// [`with_payload`](LifecycleNotification::with_payload). Once handed to the
/// bus it is shared behind an `Arc` and never modified again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleNotification {
    /// Id of the event that changed.
    pub subject_id: EntityId,

    /// Title of the event at the time of the change.
    pub subject_title: String,

    pub kind: LifecycleKind,

    /// When the notification was created (UTC).
    pub timestamp: Timestamp,

    /// Free-form JSON carried to observers. The bus never inspects it.
    pub payload: serde_json::Value,
}

impl LifecycleNotification {
    /// Create a notification with an empty object payload, stamped now.
    pub fn new(kind: LifecycleKind, subject_id: EntityId, subject_title: impl Into<String>) -> Self {
        Self {
            subject_id,
            subject_title: subject_title.into(),
            kind,
            timestamp: Utc::now(),
            payload: serde_json::Value::Object(Default::default()),
        }
    }

    /// Set the JSON payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notification_has_empty_object_payload() {
        let n = LifecycleNotification::new(LifecycleKind::Created, 7, "RustConf");
        assert_eq!(n.subject_id, 7);
        assert_eq!(n.subject_title, "RustConf");
        assert_eq!(n.kind, LifecycleKind::Created);
        assert!(n.payload.is_object());
    }

    #[test]
    fn kind_names_are_distinct() {
        let mut names: Vec<&str> = LifecycleKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), LifecycleKind::ALL.len());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&LifecycleKind::RegistrationOpened).unwrap();
        assert_eq!(json, "\"registration_opened\"");
    }
}

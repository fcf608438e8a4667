//! The minimal view of an event the certificate pipeline needs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

/// Kind of event being run.
///
/// Parsing never fails: names outside the known set are preserved in
/// [`EventType::Other`] so callers can still fall back to a default.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Conference,
    Seminar,
    Workshop,
    Webinar,
    Course,
    Meetup,
    Other(String),
}

impl EventType {
    /// Case-insensitive parse of an event type name.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "conference" => EventType::Conference,
            "seminar" => EventType::Seminar,
            "workshop" => EventType::Workshop,
            "webinar" => EventType::Webinar,
            "course" => EventType::Course,
            "meetup" => EventType::Meetup,
            _ => EventType::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::Conference => "conference",
            EventType::Seminar => "seminar",
            EventType::Workshop => "workshop",
            EventType::Webinar => "webinar",
            EventType::Course => "course",
            EventType::Meetup => "meetup",
            EventType::Other(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            EventType::Conference => "Conference",
            EventType::Seminar => "Seminar",
            EventType::Workshop => "Workshop",
            EventType::Webinar => "Webinar",
            EventType::Course => "Course",
            EventType::Meetup => "Meetup",
            EventType::Other(name) => name,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EventType::parse(&name))
    }
}

// ---------------------------------------------------------------------------
// EventContext
// ---------------------------------------------------------------------------

/// Read-only event data handed to certificate strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventContext {
    pub id: EntityId,
    pub title: String,
    pub event_type: EventType,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

impl EventContext {
    /// Whole hours between start and end, truncated. Zero when the end does
    /// not come after the start.
    pub fn duration_hours(&self) -> u32 {
        let hours = (self.end_time - self.start_time).num_hours();
        u32::try_from(hours.max(0)).unwrap_or(u32::MAX)
    }
}

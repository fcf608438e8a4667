//! Participant rosters supplied by the caller.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::EntityId;

/// Maximum length of a participant display name, in characters.
pub const MAX_DISPLAY_NAME_LEN: u64 = 200;

/// One attendee of an event. Read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParticipantRecord {
    pub id: EntityId,

    #[validate(length(min = 1, max = MAX_DISPLAY_NAME_LEN))]
    pub display_name: String,

    /// Email address, phone number or device token, depending on channel.
    pub contact_address: String,

    pub attendance_hours: u32,

    pub attended: bool,
}

impl ParticipantRecord {
    pub fn new(
        id: EntityId,
        display_name: impl Into<String>,
        contact_address: impl Into<String>,
        attendance_hours: u32,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            contact_address: contact_address.into(),
            attendance_hours,
            attended: true,
        }
    }

    /// Check the record is well-formed enough to put on a certificate.
    pub fn ensure_well_formed(&self) -> Result<(), CoreError> {
        self.validate().map_err(|e| {
            CoreError::Validation(format!("participant {}: {e}", self.id))
        })
    }
}

//! Notification channel kinds.
//!
//! The string constants are the canonical lowercase names accepted from
//! configuration (`NOTIFY_CHANNELS`) and used in log fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Email delivered to an RFC-like mailbox address.
pub const CHANNEL_EMAIL: &str = "email";

/// SMS delivered to an E.164-like phone number.
pub const CHANNEL_SMS: &str = "sms";

/// Push notification delivered to an opaque device token.
pub const CHANNEL_PUSH: &str = "push";

/// The closed set of delivery mechanisms a notification can travel over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Email,
    Sms,
    Push,
}

impl ChannelKind {
    /// Every known channel kind, in display order.
    pub const ALL: [ChannelKind; 3] = [ChannelKind::Email, ChannelKind::Sms, ChannelKind::Push];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Email => CHANNEL_EMAIL,
            ChannelKind::Sms => CHANNEL_SMS,
            ChannelKind::Push => CHANNEL_PUSH,
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            ChannelKind::Email => "Email",
            ChannelKind::Sms => "SMS",
            ChannelKind::Push => "Push Notification",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = CoreError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            CHANNEL_EMAIL => Ok(ChannelKind::Email),
            CHANNEL_SMS => Ok(ChannelKind::Sms),
            CHANNEL_PUSH => Ok(ChannelKind::Push),
            _ => Err(CoreError::UnsupportedChannelKind(s.to_string())),
        }
    }
}

//! SMS notification channel.
//!
//! Recipients are E.164-style numbers with an optional leading `+`. Only
//! ASCII digits are accepted.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use eventpro_core::ChannelKind;
use regex::Regex;

use super::{NotificationChannel, Transmitter};

/// Single-segment SMS limit.
pub const SMS_MAX_LENGTH: usize = 160;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{1,14}$").expect("valid regex"));

pub struct SmsChannel {
    transmitter: Arc<dyn Transmitter>,
}

impl SmsChannel {
    pub fn new(transmitter: Arc<dyn Transmitter>) -> Self {
        Self { transmitter }
    }
}

#[async_trait]
impl NotificationChannel for SmsChannel {
    fn channel_kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    fn validate_recipient(&self, address: &str) -> bool {
        PHONE_RE.is_match(address)
    }

    fn max_message_length(&self) -> usize {
        SMS_MAX_LENGTH
    }

    fn transmitter(&self) -> &dyn Transmitter {
        self.transmitter.as_ref()
    }
}

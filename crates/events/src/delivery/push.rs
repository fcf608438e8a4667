//! Push notification channel.
//!
//! Recipients are opaque device tokens: longer than 10 characters, made of
//! ASCII letters, digits, `_` and `-`.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use eventpro_core::ChannelKind;
use regex::Regex;

use super::{NotificationChannel, Transmitter};

/// Typical push payload text limit.
pub const PUSH_MAX_LENGTH: usize = 256;

/// Tokens must be strictly longer than this.
const MIN_TOKEN_LEN: usize = 10;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"));

pub struct PushChannel {
    transmitter: Arc<dyn Transmitter>,
}

impl PushChannel {
    pub fn new(transmitter: Arc<dyn Transmitter>) -> Self {
        Self { transmitter }
    }
}

#[async_trait]
impl NotificationChannel for PushChannel {
    fn channel_kind(&self) -> ChannelKind {
        ChannelKind::Push
    }

    fn validate_recipient(&self, address: &str) -> bool {
        address.len() > MIN_TOKEN_LEN && TOKEN_RE.is_match(address)
    }

    fn max_message_length(&self) -> usize {
        PUSH_MAX_LENGTH
    }

    fn transmitter(&self) -> &dyn Transmitter {
        self.transmitter.as_ref()
    }
}

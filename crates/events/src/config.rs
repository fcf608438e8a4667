//! Delivery configuration loaded from environment variables.
//!
//! | Variable                  | Default          |
//! |---------------------------|------------------|
//! | `NOTIFY_CHANNELS`         | `email,sms,push` |
//! | `NOTIFY_EMAIL_LATENCY_MS` | `1000`           |
//! | `NOTIFY_SMS_LATENCY_MS`   | `800`            |
//! | `NOTIFY_PUSH_LATENCY_MS`  | `500`            |
//! | `OBSERVER_TIMEOUT_SECS`   | `30`             |

use std::collections::BTreeSet;
use std::time::Duration;

use eventpro_core::config::{env_millis, env_opt, env_secs, ConfigError};
use eventpro_core::ChannelKind;

use crate::bus::DEFAULT_HANDLER_TIMEOUT;

const DEFAULT_EMAIL_LATENCY: Duration = Duration::from_millis(1000);
const DEFAULT_SMS_LATENCY: Duration = Duration::from_millis(800);
const DEFAULT_PUSH_LATENCY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Channel kinds the factory will build. Anything else is unsupported.
    pub enabled: BTreeSet<ChannelKind>,
    pub email_latency: Duration,
    pub sms_latency: Duration,
    pub push_latency: Duration,
    /// Upper bound on one observer invocation on the event bus.
    pub observer_timeout: Duration,
}

impl DeliveryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let enabled = match env_opt::<String>("NOTIFY_CHANNELS")? {
            Some(list) => parse_channel_list(&list)?,
            None => ChannelKind::ALL.into_iter().collect(),
        };

        Ok(Self {
            enabled,
            email_latency: env_millis("NOTIFY_EMAIL_LATENCY_MS", DEFAULT_EMAIL_LATENCY)?,
            sms_latency: env_millis("NOTIFY_SMS_LATENCY_MS", DEFAULT_SMS_LATENCY)?,
            push_latency: env_millis("NOTIFY_PUSH_LATENCY_MS", DEFAULT_PUSH_LATENCY)?,
            observer_timeout: env_secs("OBSERVER_TIMEOUT_SECS", DEFAULT_HANDLER_TIMEOUT)?,
        })
    }

    /// Every channel enabled with no simulated latency. Used by tests.
    pub fn immediate() -> Self {
        Self {
            email_latency: Duration::ZERO,
            sms_latency: Duration::ZERO,
            push_latency: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn latency(&self, kind: ChannelKind) -> Duration {
        match kind {
            ChannelKind::Email => self.email_latency,
            ChannelKind::Sms => self.sms_latency,
            ChannelKind::Push => self.push_latency,
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            enabled: ChannelKind::ALL.into_iter().collect(),
            email_latency: DEFAULT_EMAIL_LATENCY,
            sms_latency: DEFAULT_SMS_LATENCY,
            push_latency: DEFAULT_PUSH_LATENCY,
            observer_timeout: DEFAULT_HANDLER_TIMEOUT,
        }
    }
}

/// Parse a comma-separated channel list such as `"email, push"`.
fn parse_channel_list(list: &str) -> Result<BTreeSet<ChannelKind>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|name| {
            name.parse::<ChannelKind>().map_err(|e| ConfigError::Invalid {
                var: "NOTIFY_CHANNELS",
                value: list.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

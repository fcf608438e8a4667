//! Certificate configuration loaded from environment variables.
//!
//! | Variable                   | Default         |
//! |----------------------------|-----------------|
//! | `CERT_OUTPUT_ROOT`         | `/certificates` |
//! | `CERT_STANDARD_DELAY_MS`   | `1000`          |
//! | `CERT_PREMIUM_DELAY_MS`    | `2000`          |
//! | `CERT_COMPLETION_DELAY_MS` | `1500`          |
//! | `CERT_ROSTER_TIMEOUT_SECS` | unset           |

use std::time::Duration;

use eventpro_core::config::{env_millis, env_opt, env_or, ConfigError};

pub const DEFAULT_OUTPUT_ROOT: &str = "/certificates";

const DEFAULT_STANDARD_DELAY: Duration = Duration::from_millis(1000);
const DEFAULT_PREMIUM_DELAY: Duration = Duration::from_millis(2000);
const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
pub struct CertificateConfig {
    /// Directory under which certificate files are addressed.
    pub output_root: String,
    pub standard_delay: Duration,
    pub premium_delay: Duration,
    pub completion_delay: Duration,
    /// When set, a roster still running after this long is cancelled.
    pub roster_timeout: Option<Duration>,
}

impl CertificateConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            output_root: env_or("CERT_OUTPUT_ROOT", DEFAULT_OUTPUT_ROOT.to_string())?,
            standard_delay: env_millis("CERT_STANDARD_DELAY_MS", DEFAULT_STANDARD_DELAY)?,
            premium_delay: env_millis("CERT_PREMIUM_DELAY_MS", DEFAULT_PREMIUM_DELAY)?,
            completion_delay: env_millis("CERT_COMPLETION_DELAY_MS", DEFAULT_COMPLETION_DELAY)?,
            roster_timeout: env_opt::<u64>("CERT_ROSTER_TIMEOUT_SECS")?.map(Duration::from_secs),
        })
    }

    /// Default settings with no processing delay. Used by tests.
    pub fn immediate() -> Self {
        Self {
            standard_delay: Duration::ZERO,
            premium_delay: Duration::ZERO,
            completion_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_roster_timeout(mut self, timeout: Duration) -> Self {
        self.roster_timeout = Some(timeout);
        self
    }
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            output_root: DEFAULT_OUTPUT_ROOT.to_string(),
            standard_delay: DEFAULT_STANDARD_DELAY,
            premium_delay: DEFAULT_PREMIUM_DELAY,
            completion_delay: DEFAULT_COMPLETION_DELAY,
            roster_timeout: None,
        }
    }
}

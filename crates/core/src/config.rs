//! Helpers for reading configuration from environment variables.
//!
//! Every setting has a default; a variable that is set but cannot be parsed
//! is reported instead of silently falling back.

use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Read and parse `var`, returning `None` when it is unset or blank.
pub fn env_opt<T>(var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        _ => Ok(None),
    }
}

/// Read and parse `var`, falling back to `default` when unset.
pub fn env_or<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(env_opt(var)?.unwrap_or(default))
}

/// Read a millisecond duration, falling back to `default`.
pub fn env_millis(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    Ok(env_opt::<u64>(var)?
        .map(Duration::from_millis)
        .unwrap_or(default))
}

/// Read a whole-second duration, falling back to `default`.
pub fn env_secs(var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    Ok(env_opt::<u64>(var)?
        .map(Duration::from_secs)
        .unwrap_or(default))
}

//! Serde adapter for human-readable durations (`"30s"`, `"1h 30m"`).
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct Cfg {
//!     #[serde(with = "elevate_security::serde_duration")]
//!     timeout: Duration,
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// # Errors
///
/// Returns the serializer's error.
pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*value))
}

/// # Errors
///
/// Fails if the value is not a string humantime can parse.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

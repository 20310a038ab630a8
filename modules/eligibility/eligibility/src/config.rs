//! Configuration for eligibility evaluation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EligibilityConfig {
    /// Upper bound for a single policy backend query.
    #[serde(with = "elevate_security::serde_duration")]
    pub backend_timeout: Duration,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            backend_timeout: Duration::from_secs(30),
        }
    }
}

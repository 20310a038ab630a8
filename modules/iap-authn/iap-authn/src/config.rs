//! Configuration for IAP authentication.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the proxy publishes its assertion signing keys.
pub const DEFAULT_JWKS_URL: &str = "https://www.gstatic.com/iap/verify/public_key-jwk";

/// Signing-key retrieval and assertion verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IapAuthnConfig {
    /// JWK set endpoint of the proxy.
    pub jwks_url: String,

    /// How often the key set is re-fetched once one is cached.
    #[serde(with = "elevate_security::serde_duration")]
    pub refresh_interval: Duration,

    /// Retry delay while no key set has been fetched yet.
    #[serde(with = "elevate_security::serde_duration")]
    pub retry_interval: Duration,

    /// Minimum gap between refreshes triggered by unknown key ids.
    #[serde(with = "elevate_security::serde_duration")]
    pub min_refresh_gap: Duration,

    /// Timeout of a single key set request.
    #[serde(with = "elevate_security::serde_duration")]
    pub fetch_timeout: Duration,

    /// Clock skew tolerated when checking `exp`.
    #[serde(with = "elevate_security::serde_duration")]
    pub leeway: Duration,
}

impl Default for IapAuthnConfig {
    fn default() -> Self {
        Self {
            jwks_url: DEFAULT_JWKS_URL.to_owned(),
            refresh_interval: Duration::from_secs(3600),
            retry_interval: Duration::from_secs(5),
            min_refresh_gap: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(10),
            leeway: Duration::from_secs(60),
        }
    }
}

/// Execution mode of the deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Every request must carry a verified assertion.
    #[default]
    Production,
    /// Local development and tests; a static principal may be configured.
    Development,
}

/// Deployment identifiers and the development-only principal override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Numeric project number.
    pub project_number: String,

    /// Project (application) id.
    pub project_id: String,

    pub mode: ExecutionMode,

    /// Principal used for every request instead of the assertion.
    /// Rejected in `production` mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_principal: Option<StaticPrincipalConfig>,
}

/// Identity of the static principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticPrincipalConfig {
    /// E-mail address, also used as subject id.
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    #[serde(default)]
    pub access_levels: Vec<String>,
}

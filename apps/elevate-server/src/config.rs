//! Server configuration: YAML file overlaid with `ELEVATE__` environment variables.

use std::path::Path;

use anyhow::{Context, bail};
use eligibility::EligibilityConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use iap_authn::{IapAuthnConfig, RuntimeConfig};
use serde::{Deserialize, Serialize};
use static_policy_plugin::StaticPolicyPluginConfig;

/// Prefix of environment variables; `__` separates nested keys,
/// e.g. `ELEVATE__RUNTIME__PROJECT_ID`.
pub const ENV_PREFIX: &str = "ELEVATE__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub runtime: RuntimeConfig,
    pub iap: IapAuthnConfig,
    pub eligibility: EligibilityConfig,
    pub policy: StaticPolicyPluginConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directives used when `RUST_LOG` is not set.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load defaults, then `path` (if given), then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or the merged configuration
    /// does not deserialize.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file {} not found", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }
}

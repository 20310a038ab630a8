//! Runtime environment backed by configuration.

use elevate_security::device::UNKNOWN_DEVICE_ID;
use elevate_security::{DeviceInfo, TrustedPrincipal, UserId, UserIdError};
use iap_authn_sdk::RuntimeEnvironment;
use thiserror::Error;

use crate::config::{ExecutionMode, RuntimeConfig};

#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("runtime setting '{0}' is required")]
    Missing(&'static str),

    #[error("a static principal must not be configured in production mode")]
    StaticPrincipalInProduction,

    #[error("invalid static principal: {0}")]
    InvalidStaticPrincipal(#[from] UserIdError),
}

/// [`RuntimeEnvironment`] built once from [`RuntimeConfig`] at startup.
#[derive(Debug, Clone)]
pub struct ConfiguredEnvironment {
    project_number: String,
    project_id: String,
    static_principal: Option<TrustedPrincipal>,
}

impl ConfiguredEnvironment {
    /// Validate the configuration and build the environment.
    ///
    /// # Errors
    ///
    /// - project number or id missing
    /// - static principal configured in [`ExecutionMode::Production`]
    /// - static principal e-mail invalid
    pub fn from_config(cfg: &RuntimeConfig) -> Result<Self, EnvironmentError> {
        if cfg.project_number.trim().is_empty() {
            return Err(EnvironmentError::Missing("project_number"));
        }
        if cfg.project_id.trim().is_empty() {
            return Err(EnvironmentError::Missing("project_id"));
        }

        let static_principal = match (&cfg.static_principal, cfg.mode) {
            (None, _) => None,
            (Some(_), ExecutionMode::Production) => {
                return Err(EnvironmentError::StaticPrincipalInProduction);
            }
            (Some(identity), ExecutionMode::Development) => {
                let id = UserId::from_email(&identity.email)?;
                let device = DeviceInfo::new(
                    identity.device_id.as_deref().unwrap_or(UNKNOWN_DEVICE_ID),
                    identity.access_levels.clone(),
                );
                tracing::warn!(
                    principal = %id,
                    "Static principal configured; IAP assertions will NOT be verified. \
                     Do NOT use this configuration in production."
                );
                Some(TrustedPrincipal::new(id, device))
            }
        };

        Ok(Self {
            project_number: cfg.project_number.trim().to_owned(),
            project_id: cfg.project_id.trim().to_owned(),
            static_principal,
        })
    }
}

impl RuntimeEnvironment for ConfiguredEnvironment {
    fn project_number(&self) -> &str {
        &self.project_number
    }

    fn project_id(&self) -> &str {
        &self.project_id
    }

    fn static_principal(&self) -> Option<&TrustedPrincipal> {
        self.static_principal.as_ref()
    }
}

//! Service implementation for the static policy plugin.

use anyhow::{Context, bail};
use eligibility_sdk::{BindingQuery, CandidateBinding};

use crate::config::{PolicyMode, StaticBindingConfig, StaticPolicyPluginConfig};

/// A member reference a binding applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Member {
    User(String),
    Domain(String),
}

impl Member {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        let raw = raw.trim();
        if let Some(email) = raw.strip_prefix("user:") {
            if !email.contains('@') {
                bail!("member '{raw}' is not a user e-mail");
            }
            return Ok(Self::User(email.to_ascii_lowercase()));
        }
        if let Some(domain) = raw.strip_prefix("domain:") {
            if domain.is_empty() || domain.contains('@') {
                bail!("member '{raw}' is not a domain");
            }
            return Ok(Self::Domain(domain.to_ascii_lowercase()));
        }
        bail!("member '{raw}' must start with 'user:' or 'domain:'")
    }

    fn matches(&self, email: &str) -> bool {
        match self {
            Self::User(user) => user.eq_ignore_ascii_case(email),
            Self::Domain(domain) => email
                .rsplit_once('@')
                .is_some_and(|(_, d)| d.eq_ignore_ascii_case(domain)),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    binding: CandidateBinding,
    members: Vec<Member>,
    required_access_level: Option<String>,
}

impl Entry {
    fn from_config(cfg: &StaticBindingConfig) -> anyhow::Result<Self> {
        if cfg.members.is_empty() {
            bail!("binding '{}' has no members", cfg.id);
        }
        let members = cfg
            .members
            .iter()
            .map(|m| Member::parse(m))
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(|| format!("binding '{}'", cfg.id))?;

        Ok(Self {
            binding: CandidateBinding {
                id: cfg.id.clone(),
                role: cfg.role.clone(),
                resource: cfg.resource.clone(),
                condition: cfg.condition.clone(),
            },
            members,
            required_access_level: cfg.required_access_level.clone(),
        })
    }

    fn applies_to(&self, query: &BindingQuery) -> bool {
        let email = query.user.email();
        self.members.iter().any(|m| m.matches(email))
            && self
                .required_access_level
                .as_deref()
                .is_none_or(|level| query.device.has_access_level(level))
    }
}

/// Static policy backend service.
///
/// Binding contents are reported as configured; validating them is up to
/// the evaluator.
#[derive(Debug, Clone, Default)]
pub struct Service {
    mode: PolicyMode,
    entries: Vec<Entry>,
}

impl Service {
    /// Build the service from plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a binding has no members or a malformed member.
    pub fn from_config(cfg: &StaticPolicyPluginConfig) -> anyhow::Result<Self> {
        let entries = cfg
            .bindings
            .iter()
            .map(Entry::from_config)
            .collect::<anyhow::Result<Vec<_>>>()?;

        tracing::info!(
            mode = ?cfg.mode,
            bindings = entries.len(),
            "Static policy backend configured"
        );

        Ok(Self {
            mode: cfg.mode,
            entries,
        })
    }

    #[must_use]
    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    /// Bindings that apply to `query`, in configuration order.
    #[must_use]
    pub fn find(&self, query: &BindingQuery) -> Vec<CandidateBinding> {
        self.entries
            .iter()
            .filter(|e| e.applies_to(query))
            .map(|e| e.binding.clone())
            .collect()
    }
}

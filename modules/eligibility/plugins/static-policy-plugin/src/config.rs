//! Configuration for the static policy plugin.

use serde::{Deserialize, Serialize};

/// Plugin configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticPolicyPluginConfig {
    pub mode: PolicyMode,

    /// Bindings in the order they are reported.
    pub bindings: Vec<StaticBindingConfig>,
}

/// Backend behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Answer from the configured bindings.
    #[default]
    Configured,
    /// Fail every query as unreachable.
    Unavailable,
}

/// One configured binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticBindingConfig {
    pub id: String,
    pub role: String,
    pub resource: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Principals the binding applies to (`user:<email>` or `domain:<domain>`).
    pub members: Vec<String>,

    /// Access level the caller's device must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_access_level: Option<String>,
}

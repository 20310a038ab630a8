use serde::{Deserialize, Serialize};

/// Device id reported when the proxy did not attach device claims.
pub const UNKNOWN_DEVICE_ID: &str = "unknown";

/// Device posture of the caller as attested by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    device_id: String,
    #[serde(default)]
    access_levels: Vec<String>,
}

impl DeviceInfo {
    #[must_use]
    pub fn new(device_id: impl Into<String>, access_levels: Vec<String>) -> Self {
        Self {
            device_id: device_id.into(),
            access_levels,
        }
    }

    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Access levels the device satisfies, in the order the proxy listed them.
    #[must_use]
    pub fn access_levels(&self) -> &[String] {
        &self.access_levels
    }

    #[must_use]
    pub fn has_access_level(&self, level: &str) -> bool {
        self.access_levels.iter().any(|l| l == level)
    }

    /// Whether any device claims were attached.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.device_id != UNKNOWN_DEVICE_ID || !self.access_levels.is_empty()
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            device_id: UNKNOWN_DEVICE_ID.to_owned(),
            access_levels: Vec::new(),
        }
    }
}

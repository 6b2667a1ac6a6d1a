// ABOUTME: Service configuration: wildcard group and page capability keys.
// ABOUTME: Parsed from YAML; defaults match the platform's standard keys.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

/// Default group value meaning "every user" inside a role's group set.
pub const DEFAULT_WILDCARD_GROUP: &str = "$anyuser";

/// Tunables the sharing engine reads. Everything has a default, so an
/// embedder without a config file can use `ServiceConfig::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Group value treated as the "all users" wildcard in role group sets.
    #[serde(default = "default_wildcard_group")]
    pub wildcard_group: String,

    #[serde(default)]
    pub capabilities: CapabilityKeys,
}

/// Page-level capability keys evaluated through the access-check primitive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityKeys {
    /// Required to share images the caller owns.
    #[serde(default = "default_share_own")]
    pub share_own: String,

    /// Required to re-share images received from someone else.
    #[serde(default = "default_share_received")]
    pub share_received: String,

    /// Required to terminate images the caller owns.
    #[serde(default = "default_terminate_own")]
    pub terminate_own: String,
}

fn default_wildcard_group() -> String {
    DEFAULT_WILDCARD_GROUP.to_string()
}

fn default_share_own() -> String {
    "/api/image/share".to_string()
}

fn default_share_received() -> String {
    "/api/image/shareReceived".to_string()
}

fn default_terminate_own() -> String {
    "/api/image/terminate".to_string()
}

impl Default for CapabilityKeys {
    fn default() -> Self {
        Self {
            share_own: default_share_own(),
            share_received: default_share_received(),
            terminate_own: default_terminate_own(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            wildcard_group: default_wildcard_group(),
            capabilities: CapabilityKeys::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.wildcard_group.is_empty() {
            return Err(Error::InvalidConfig(
                "wildcard_group cannot be empty".to_string(),
            ));
        }
        if self.capabilities.share_own.is_empty()
            || self.capabilities.share_received.is_empty()
            || self.capabilities.terminate_own.is_empty()
        {
            return Err(Error::InvalidConfig(
                "capability keys cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

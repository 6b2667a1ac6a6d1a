// ABOUTME: The generic role-check primitive and the caller identity it sees.
// ABOUTME: One boolean primitive covers page capabilities and image monikers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Authenticated caller identity threaded through every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub name: String,
    /// Bearer token forwarded to the provisioning gateway.
    pub access_token: String,
    /// Group memberships the access checker evaluates rules against.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserContext {
    pub fn new(name: &str, access_token: &str) -> Self {
        Self {
            name: name.to_string(),
            access_token: access_token.to_string(),
            roles: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|r| r.to_string()).collect();
        self
    }
}

/// What kind of resource an access check is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// A coarse UI-level permission key, e.g. `/api/image/share`.
    Page,
    /// A per-image role moniker.
    Image,
}

/// Boolean access-check primitive evaluated by the surrounding platform.
///
/// Implementations decide how group rules, wildcards, and admin overrides
/// combine; this crate only asks the question.
#[async_trait]
pub trait AccessChecker: Send + Sync {
    async fn has_access(&self, user: &UserContext, capability: Capability, resource: &str)
        -> bool;
}

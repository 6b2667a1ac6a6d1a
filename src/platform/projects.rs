// ABOUTME: Port to the project and endpoint directory.
// ABOUTME: Group membership, per-user project lists, endpoint cloud tags.

use async_trait::async_trait;
use std::collections::BTreeSet;

use super::UserContext;

/// Errors from the project/endpoint directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("project {0} is not registered")]
    UnknownProject(String),

    #[error("endpoint {0} is not registered")]
    UnknownEndpoint(String),

    #[error("directory backend error: {0}")]
    Backend(String),
}

/// Project and endpoint metadata, owned by the surrounding platform.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Groups configured on a project; these are what project-wide sharing
    /// adds to an image role.
    async fn project_groups(&self, project: &str) -> Result<BTreeSet<String>, DirectoryError>;

    /// Names of every project the user belongs to.
    async fn user_projects(&self, user: &UserContext) -> Result<Vec<String>, DirectoryError>;

    /// Cloud tag of an endpoint.
    async fn endpoint_cloud(&self, endpoint: &str) -> Result<String, DirectoryError>;
}

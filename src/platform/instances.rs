// ABOUTME: Port to the external exploratory-instance store.
// ABOUTME: Fetches, state markers, library snapshots, and address updates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Library;
use crate::types::InstanceId;

/// State of an exploratory instance as the instance store reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    Running,
    Stopped,
    /// Marker set while an image capture is in flight on the instance.
    CreatingImage,
    Terminated,
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstanceState::Running => "RUNNING",
            InstanceState::Stopped => "STOPPED",
            InstanceState::CreatingImage => "CREATING_IMAGE",
            InstanceState::Terminated => "TERMINATED",
        };
        write!(f, "{}", name)
    }
}

/// The slice of an instance record image capture needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub id: InstanceId,
    pub name: String,
    pub user: String,
    pub project: String,
    pub endpoint: String,
    pub state: InstanceState,
    /// Docker image the instance runs; becomes the captured image's template
    /// reference.
    pub docker_image: String,
    pub template_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_config: Option<serde_json::Value>,
    /// Network address of the notebook, when assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Errors from the instance store.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("instance {name} for user {user} in project {project} was not found")]
    NotFound {
        user: String,
        project: String,
        name: String,
    },

    #[error("instance {name} is not running (state: {state})")]
    NotRunning { name: String, state: InstanceState },

    #[error("instance store error: {0}")]
    Backend(String),
}

/// Instance metadata and status updates, owned by the surrounding platform.
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Fetch an instance, failing with `NotRunning` unless it is running.
    async fn fetch_running(
        &self,
        user: &str,
        project: &str,
        name: &str,
    ) -> Result<InstanceRecord, InstanceError>;

    /// Fetch an instance in any state.
    async fn fetch(
        &self,
        user: &str,
        project: &str,
        name: &str,
    ) -> Result<InstanceRecord, InstanceError>;

    /// Current library snapshot of the instance and its compute resources.
    async fn libraries(
        &self,
        user: &str,
        project: &str,
        name: &str,
    ) -> Result<Vec<Library>, InstanceError>;

    async fn update_state(
        &self,
        user: &str,
        project: &str,
        name: &str,
        state: InstanceState,
    ) -> Result<(), InstanceError>;

    async fn update_address(
        &self,
        user: &str,
        project: &str,
        name: &str,
        address: &str,
    ) -> Result<(), InstanceError>;
}

// ABOUTME: Port to the external provisioning gateway.
// ABOUTME: Capture and terminate requests; completion arrives via callbacks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{Image, Library};
use crate::types::{ImageName, TrackingId};

/// Request payload for capture and terminate, built from the stored image.
/// Both operations send the same shape; the gateway routes on its own path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSpec {
    pub user: String,
    pub project: String,
    pub endpoint: String,
    pub instance_name: String,
    pub image_name: ImageName,
    pub docker_image: String,
    pub template_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_config: Option<serde_json::Value>,
    #[serde(default)]
    pub libraries: Vec<Library>,
    #[serde(default)]
    pub compute_libraries: BTreeMap<String, Vec<Library>>,
}

impl CaptureSpec {
    pub fn for_image(image: &Image) -> Self {
        Self {
            user: image.user.clone(),
            project: image.project.clone(),
            endpoint: image.endpoint.clone(),
            instance_name: image.instance_name.clone(),
            image_name: image.name.clone(),
            docker_image: image.docker_image.clone(),
            template_name: image.template_name.clone(),
            cluster_config: image.cluster_config.clone(),
            libraries: image.libraries.clone(),
            compute_libraries: image.compute_libraries.clone(),
        }
    }
}

/// Errors from gateway dispatch. Completion failures are not reported here;
/// they arrive later through the failure callback.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("provisioning endpoint {endpoint} rejected the request: {reason}")]
    Rejected { endpoint: String, reason: String },

    #[error("provisioning dispatch failed: {0}")]
    Dispatch(String),
}

/// External system that performs the actual capture and termination work.
///
/// Both calls return as soon as the gateway accepts the job; the returned
/// tracking id identifies the job on the gateway side. The transport behind
/// this trait is the embedder's concern.
#[async_trait]
pub trait ProvisioningGateway: Send + Sync {
    async fn capture(
        &self,
        endpoint: &str,
        access_token: &str,
        spec: &CaptureSpec,
    ) -> Result<TrackingId, GatewayError>;

    async fn terminate(
        &self,
        endpoint: &str,
        access_token: &str,
        spec: &CaptureSpec,
    ) -> Result<TrackingId, GatewayError>;
}

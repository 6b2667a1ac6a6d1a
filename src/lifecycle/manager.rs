// ABOUTME: Orchestrates image capture and termination against the gateway.
// ABOUTME: Local state is durable before dispatch; callbacks are idempotent.

use chrono::Utc;
use std::sync::Arc;

use crate::model::{split_by_scope, Image, ImageStatus};
use crate::platform::{InstanceError, InstanceState, InstanceStore, ProjectDirectory, UserContext};
use crate::provisioning::{CaptureSpec, ProvisioningGateway};
use crate::sharing::SharingEngine;
use crate::store::{AdvanceOutcome, ImageStore, StoreError};
use crate::types::{ImageKey, ImageName, TrackingId};

use super::LifecycleError;

/// Drives images through `CREATING → ACTIVE → TERMINATING → TERMINATED`.
///
/// Create and terminate hand off to the provisioning gateway and return as
/// soon as the job is accepted; completion arrives later through the
/// `on_image_*` callbacks, possibly more than once and possibly racing new
/// requests for the same image.
pub struct LifecycleManager {
    images: Arc<dyn ImageStore>,
    instances: Arc<dyn InstanceStore>,
    directory: Arc<dyn ProjectDirectory>,
    gateway: Arc<dyn ProvisioningGateway>,
    sharing: Arc<SharingEngine>,
}

impl LifecycleManager {
    pub fn new(
        images: Arc<dyn ImageStore>,
        instances: Arc<dyn InstanceStore>,
        directory: Arc<dyn ProjectDirectory>,
        gateway: Arc<dyn ProvisioningGateway>,
        sharing: Arc<SharingEngine>,
    ) -> Self {
        Self {
            images,
            instances,
            directory,
            gateway,
            sharing,
        }
    }

    /// Capture a new image from a running instance.
    ///
    /// The image record and the instance marker are both written before the
    /// gateway is called, so a crash after dispatch never leaves an external
    /// job with no local record. A failed dispatch leaves the image in
    /// `CREATING` for later reconciliation.
    pub async fn create_image(
        &self,
        user: &UserContext,
        project: &str,
        instance_name: &str,
        image_name: ImageName,
        description: &str,
    ) -> Result<TrackingId, LifecycleError> {
        let instance = self
            .instances
            .fetch_running(&user.name, project, instance_name)
            .await?;

        // Early check for a clean error before the library snapshot; the
        // insert below stays the authoritative race arbiter.
        if self.images.name_in_use(&image_name, project).await? {
            return Err(StoreError::Conflict {
                name: image_name.as_str().to_string(),
                project: project.to_string(),
            }
            .into());
        }

        let snapshot = self
            .instances
            .libraries(&user.name, project, instance_name)
            .await?;
        let (libraries, compute_libraries) = split_by_scope(snapshot);
        let cloud = self.directory.endpoint_cloud(&instance.endpoint).await?;

        let image = Image {
            name: image_name,
            description: description.to_string(),
            user: user.name.clone(),
            project: project.to_string(),
            endpoint: instance.endpoint.clone(),
            status: ImageStatus::Creating,
            instance_id: instance.id.clone(),
            instance_name: instance.name.clone(),
            docker_image: instance.docker_image.clone(),
            template_name: instance.template_name.clone(),
            cloud,
            cluster_config: instance.cluster_config.clone(),
            libraries,
            compute_libraries,
            created_at: Utc::now(),
        };

        self.images.insert(image.clone()).await?;
        self.instances
            .update_state(&user.name, project, instance_name, InstanceState::CreatingImage)
            .await?;

        let spec = CaptureSpec::for_image(&image);
        let tracking = self
            .gateway
            .capture(&image.endpoint, &user.access_token, &spec)
            .await?;

        tracing::info!(
            "Requested capture of image {} from instance {} for user {} (tracking {})",
            image.name,
            instance_name,
            user.name,
            tracking
        );
        Ok(tracking)
    }

    /// Terminate an image. Silently succeeds when no such image exists, and
    /// when the image is already on its termination path.
    pub async fn terminate_image(
        &self,
        user: &UserContext,
        project: &str,
        endpoint: &str,
        name: &ImageName,
    ) -> Result<Option<TrackingId>, LifecycleError> {
        let key = ImageKey::new(&user.name, project, endpoint, name.clone());
        let Some(image) = self.images.get(&key).await? else {
            tracing::debug!("No image {} to terminate for user {}", name, user.name);
            return Ok(None);
        };

        match self.images.advance_status(&key, ImageStatus::Terminating).await? {
            AdvanceOutcome::Applied => {}
            AdvanceOutcome::Stale => {
                tracing::debug!("Image {} is already terminating or terminated", key);
                return Ok(None);
            }
            AdvanceOutcome::Unknown => return Ok(None),
        }

        let instance = self
            .instances
            .fetch(&user.name, project, &image.instance_name)
            .await?;

        let spec = CaptureSpec::for_image(&image);
        let tracking = self
            .gateway
            .terminate(&image.endpoint, &user.access_token, &spec)
            .await?;

        tracing::info!(
            "Requested termination of image {} (instance {}) for user {} (tracking {})",
            image.name,
            instance.id,
            user.name,
            tracking
        );
        Ok(Some(tracking))
    }

    /// Gateway callback: a capture finished, successfully or not.
    ///
    /// The incoming record carries the final status (`ACTIVE` or `FAILED`).
    /// Restores the source instance to running, persists the completed
    /// fields, creates the sharing role on activation, and applies a new
    /// instance address when one was assigned. Safe to replay.
    pub async fn on_image_created(
        &self,
        image: Image,
        instance_name: &str,
        new_instance_address: Option<&str>,
    ) -> Result<(), LifecycleError> {
        // A purged instance must not make the callback fatal; the restore is
        // skipped like any other unknown-payload piece.
        if let Err(err) = self
            .instances
            .update_state(&image.user, &image.project, instance_name, InstanceState::Running)
            .await
        {
            let InstanceError::NotFound { .. } = err else {
                return Err(err.into());
            };
            tracing::warn!(
                "Source instance {} of image {} is gone; skipping status restore",
                instance_name,
                image.key()
            );
        }

        match self.images.update_fields(&image).await? {
            AdvanceOutcome::Unknown => {
                tracing::warn!("Dropping completion callback for unknown image {}", image.key());
                return Ok(());
            }
            AdvanceOutcome::Stale => {
                tracing::debug!(
                    "Stale completion for image {}; keeping current status",
                    image.key()
                );
            }
            AdvanceOutcome::Applied => {
                tracing::info!("Image {} is now {}", image.key(), image.status);
            }
        }

        // The gate reads the reported status, not the stored one: a capture
        // that finished after termination started still registers its role.
        if image.status == ImageStatus::Active {
            self.sharing.create_image_role(&image, instance_name).await?;
        }

        if let Some(address) = new_instance_address.filter(|a| !a.is_empty()) {
            if let Err(err) = self
                .instances
                .update_address(&image.user, &image.project, instance_name, address)
                .await
            {
                let InstanceError::NotFound { .. } = err else {
                    return Err(err.into());
                };
                tracing::warn!(
                    "Source instance {} of image {} is gone; skipping address update",
                    instance_name,
                    image.key()
                );
            }
        }
        Ok(())
    }

    /// Gateway callback: a termination finished. Safe to replay.
    pub async fn on_image_terminated(&self, key: &ImageKey) -> Result<(), LifecycleError> {
        match self.images.advance_status(key, ImageStatus::Terminated).await? {
            AdvanceOutcome::Applied => {
                tracing::info!("Image {} is terminated", key);
            }
            AdvanceOutcome::Stale => {
                tracing::debug!("Replayed termination callback for image {}", key);
            }
            AdvanceOutcome::Unknown => {
                tracing::warn!("Dropping termination callback for unknown image {}", key);
            }
        }
        Ok(())
    }

    /// Gateway callback: an in-flight capture or termination failed.
    /// Safe to replay; no automatic retry is attempted.
    pub async fn on_image_failed(&self, key: &ImageKey, reason: &str) -> Result<(), LifecycleError> {
        match self.images.advance_status(key, ImageStatus::Failed).await? {
            AdvanceOutcome::Applied => {
                tracing::warn!("Image {} failed: {}", key, reason);
            }
            AdvanceOutcome::Stale => {
                tracing::debug!("Replayed failure callback for image {}", key);
            }
            AdvanceOutcome::Unknown => {
                tracing::warn!("Dropping failure callback for unknown image {}", key);
            }
        }
        Ok(())
    }
}

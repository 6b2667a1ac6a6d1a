// ABOUTME: Derives sharing status and per-user permissions for images.
// ABOUTME: Combines image records, role lookups, and the access primitive.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::model::{Image, ImagePermissions, ImageRole, ImageStatus, SharingStatus};
use crate::platform::{AccessChecker, Capability, DirectoryError, ProjectDirectory, UserContext};
use crate::store::{ImageStore, RoleStore, StoreError};
use crate::types::{ImageKey, ImageName, RoleMoniker};

/// Errors from sharing and role operations.
#[derive(Debug, thiserror::Error)]
pub enum SharingError {
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("directory lookup failed: {0}")]
    Directory(#[from] DirectoryError),
}

/// Derives who may see, share, or terminate an image.
///
/// Sharing state is never stored on the image; it is recomputed per request
/// from the role record found under the image's moniker.
pub struct SharingEngine {
    config: ServiceConfig,
    images: Arc<dyn ImageStore>,
    roles: Arc<dyn RoleStore>,
    access: Arc<dyn AccessChecker>,
    directory: Arc<dyn ProjectDirectory>,
}

impl SharingEngine {
    pub fn new(
        config: ServiceConfig,
        images: Arc<dyn ImageStore>,
        roles: Arc<dyn RoleStore>,
        access: Arc<dyn AccessChecker>,
        directory: Arc<dyn ProjectDirectory>,
    ) -> Self {
        Self {
            config,
            images,
            roles,
            access,
            directory,
        }
    }

    /// Create the private sharing role for an image that just became active.
    ///
    /// A no-op for images in any other status, and for images that already
    /// have a role (replayed completion callbacks land there).
    pub async fn create_image_role(
        &self,
        image: &Image,
        instance_name: &str,
    ) -> Result<(), SharingError> {
        if image.status != ImageStatus::Active {
            tracing::debug!(
                "Skipping role creation for image {} in status {}",
                image.name,
                image.status
            );
            return Ok(());
        }

        let moniker = RoleMoniker::new(&image.project, &image.endpoint, instance_name, &image.name);
        let cloud = self.directory.endpoint_cloud(&image.endpoint).await?;
        let role = ImageRole::for_image(&moniker, &cloud);
        let role_id = role.id.clone();

        if self.roles.insert(role).await? {
            tracing::info!("Created sharing role {} for image {}", role_id, image.name);
        } else {
            tracing::debug!("Sharing role {} already exists", role_id);
        }
        Ok(())
    }

    /// Visibility of an image relative to one viewer.
    ///
    /// Pure in (viewer, ownership, role group set): no role means private,
    /// an owner with concrete groups shares, an owner without them stays
    /// private, and any other viewer received the image from someone else.
    pub async fn sharing_status(
        &self,
        username: &str,
        image: &Image,
    ) -> Result<SharingStatus, SharingError> {
        let Some(role) = self.roles.find(&image.moniker().role_id()).await? else {
            return Ok(SharingStatus::Private);
        };

        if image.is_owned_by(username) {
            if role.has_concrete_groups(&self.config.wildcard_group) {
                Ok(SharingStatus::Shared)
            } else {
                Ok(SharingStatus::Private)
            }
        } else {
            Ok(SharingStatus::Received)
        }
    }

    /// Actions the user may perform on an image.
    pub async fn user_image_permissions(
        &self,
        user: &UserContext,
        image: &Image,
    ) -> ImagePermissions {
        let owner = image.is_owned_by(&user.name);
        let keys = &self.config.capabilities;

        let can_terminate = matches!(image.status, ImageStatus::Active | ImageStatus::Failed)
            && owner
            && self
                .access
                .has_access(user, Capability::Page, &keys.terminate_own)
                .await;

        let can_share = image.status == ImageStatus::Active
            && if owner {
                self.access
                    .has_access(user, Capability::Page, &keys.share_own)
                    .await
            } else {
                self.access
                    .has_access(user, Capability::Page, &keys.share_received)
                    .await
            };

        ImagePermissions {
            can_share,
            can_terminate,
        }
    }

    /// Images other users shared with this one, with the viewer's sharing
    /// status attached. Scans every image; catalogs are small and the access
    /// check dominates.
    pub async fn shared_with_user(
        &self,
        user: &UserContext,
    ) -> Result<Vec<(Image, SharingStatus)>, SharingError> {
        let mut shared = Vec::new();
        for image in self.images.list_all().await? {
            if image.is_owned_by(&user.name) {
                continue;
            }
            let moniker = image.moniker().moniker();
            if !self.access.has_access(user, Capability::Image, &moniker).await {
                continue;
            }
            let status = self.sharing_status(&user.name, &image).await?;
            shared.push((image, status));
        }
        Ok(shared)
    }

    /// Shared images usable for a specific instance template: active, on the
    /// same template, project, and endpoint.
    pub async fn shared_with_user_matching(
        &self,
        user: &UserContext,
        docker_image: &str,
        project: &str,
        endpoint: &str,
    ) -> Result<Vec<Image>, SharingError> {
        let mut shared = Vec::new();
        for image in self.images.list_all().await? {
            if image.is_owned_by(&user.name)
                || image.status != ImageStatus::Active
                || image.docker_image != docker_image
                || image.project != project
                || image.endpoint != endpoint
            {
                continue;
            }
            let moniker = image.moniker().moniker();
            if self.access.has_access(user, Capability::Image, &moniker).await {
                shared.push(image);
            }
        }
        Ok(shared)
    }

    /// Share an image with every group configured on its project.
    ///
    /// A warn-level no-op when the caller has no such image; group addition
    /// is an idempotent set-union on the existing role.
    pub async fn share_with_project_groups(
        &self,
        user: &UserContext,
        name: &ImageName,
        project: &str,
        endpoint: &str,
    ) -> Result<(), SharingError> {
        let key = ImageKey::new(&user.name, project, endpoint, name.clone());
        let Some(image) = self.images.get(&key).await? else {
            tracing::warn!("No image {} to share for user {}", name, user.name);
            return Ok(());
        };

        let groups = self.directory.project_groups(project).await?;
        let role_id = image.moniker().role_id();

        if self.roles.add_groups(&role_id, &groups).await? {
            tracing::info!(
                "Shared image {} with {} project group(s) of {}",
                name,
                groups.len(),
                project
            );
        } else {
            tracing::warn!("Image {} has no sharing role yet", name);
        }
        Ok(())
    }
}

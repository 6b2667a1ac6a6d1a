// ABOUTME: In-memory reference implementations of the store ports.
// ABOUTME: RwLock-guarded maps; used by tests and in-process embedders.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};

use crate::model::{Image, ImageRole, ImageStatus};
use crate::types::{ImageKey, ImageName};

use super::{AdvanceOutcome, ImageStore, RoleStore, StoreError};

/// Image store over a guarded map. The write lock makes insert an atomic
/// check-and-insert, which is what serializes racing creates.
#[derive(Default)]
pub struct MemoryImageStore {
    images: RwLock<HashMap<ImageKey, Image>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted(mut images: Vec<Image>) -> Vec<Image> {
    images.sort_by(|a, b| {
        (a.created_at, a.name.as_str())
            .cmp(&(b.created_at, b.name.as_str()))
    });
    images
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn insert(&self, image: Image) -> Result<(), StoreError> {
        let mut images = self.images.write();
        let occupied = images.values().any(|existing| {
            !existing.status.is_terminated()
                && existing.name == image.name
                && existing.project == image.project
        });
        if occupied {
            return Err(StoreError::Conflict {
                name: image.name.as_str().to_string(),
                project: image.project.clone(),
            });
        }
        images.insert(image.key(), image);
        Ok(())
    }

    async fn get(&self, key: &ImageKey) -> Result<Option<Image>, StoreError> {
        Ok(self.images.read().get(key).cloned())
    }

    async fn update_fields(&self, image: &Image) -> Result<AdvanceOutcome, StoreError> {
        let mut images = self.images.write();
        let Some(existing) = images.get_mut(&image.key()) else {
            return Ok(AdvanceOutcome::Unknown);
        };

        let outcome = if existing.status.can_advance_to(image.status) {
            AdvanceOutcome::Applied
        } else {
            AdvanceOutcome::Stale
        };
        let status = match outcome {
            AdvanceOutcome::Applied => image.status,
            _ => existing.status,
        };
        let created_at = existing.created_at;

        *existing = image.clone();
        existing.status = status;
        existing.created_at = created_at;
        Ok(outcome)
    }

    async fn advance_status(
        &self,
        key: &ImageKey,
        target: ImageStatus,
    ) -> Result<AdvanceOutcome, StoreError> {
        let mut images = self.images.write();
        let Some(existing) = images.get_mut(key) else {
            return Ok(AdvanceOutcome::Unknown);
        };
        if existing.status.can_advance_to(target) {
            existing.status = target;
            Ok(AdvanceOutcome::Applied)
        } else {
            Ok(AdvanceOutcome::Stale)
        }
    }

    async fn name_in_use(&self, name: &ImageName, project: &str) -> Result<bool, StoreError> {
        Ok(self.images.read().values().any(|image| {
            !image.status.is_terminated() && image.name == *name && image.project == project
        }))
    }

    async fn list_user(&self, user: &str) -> Result<Vec<Image>, StoreError> {
        let images = self.images.read();
        Ok(sorted(
            images
                .values()
                .filter(|image| image.user == user)
                .cloned()
                .collect(),
        ))
    }

    async fn list_all(&self) -> Result<Vec<Image>, StoreError> {
        Ok(sorted(self.images.read().values().cloned().collect()))
    }

    async fn list_project(&self, project: &str) -> Result<Vec<Image>, StoreError> {
        let images = self.images.read();
        Ok(sorted(
            images
                .values()
                .filter(|image| image.project == project)
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_template(
        &self,
        user: &str,
        docker_image: &str,
        project: &str,
        endpoint: &str,
        statuses: &[ImageStatus],
    ) -> Result<Vec<Image>, StoreError> {
        let images = self.images.read();
        Ok(sorted(
            images
                .values()
                .filter(|image| {
                    image.user == user
                        && image.docker_image == docker_image
                        && image.project == project
                        && image.endpoint == endpoint
                        && statuses.contains(&image.status)
                })
                .cloned()
                .collect(),
        ))
    }
}

/// Role store over a guarded map keyed by role id.
#[derive(Default)]
pub struct MemoryRoleStore {
    roles: RwLock<HashMap<String, ImageRole>>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn insert(&self, role: ImageRole) -> Result<bool, StoreError> {
        let mut roles = self.roles.write();
        if roles.contains_key(&role.id) {
            return Ok(false);
        }
        roles.insert(role.id.clone(), role);
        Ok(true)
    }

    async fn find(&self, role_id: &str) -> Result<Option<ImageRole>, StoreError> {
        Ok(self.roles.read().get(role_id).cloned())
    }

    async fn add_groups(
        &self,
        role_id: &str,
        groups: &BTreeSet<String>,
    ) -> Result<bool, StoreError> {
        let mut roles = self.roles.write();
        let Some(role) = roles.get_mut(role_id) else {
            return Ok(false);
        };
        role.groups.extend(groups.iter().cloned());
        Ok(true)
    }
}

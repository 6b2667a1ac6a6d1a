// ABOUTME: Persistence ports for image and role records.
// ABOUTME: Durable backends implement these; memory.rs is the reference.

mod memory;

pub use memory::{MemoryImageStore, MemoryRoleStore};

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::model::{Image, ImageRole, ImageStatus};
use crate::types::{ImageKey, ImageName};

/// Errors from the image and role stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("image {name} already exists in project {project}")]
    Conflict { name: String, project: String },

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result of applying one status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The transition was legal and has been written.
    Applied,
    /// The image exists but is already in the target state or past it;
    /// nothing was written. Replays and late callbacks land here.
    Stale,
    /// No image with that key exists.
    Unknown,
}

/// Persistent record of every image and its lifecycle state.
///
/// Implementations must serialize concurrent inserts for the same
/// `(name, project)` pair: the loser of a race gets `StoreError::Conflict`,
/// never a silent overwrite. Writes must be visible to subsequent reads of
/// the same key.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Insert a new image. Fails with `Conflict` when a non-terminated image
    /// with the same `(name, project)` already exists; the check and the
    /// write are one atomic step.
    async fn insert(&self, image: Image) -> Result<(), StoreError>;

    async fn get(&self, key: &ImageKey) -> Result<Option<Image>, StoreError>;

    /// Replace the stored fields of an image with a completed record.
    ///
    /// The status is guarded by the lifecycle table: a stale status on the
    /// incoming record updates the captured fields but leaves the stored
    /// status untouched. `created_at` is always preserved from the stored
    /// record.
    async fn update_fields(&self, image: &Image) -> Result<AdvanceOutcome, StoreError>;

    /// Advance the status of an image along the lifecycle table.
    async fn advance_status(
        &self,
        key: &ImageKey,
        target: ImageStatus,
    ) -> Result<AdvanceOutcome, StoreError>;

    /// Whether a non-terminated image with this name exists in the project,
    /// under any owner or endpoint.
    async fn name_in_use(&self, name: &ImageName, project: &str) -> Result<bool, StoreError>;

    /// All images owned by a user.
    async fn list_user(&self, user: &str) -> Result<Vec<Image>, StoreError>;

    /// Every image in the store, any owner, any status.
    async fn list_all(&self) -> Result<Vec<Image>, StoreError>;

    /// Every image recorded for a project, any owner, any status.
    async fn list_project(&self, project: &str) -> Result<Vec<Image>, StoreError>;

    /// Images owned by a user for one instance template, restricted to the
    /// given statuses.
    async fn list_for_template(
        &self,
        user: &str,
        docker_image: &str,
        project: &str,
        endpoint: &str,
        statuses: &[ImageStatus],
    ) -> Result<Vec<Image>, StoreError>;
}

/// Persistent record of sharing roles.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Insert a role if absent. Returns `false` without touching the stored
    /// record when the id already exists; replayed activations must not
    /// reset groups that sharing added in the meantime.
    async fn insert(&self, role: ImageRole) -> Result<bool, StoreError>;

    async fn find(&self, role_id: &str) -> Result<Option<ImageRole>, StoreError>;

    /// Union the given groups into a role's group set. Returns `false` when
    /// no role with that id exists.
    async fn add_groups(
        &self,
        role_id: &str,
        groups: &BTreeSet<String>,
    ) -> Result<bool, StoreError>;
}

// ABOUTME: The durable image record and its lifecycle state machine.
// ABOUTME: Status transitions are table-driven; stale transitions are no-ops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::{ImageKey, ImageName, InstanceId, RoleMoniker};

use super::Library;

/// Lifecycle state of an image.
///
/// `CREATING` and `TERMINATING` are in-flight states waiting on the
/// provisioning gateway; `TERMINATED` records are retained as history and
/// release their name for reuse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageStatus {
    Creating,
    Active,
    Failed,
    Terminating,
    Terminated,
}

impl ImageStatus {
    /// Whether moving from `self` to `target` is a legal lifecycle step.
    ///
    /// Everything outside this table is a stale or replayed transition and
    /// must be applied as a no-op, never an error. In particular a late
    /// `Active` completion cannot resurrect an image that is already on its
    /// termination path.
    pub fn can_advance_to(self, target: ImageStatus) -> bool {
        use ImageStatus::*;
        matches!(
            (self, target),
            (Creating, Active)
                | (Creating, Failed)
                | (Creating, Terminating)
                | (Active, Terminating)
                | (Failed, Terminating)
                | (Terminating, Terminated)
                | (Terminating, Failed)
        )
    }

    pub fn is_terminated(self) -> bool {
        matches!(self, ImageStatus::Terminated)
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageStatus::Creating => "CREATING",
            ImageStatus::Active => "ACTIVE",
            ImageStatus::Failed => "FAILED",
            ImageStatus::Terminating => "TERMINATING",
            ImageStatus::Terminated => "TERMINATED",
        };
        write!(f, "{}", name)
    }
}

/// A captured snapshot of an exploratory instance's environment.
///
/// Keyed by `(user, project, endpoint, name)`. The library lists and cluster
/// configuration are a point-in-time copy taken when the capture request was
/// accepted; they are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub name: ImageName,
    pub description: String,
    pub user: String,
    pub project: String,
    pub endpoint: String,
    pub status: ImageStatus,
    /// Id of the source instance the snapshot was taken from.
    pub instance_id: InstanceId,
    /// Name of the source instance; part of the role moniker.
    pub instance_name: String,
    /// Underlying docker image the source instance runs.
    pub docker_image: String,
    pub template_name: String,
    /// Cloud tag of the owning endpoint, resolved at creation time.
    pub cloud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_config: Option<serde_json::Value>,
    /// Libraries installed on the instance itself.
    #[serde(default)]
    pub libraries: Vec<Library>,
    /// Libraries installed on attached compute resources, keyed by resource name.
    #[serde(default)]
    pub compute_libraries: BTreeMap<String, Vec<Library>>,
    pub created_at: DateTime<Utc>,
}

impl Image {
    pub fn key(&self) -> ImageKey {
        ImageKey::new(&self.user, &self.project, &self.endpoint, self.name.clone())
    }

    /// Role identity of this image, recomputed from its coordinates.
    pub fn moniker(&self) -> RoleMoniker {
        RoleMoniker::new(&self.project, &self.endpoint, &self.instance_name, &self.name)
    }

    pub fn is_owned_by(&self, user: &str) -> bool {
        self.user == user
    }
}

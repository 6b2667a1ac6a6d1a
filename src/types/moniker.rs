// ABOUTME: Deterministic role identity derived from an image's coordinates.
// ABOUTME: Renders the moniker string, the role id, and the role description.

use super::ImageName;
use std::fmt;

/// Role identity for an image, computed from
/// `(project, endpoint, source instance name, image name)`.
///
/// Never stored on the image; recomputed wherever the role is needed so role
/// and image cannot drift apart. Compared structurally, not by rendered
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleMoniker {
    project: String,
    endpoint: String,
    instance: String,
    image: String,
}

impl RoleMoniker {
    pub fn new(project: &str, endpoint: &str, instance: &str, image: &ImageName) -> Self {
        Self {
            project: project.to_string(),
            endpoint: endpoint.to_string(),
            instance: instance.to_string(),
            image: image.as_str().to_string(),
        }
    }

    /// The moniker string granted by a role, `{project}_{endpoint}_{instance}_{image}`.
    pub fn moniker(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.project, self.endpoint, self.instance, self.image
        )
    }

    /// The role record id, the moniker prefixed with `img_`.
    pub fn role_id(&self) -> String {
        format!(
            "img_{}_{}_{}_{}",
            self.project, self.endpoint, self.instance, self.image
        )
    }

    /// Human-readable role description shown in group-management UIs.
    /// Underscores are flattened to dashes, including any inside components.
    pub fn role_description(&self) -> String {
        format!(
            "Create Notebook from image {}",
            self.moniker().replace('_', "-")
        )
    }
}

impl fmt::Display for RoleMoniker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.moniker())
    }
}

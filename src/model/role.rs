// ABOUTME: The access-control role record attached to an active image.
// ABOUTME: Carries the authorized group set, including the wildcard rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::RoleMoniker;

/// Capability kind a role grants. Image roles always grant instance creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleKind {
    Notebook,
}

/// Sharing role for one image, created when the image becomes active.
///
/// An absent role and a role with an empty group set both mean "private".
/// The configured wildcard group value grants every user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRole {
    pub id: String,
    pub description: String,
    /// Cloud tag of the owning endpoint.
    pub cloud: String,
    pub kind: RoleKind,
    /// Monikers this role grants; always the singleton of the owning image.
    pub images: BTreeSet<String>,
    /// Groups authorized to create instances from the image. Empty = private.
    pub groups: BTreeSet<String>,
}

impl ImageRole {
    /// Fresh private role for an image that just became active.
    pub fn for_image(moniker: &RoleMoniker, cloud: &str) -> Self {
        let mut images = BTreeSet::new();
        images.insert(moniker.moniker());
        Self {
            id: moniker.role_id(),
            description: moniker.role_description(),
            cloud: cloud.to_string(),
            kind: RoleKind::Notebook,
            images,
            groups: BTreeSet::new(),
        }
    }

    /// Whether the role names any group beyond a bare wildcard.
    ///
    /// The wildcard alone does not count: it only counts as "has groups" when
    /// at least one other group sits next to it. Keep this boolean exactly as
    /// written; the sharing-status derivation depends on it.
    pub fn has_concrete_groups(&self, wildcard: &str) -> bool {
        (self.groups.contains(wildcard) && self.groups.len() >= 2)
            || (!self.groups.contains(wildcard) && !self.groups.is_empty())
    }
}

// ABOUTME: Derived per-viewer classifications of an image.
// ABOUTME: Sharing status and action permissions; computed, never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visibility of an image relative to one viewer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SharingStatus {
    /// Owned by the viewer and not shared with anyone.
    Private,
    /// Owned by the viewer and shared with at least one concrete group.
    Shared,
    /// Owned by someone else; visible because a role admits the viewer.
    Received,
}

impl fmt::Display for SharingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SharingStatus::Private => "PRIVATE",
            SharingStatus::Shared => "SHARED",
            SharingStatus::Received => "RECEIVED",
        };
        write!(f, "{}", name)
    }
}

/// Actions one viewer may perform on one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImagePermissions {
    pub can_share: bool,
    pub can_terminate: bool,
}

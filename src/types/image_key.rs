// ABOUTME: Composite identity of an image record.
// ABOUTME: The (user, project, endpoint, name) four-tuple keys the image store.

use super::ImageName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique key of an image within the image store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageKey {
    pub user: String,
    pub project: String,
    pub endpoint: String,
    pub name: ImageName,
}

impl ImageKey {
    pub fn new(user: &str, project: &str, endpoint: &str, name: ImageName) -> Self {
        Self {
            user: user.to_string(),
            project: project.to_string(),
            endpoint: endpoint.to_string(),
            name,
        }
    }
}

impl fmt::Display for ImageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.user, self.project, self.endpoint, self.name
        )
    }
}

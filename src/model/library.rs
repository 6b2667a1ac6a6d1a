// ABOUTME: Installed-library records captured from a source instance.
// ABOUTME: Splits a raw snapshot into environment and compute-resource lists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a captured library was installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LibraryScope {
    /// Installed on the exploratory instance itself.
    Environment,
    /// Installed on an attached compute resource.
    Compute,
}

/// One installed package recorded on an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Library {
    /// Package group, e.g. `pip3` or `os_pkg`.
    pub group: String,
    pub name: String,
    pub version: String,
    pub scope: LibraryScope,
    /// Name of the compute resource the library lives on; `None` for
    /// environment-scoped libraries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

/// Split a raw library snapshot into the two lists an image stores:
/// environment libraries as a flat list, compute libraries grouped by the
/// resource they are installed on.
pub fn split_by_scope(
    libraries: Vec<Library>,
) -> (Vec<Library>, BTreeMap<String, Vec<Library>>) {
    let mut environment = Vec::new();
    let mut compute: BTreeMap<String, Vec<Library>> = BTreeMap::new();

    for library in libraries {
        match library.scope {
            LibraryScope::Environment => environment.push(library),
            LibraryScope::Compute => {
                let resource = library.resource.clone().unwrap_or_default();
                compute.entry(resource).or_default().push(library);
            }
        }
    }

    (environment, compute)
}

// ABOUTME: User-scoped catalog filter and the facet data that feeds filter UIs.
// ABOUTME: Empty filter fields match everything; the predicate is pure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Image, ImageStatus, SharingStatus};

/// Persisted per-user catalog query.
///
/// The name filter is a case-insensitive substring match; every set filter
/// passes when the set is empty. A default-constructed filter matches every
/// image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageFilter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub statuses: BTreeSet<ImageStatus>,
    #[serde(default)]
    pub endpoints: BTreeSet<String>,
    #[serde(default)]
    pub templates: BTreeSet<String>,
    #[serde(default)]
    pub sharing_statuses: BTreeSet<SharingStatus>,
}

impl ImageFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.statuses.is_empty()
            && self.endpoints.is_empty()
            && self.templates.is_empty()
            && self.sharing_statuses.is_empty()
    }

    /// Whether an image, seen with the given sharing status, passes the filter.
    pub fn matches(&self, image: &Image, sharing: SharingStatus) -> bool {
        image
            .name
            .as_str()
            .to_lowercase()
            .contains(&self.name.to_lowercase())
            && passes(&self.statuses, &image.status)
            && passes(&self.endpoints, &image.endpoint)
            && passes(&self.templates, &image.template_name)
            && passes(&self.sharing_statuses, &sharing)
    }
}

fn passes<T: Ord>(set: &BTreeSet<T>, value: &T) -> bool {
    set.is_empty() || set.contains(value)
}

/// Distinct values present in a user's full unfiltered catalog; populates the
/// filter choices in the UI. Always derived before any filter is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterFacets {
    pub image_names: BTreeSet<String>,
    pub statuses: BTreeSet<ImageStatus>,
    pub endpoints: BTreeSet<String>,
    pub templates: BTreeSet<String>,
    pub sharing_statuses: BTreeSet<SharingStatus>,
}

impl FilterFacets {
    pub fn collect<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a Image, SharingStatus)>,
    {
        let mut facets = Self::default();
        for (image, sharing) in entries {
            facets.image_names.insert(image.name.as_str().to_string());
            facets.statuses.insert(image.status);
            facets.endpoints.insert(image.endpoint.clone());
            facets.templates.insert(image.template_name.clone());
            facets.sharing_statuses.insert(sharing);
        }
        facets
    }
}

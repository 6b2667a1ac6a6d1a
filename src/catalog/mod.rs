// ABOUTME: Assembles the user-facing image catalog.
// ABOUTME: Own plus shared images, facets, filtering, grouping by project.

use serde::Serialize;
use std::sync::Arc;

use crate::model::{FilterFacets, Image, ImageFilter, ImagePermissions, ImageStatus, SharingStatus};
use crate::platform::{DirectoryError, FilterStore, ProjectDirectory, SettingsError, UserContext};
use crate::sharing::{SharingEngine, SharingError};
use crate::store::{ImageStore, StoreError};
use crate::types::{ImageKey, ImageName};

/// Errors from catalog assembly and lookups.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("image {name} was not found for user {user}")]
    NotFound { user: String, name: String },

    #[error("image listing failed: {0}")]
    Store(#[from] StoreError),

    #[error("sharing evaluation failed: {0}")]
    Sharing(#[from] SharingError),

    #[error("filter persistence failed: {0}")]
    Settings(#[from] SettingsError),

    #[error("project directory lookup failed: {0}")]
    Directory(#[from] DirectoryError),
}

/// One catalog entry: the image with the viewer's derived state merged in.
/// Stored records are never mutated; this is the side table at the boundary.
#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    #[serde(flatten)]
    pub image: Image,
    pub sharing_status: SharingStatus,
    pub permissions: ImagePermissions,
}

/// Catalog group for one project the viewer belongs to. Projects with no
/// matching images still appear, with an empty list.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectImages {
    pub project: String,
    pub images: Vec<ImageView>,
}

/// The assembled catalog: project groups plus the filter that produced them.
/// Facet values always come from the full unfiltered set.
#[derive(Debug, Clone, Serialize)]
pub struct ImagesPage {
    pub projects: Vec<ProjectImages>,
    pub filter: ImageFilter,
    pub facets: FilterFacets,
}

/// Read-side service composing the stores and the sharing engine.
pub struct CatalogService {
    images: Arc<dyn ImageStore>,
    sharing: Arc<SharingEngine>,
    directory: Arc<dyn ProjectDirectory>,
    filters: Arc<dyn FilterStore>,
}

impl CatalogService {
    pub fn new(
        images: Arc<dyn ImageStore>,
        sharing: Arc<SharingEngine>,
        directory: Arc<dyn ProjectDirectory>,
        filters: Arc<dyn FilterStore>,
    ) -> Self {
        Self {
            images,
            sharing,
            directory,
            filters,
        }
    }

    /// The user's catalog: own images plus images shared with them, grouped
    /// by project.
    ///
    /// Facets always come from the full unfiltered set, so the UI can offer
    /// choices the current filter excludes. An explicit filter is persisted
    /// for the next call; with neither an explicit nor a persisted filter, a
    /// match-all filter is stored and used. Permissions are computed for the
    /// filtered entries only.
    pub async fn list_user_images(
        &self,
        user: &UserContext,
        explicit_filter: Option<ImageFilter>,
    ) -> Result<ImagesPage, CatalogError> {
        tracing::debug!("Loading image catalog for user {}", user.name);

        let mut entries: Vec<(Image, SharingStatus)> = Vec::new();
        for image in self.images.list_user(&user.name).await? {
            let status = self.sharing.sharing_status(&user.name, &image).await?;
            entries.push((image, status));
        }
        entries.extend(self.sharing.shared_with_user(user).await?);

        let facets = FilterFacets::collect(entries.iter().map(|(image, status)| (image, *status)));
        let filter = self.resolve_filter(&user.name, explicit_filter).await?;

        let mut views = Vec::new();
        for (image, status) in entries {
            if !filter.matches(&image, status) {
                continue;
            }
            let permissions = self.sharing.user_image_permissions(user, &image).await;
            views.push(ImageView {
                image,
                sharing_status: status,
                permissions,
            });
        }

        let mut projects = Vec::new();
        for project in self.directory.user_projects(user).await? {
            let images = views
                .iter()
                .filter(|view| view.image.project == project)
                .cloned()
                .collect();
            projects.push(ProjectImages { project, images });
        }

        Ok(ImagesPage {
            projects,
            filter,
            facets,
        })
    }

    /// Images usable to spawn a new instance of one template: the user's own
    /// in `ACTIVE` or `CREATING`, plus matching shared ones.
    pub async fn images_for_template(
        &self,
        user: &UserContext,
        docker_image: &str,
        project: &str,
        endpoint: &str,
    ) -> Result<Vec<Image>, CatalogError> {
        let mut images = self
            .images
            .list_for_template(
                &user.name,
                docker_image,
                project,
                endpoint,
                &[ImageStatus::Active, ImageStatus::Creating],
            )
            .await?;
        images.extend(
            self.sharing
                .shared_with_user_matching(user, docker_image, project, endpoint)
                .await?,
        );
        Ok(images)
    }

    /// Every image recorded for a project, any owner, any status.
    pub async fn images_for_project(&self, project: &str) -> Result<Vec<Image>, CatalogError> {
        Ok(self.images.list_project(project).await?)
    }

    /// Single-image lookup for its owner; a miss is a typed error.
    pub async fn get_image(
        &self,
        user: &UserContext,
        project: &str,
        endpoint: &str,
        name: &ImageName,
    ) -> Result<Image, CatalogError> {
        let key = ImageKey::new(&user.name, project, endpoint, name.clone());
        self.images
            .get(&key)
            .await?
            .ok_or_else(|| CatalogError::NotFound {
                user: user.name.clone(),
                name: name.as_str().to_string(),
            })
    }

    async fn resolve_filter(
        &self,
        user: &str,
        explicit: Option<ImageFilter>,
    ) -> Result<ImageFilter, CatalogError> {
        match explicit {
            Some(filter) => {
                self.filters.put(user, &filter).await?;
                Ok(filter)
            }
            None => match self.filters.get(user).await? {
                Some(filter) => Ok(filter),
                None => {
                    tracing::debug!("No stored filter for user {}; storing match-all", user);
                    let filter = ImageFilter::default();
                    self.filters.put(user, &filter).await?;
                    Ok(filter)
                }
            },
        }
    }
}

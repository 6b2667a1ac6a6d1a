// ABOUTME: Port to the per-user settings store.
// ABOUTME: Persists the catalog filter between sessions.

use async_trait::async_trait;

use crate::model::ImageFilter;

/// Errors from the settings store.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings backend error: {0}")]
    Backend(String),
}

/// Persisted per-user catalog filter.
#[async_trait]
pub trait FilterStore: Send + Sync {
    async fn get(&self, user: &str) -> Result<Option<ImageFilter>, SettingsError>;

    async fn put(&self, user: &str, filter: &ImageFilter) -> Result<(), SettingsError>;
}

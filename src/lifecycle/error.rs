// ABOUTME: Lifecycle error types with SNAFU pattern.
// ABOUTME: Wraps port failures and classifies them for programmatic handling.

use snafu::Snafu;

use crate::platform::{DirectoryError, InstanceError};
use crate::provisioning::GatewayError;
use crate::sharing::SharingError;
use crate::store::StoreError;

/// Unified error for create/terminate orchestration and callbacks.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum LifecycleError {
    #[snafu(display("source instance lookup failed: {source}"))]
    Instance { source: InstanceError },

    #[snafu(display("image store rejected the operation: {source}"))]
    Store { source: StoreError },

    #[snafu(display("provisioning dispatch failed: {source}"))]
    Gateway { source: GatewayError },

    #[snafu(display("directory lookup failed: {source}"))]
    Directory { source: DirectoryError },

    #[snafu(display("role creation failed: {source}"))]
    Sharing { source: SharingError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleErrorKind {
    /// A live image with that name already exists in the project.
    Conflict,
    /// Image, instance, project, or endpoint lookup missed.
    NotFound,
    /// The source instance exists but is not running.
    PreconditionFailed,
    /// The gateway call failed; local state stays in its in-flight status
    /// until reconciled by a retry or the failure callback.
    DispatchFailed,
    /// Store or directory infrastructure failure.
    Backend,
}

impl LifecycleError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> LifecycleErrorKind {
        match self {
            LifecycleError::Instance { source } => match source {
                InstanceError::NotFound { .. } => LifecycleErrorKind::NotFound,
                InstanceError::NotRunning { .. } => LifecycleErrorKind::PreconditionFailed,
                InstanceError::Backend(_) => LifecycleErrorKind::Backend,
            },
            LifecycleError::Store { source } => match source {
                StoreError::Conflict { .. } => LifecycleErrorKind::Conflict,
                StoreError::Backend(_) => LifecycleErrorKind::Backend,
            },
            LifecycleError::Gateway { .. } => LifecycleErrorKind::DispatchFailed,
            LifecycleError::Directory { source } => directory_kind(source),
            LifecycleError::Sharing { source } => match source {
                SharingError::Store(StoreError::Conflict { .. }) => LifecycleErrorKind::Conflict,
                SharingError::Store(StoreError::Backend(_)) => LifecycleErrorKind::Backend,
                SharingError::Directory(source) => directory_kind(source),
            },
        }
    }
}

fn directory_kind(source: &DirectoryError) -> LifecycleErrorKind {
    match source {
        DirectoryError::UnknownProject(_) | DirectoryError::UnknownEndpoint(_) => {
            LifecycleErrorKind::NotFound
        }
        DirectoryError::Backend(_) => LifecycleErrorKind::Backend,
    }
}

impl From<InstanceError> for LifecycleError {
    fn from(source: InstanceError) -> Self {
        LifecycleError::Instance { source }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(source: StoreError) -> Self {
        LifecycleError::Store { source }
    }
}

impl From<GatewayError> for LifecycleError {
    fn from(source: GatewayError) -> Self {
        LifecycleError::Gateway { source }
    }
}

impl From<DirectoryError> for LifecycleError {
    fn from(source: DirectoryError) -> Self {
        LifecycleError::Directory { source }
    }
}

impl From<SharingError> for LifecycleError {
    fn from(source: SharingError) -> Self {
        LifecycleError::Sharing { source }
    }
}

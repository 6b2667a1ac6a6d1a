// ABOUTME: Ports to the surrounding platform this crate is embedded in.
// ABOUTME: Instances, access checks, project directory, user settings.

mod access;
mod instances;
mod projects;
mod settings;

pub use access::{AccessChecker, Capability, UserContext};
pub use instances::{InstanceError, InstanceRecord, InstanceState, InstanceStore};
pub use projects::{DirectoryError, ProjectDirectory};
pub use settings::{FilterStore, SettingsError};

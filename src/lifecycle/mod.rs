// ABOUTME: Image lifecycle orchestration.
// ABOUTME: Create/terminate requests and the gateway completion callbacks.

mod error;
mod manager;

pub use error::{LifecycleError, LifecycleErrorKind};
pub use manager::LifecycleManager;

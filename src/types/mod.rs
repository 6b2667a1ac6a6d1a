// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;
mod image_key;
mod image_name;
mod moniker;

pub use id::{InstanceId, TrackingId};
pub use image_key::ImageKey;
pub use image_name::{ImageName, ImageNameError};
pub use moniker::RoleMoniker;

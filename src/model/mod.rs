// ABOUTME: Domain records shared across the crate.
// ABOUTME: Images, libraries, roles, filters, and derived per-viewer values.

mod filter;
mod image;
mod library;
mod permissions;
mod role;

pub use filter::{FilterFacets, ImageFilter};
pub use image::{Image, ImageStatus};
pub use library::{split_by_scope, Library, LibraryScope};
pub use permissions::{ImagePermissions, SharingStatus};
pub use role::{ImageRole, RoleKind};

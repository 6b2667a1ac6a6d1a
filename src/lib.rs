// ABOUTME: Library root for eikona - image lifecycle, sharing, and catalog.
// ABOUTME: Embedders implement the ports and share the services behind Arc.

pub mod catalog;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod platform;
pub mod provisioning;
pub mod sharing;
pub mod store;
pub mod types;

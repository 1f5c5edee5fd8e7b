//! Profilesync Core - service-profile synchronization
//!
//! This crate provides:
//! - `ServiceProfileService`: create/read/update/delete across the local store
//!   and the network-server
//! - `ServiceProfileQuery`: organization, user and global scoped count/list

mod error;
pub mod query;
pub mod service;

pub use query::ServiceProfileQuery;
pub use service::{LockedServiceProfile, ServiceProfileService, SyncConfig};

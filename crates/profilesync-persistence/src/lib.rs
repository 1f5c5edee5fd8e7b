//! Profilesync Persistence - Database entities and persistence layer
//!
//! This crate provides:
//! - SeaORM entity definitions
//! - Persistence trait abstractions over the external database and the
//!   embedded RocksDB store
//! - Domain model types for persistence operations

pub mod embedded;
pub mod entity;
pub mod error;
pub mod model;
pub mod sql;
pub mod traits;

// Re-export sea-orm for convenience
pub use sea_orm;

// Re-export entity prelude
pub use entity::prelude::*;

// Re-export persistence traits
pub use traits::{
    DirectoryPersistence, PersistenceService, ServiceProfilePersistence,
    ServiceProfileTransaction,
};

// Re-export SQL backend
pub use sql::ExternalDbPersistService;

// Re-export embedded backend
pub use embedded::EmbeddedPersistService;

pub use error::{StoreError, StoreResult};

// Re-export model types
pub use model::{
    NetworkServerInfo, OrganizationInfo, ProfileScope, StorageMode, UserInfo, now_millis,
};

//! Persistence traits for the unified storage abstraction layer
//!
//! This module defines the core persistence traits that abstract over the
//! storage backends: external database (MySQL/PostgreSQL) and standalone
//! embedded (RocksDB).

pub mod directory;
pub mod service_profile;

pub use directory::DirectoryPersistence;
pub use service_profile::{ServiceProfilePersistence, ServiceProfileTransaction};

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::StorageMode;

/// Unified persistence service trait
///
/// This is the main interface for all storage operations. Implementations
/// dispatch to the appropriate storage backend based on the configured mode.
#[async_trait]
pub trait PersistenceService:
    ServiceProfilePersistence + DirectoryPersistence + Send + Sync
{
    /// Get the current storage mode
    fn storage_mode(&self) -> StorageMode;

    /// Health check for the storage backend
    async fn health_check(&self) -> StoreResult<()>;
}

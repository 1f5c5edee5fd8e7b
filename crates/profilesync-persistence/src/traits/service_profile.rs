//! Service-profile persistence traits
//!
//! Defines the local record store for service profiles. The store never mints
//! identifiers: every row is inserted with the id returned by the network-server.

use async_trait::async_trait;
use profilesync_api::ServiceProfile;
use uuid::Uuid;

use crate::error::StoreResult;
use crate::model::ProfileScope;

/// A local transaction owned by exactly one orchestrator call.
///
/// Row locks taken through `get(id, true)` are held until the transaction is
/// committed, rolled back or dropped. Dropping an uncommitted transaction
/// rolls it back.
#[async_trait]
pub trait ServiceProfileTransaction: Send {
    /// Fetch a row. With `for_update` the row stays exclusively locked for the
    /// rest of the transaction.
    async fn get(&mut self, id: Uuid, for_update: bool) -> StoreResult<ServiceProfile>;

    /// Insert a new row, stamping `created_at` and `updated_at`.
    ///
    /// Fails with `ConstraintViolation` when the organization or
    /// network-server does not exist or the id is already taken.
    async fn insert(&mut self, profile: &mut ServiceProfile) -> StoreResult<()>;

    /// Refresh the mutable fields (`name`, cached policy) and stamp `updated_at`.
    ///
    /// Fails with `NotFound` when the row no longer exists.
    async fn update(&mut self, profile: &mut ServiceProfile) -> StoreResult<()>;

    /// Physically delete a row. Fails with `NotFound` when absent.
    async fn delete(&mut self, id: Uuid) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Service-profile persistence operations
#[async_trait]
pub trait ServiceProfilePersistence: Send + Sync {
    /// Start a local transaction
    async fn begin(&self) -> StoreResult<Box<dyn ServiceProfileTransaction>>;

    /// Fetch a row outside of any transaction
    async fn service_profile_get(&self, id: Uuid) -> StoreResult<ServiceProfile>;

    /// Verify that the organization and network-server exist
    async fn service_profile_check_references(
        &self,
        organization_id: i64,
        network_server_id: i64,
    ) -> StoreResult<()>;

    /// Count rows visible in `scope`
    async fn service_profile_count(&self, scope: &ProfileScope) -> StoreResult<u64>;

    /// List rows visible in `scope`, ordered by name then id
    async fn service_profile_list(
        &self,
        scope: &ProfileScope,
        limit: u64,
        offset: u64,
    ) -> StoreResult<Vec<ServiceProfile>>;
}

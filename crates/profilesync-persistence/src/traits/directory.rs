//! Directory persistence trait
//!
//! Minimal organization, network-server and membership storage backing the
//! referential integrity of service profiles and user-scoped queries.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{NetworkServerInfo, OrganizationInfo, UserInfo};

#[async_trait]
pub trait DirectoryPersistence: Send + Sync {
    async fn organization_create(&self, name: &str) -> StoreResult<OrganizationInfo>;

    async fn organization_find(&self, id: i64) -> StoreResult<Option<OrganizationInfo>>;

    async fn network_server_create(&self, name: &str, server: &str)
    -> StoreResult<NetworkServerInfo>;

    async fn network_server_find(&self, id: i64) -> StoreResult<Option<NetworkServerInfo>>;

    /// Create a user; fails with `ConstraintViolation` on a duplicate username
    async fn user_create(&self, username: &str) -> StoreResult<UserInfo>;

    /// Add a user to an organization
    async fn organization_user_create(
        &self,
        organization_id: i64,
        user_id: i64,
        is_admin: bool,
    ) -> StoreResult<()>;

    /// Ids of the organizations `username` is a member of.
    ///
    /// An unknown username yields an empty list, not an error.
    async fn organizations_for_user(&self, username: &str) -> StoreResult<Vec<i64>>;
}

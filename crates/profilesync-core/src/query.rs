//! Scoped counting and listing of service profiles
//!
//! Listings read the local store only; listed items carry the cached policy
//! document. Callers are responsible for deciding which scope a user may see.

use std::sync::Arc;

use profilesync_api::ServiceProfile;
use profilesync_common::Result;
use profilesync_persistence::{
    DirectoryPersistence, PersistenceService, ProfileScope, ServiceProfilePersistence,
};
use tracing::debug;

use crate::error::store_error;

pub struct ServiceProfileQuery {
    store: Arc<dyn PersistenceService>,
}

impl ServiceProfileQuery {
    pub fn new(store: Arc<dyn PersistenceService>) -> Self {
        Self { store }
    }

    async fn count(&self, scope: &ProfileScope) -> Result<u64> {
        self.store
            .service_profile_count(scope)
            .await
            .map_err(store_error)
    }

    async fn list(&self, scope: &ProfileScope, limit: u64, offset: u64) -> Result<Vec<ServiceProfile>> {
        self.store
            .service_profile_list(scope, limit, offset)
            .await
            .map_err(store_error)
    }

    async fn user_scope(&self, username: &str) -> Result<ProfileScope> {
        let organizations = self
            .store
            .organizations_for_user(username)
            .await
            .map_err(store_error)?;
        debug!(
            username = %username,
            organizations = organizations.len(),
            "Resolved organization memberships"
        );
        Ok(ProfileScope::Organizations(organizations))
    }

    /// Total number of service profiles (administrator view)
    pub async fn count_all(&self) -> Result<u64> {
        self.count(&ProfileScope::All).await
    }

    /// All service profiles ordered by name (administrator view)
    pub async fn list_all(&self, limit: u64, offset: u64) -> Result<Vec<ServiceProfile>> {
        self.list(&ProfileScope::All, limit, offset).await
    }

    pub async fn count_for_organization(&self, organization_id: i64) -> Result<u64> {
        self.count(&ProfileScope::Organization(organization_id)).await
    }

    pub async fn list_for_organization(
        &self,
        organization_id: i64,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ServiceProfile>> {
        self.list(&ProfileScope::Organization(organization_id), limit, offset)
            .await
    }

    /// Number of service profiles in any organization `username` belongs to
    pub async fn count_for_user(&self, username: &str) -> Result<u64> {
        let scope = self.user_scope(username).await?;
        self.count(&scope).await
    }

    pub async fn list_for_user(
        &self,
        username: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ServiceProfile>> {
        let scope = self.user_scope(username).await?;
        self.list(&scope, limit, offset).await
    }
}

//! Service-profile synchronization service
//!
//! Every mutating operation touches two stores: the local relational row and the
//! network-server policy. The network-server mints profile ids, so creation is a
//! two-step constructor. When only one of the two steps lands, the operation
//! fails with `PartialCommit` and the divergence is logged at error level; no
//! background repair is attempted.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use profilesync_api::ServiceProfile;
use profilesync_client::{ClientError, FailureKind, PolicyClient};
use profilesync_common::{DEFAULT_REMOTE_TIMEOUT_MS, Operation, ProfileSyncError, Result};
use profilesync_persistence::{
    PersistenceService, ServiceProfilePersistence, ServiceProfileTransaction, StoreResult,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{remote_detail, remote_error, store_error};

/// Tunables of the synchronization service
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Upper bound for every network-server call
    pub remote_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
        }
    }
}

/// A service profile read with its local row exclusively locked.
///
/// The lock lives as long as this value. Pass it to
/// [`ServiceProfileService::update_locked`] to write, or drop it (or call
/// [`LockedServiceProfile::release`]) to give the row back untouched.
pub struct LockedServiceProfile {
    tx: Box<dyn ServiceProfileTransaction>,
    profile: ServiceProfile,
}

impl LockedServiceProfile {
    pub fn profile(&self) -> &ServiceProfile {
        &self.profile
    }

    pub fn id(&self) -> Uuid {
        self.profile.id
    }

    /// Release the row lock without writing anything
    pub async fn release(self) -> Result<()> {
        self.tx.rollback().await.map_err(store_error)
    }
}

/// Keeps the local service-profile rows and the network-server policies in step
pub struct ServiceProfileService {
    store: Arc<dyn PersistenceService>,
    policies: Arc<dyn PolicyClient>,
    config: SyncConfig,
}

impl ServiceProfileService {
    pub fn new(store: Arc<dyn PersistenceService>, policies: Arc<dyn PolicyClient>) -> Self {
        Self::with_config(store, policies, SyncConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn PersistenceService>,
        policies: Arc<dyn PolicyClient>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            policies,
            config,
        }
    }

    /// Run a network-server call under the configured timeout
    async fn remote<T, F>(&self, call: F) -> std::result::Result<T, ClientError>
    where
        F: Future<Output = std::result::Result<T, ClientError>>,
    {
        match tokio::time::timeout(self.config.remote_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout),
        }
    }

    fn partial_commit(&self, id: Uuid, operation: Operation, cause: String) -> ProfileSyncError {
        error!(
            profile_id = %id,
            operation = operation.as_str(),
            cause = %cause,
            "Service profile diverged between local store and network-server"
        );
        ProfileSyncError::partial_commit(id, operation, cause)
    }

    /// Create a service profile on the network-server and locally.
    ///
    /// On success `profile.id` holds the id minted by the network-server and the
    /// timestamps are set.
    pub async fn create(&self, profile: &mut ServiceProfile) -> Result<()> {
        if profile.organization_id <= 0 {
            return Err(ProfileSyncError::ConstraintViolation(
                "organization_id is required".to_string(),
            ));
        }
        if profile.network_server_id <= 0 {
            return Err(ProfileSyncError::ConstraintViolation(
                "network_server_id is required".to_string(),
            ));
        }

        self.store
            .service_profile_check_references(profile.organization_id, profile.network_server_id)
            .await
            .map_err(store_error)?;

        let id = self
            .remote(self.policies.create_policy(&profile.policy))
            .await
            .map_err(|e| {
                warn!(
                    organization_id = profile.organization_id,
                    error = %e,
                    "Network-server refused to create service profile"
                );
                remote_error(e)
            })?;
        profile.id = id;

        if let Err(local_err) = self.insert_local(profile).await {
            let local_err = store_error(local_err);
            return Err(self.compensate_create(profile, local_err).await);
        }

        info!(
            profile_id = %id,
            organization_id = profile.organization_id,
            network_server_id = profile.network_server_id,
            "Service profile created"
        );
        Ok(())
    }

    async fn insert_local(&self, profile: &mut ServiceProfile) -> StoreResult<()> {
        let mut tx = self.store.begin().await?;
        tx.insert(profile).await?;
        tx.commit().await
    }

    /// Remove the policy minted for a create whose local insert failed
    async fn compensate_create(
        &self,
        profile: &mut ServiceProfile,
        local_err: ProfileSyncError,
    ) -> ProfileSyncError {
        let id = profile.id;

        // The policy behind an id already stored locally belongs to that row
        if matches!(local_err, ProfileSyncError::ConstraintViolation(_))
            && self.store.service_profile_get(id).await.is_ok()
        {
            return self.partial_commit(
                id,
                Operation::Create,
                format!(
                    "network-server returned id {} which a local service profile already uses; its policy was left in place: {}",
                    id, local_err
                ),
            );
        }

        let compensation = self.remote(self.policies.delete_policy(id)).await;

        match compensation {
            Ok(()) => {}
            Err(e) if e.kind() == FailureKind::NotFound => {}
            Err(e) => {
                return self.partial_commit(
                    id,
                    Operation::Create,
                    format!(
                        "local insert failed: {}; removing the network-server policy failed: {}",
                        local_err,
                        remote_detail(&e)
                    ),
                );
            }
        }

        warn!(
            profile_id = %id,
            error = %local_err,
            "Local insert failed, network-server policy removed"
        );
        profile.id = Uuid::nil();
        local_err
    }

    /// Read a service profile: local metadata merged with the network-server policy.
    pub async fn get(&self, id: Uuid) -> Result<ServiceProfile> {
        let mut profile = self
            .store
            .service_profile_get(id)
            .await
            .map_err(store_error)?;

        profile.policy = self
            .remote(self.policies.get_policy(id))
            .await
            .map_err(remote_error)?;

        debug!(profile_id = %id, "Service profile read");
        Ok(profile)
    }

    /// Lock the local row without consulting the network-server
    async fn lock_row(&self, id: Uuid) -> Result<LockedServiceProfile> {
        let mut tx = self.store.begin().await.map_err(store_error)?;
        let profile = tx.get(id, true).await.map_err(store_error)?;
        Ok(LockedServiceProfile { tx, profile })
    }

    /// Read a service profile and keep its local row locked for a later update.
    pub async fn get_for_update(&self, id: Uuid) -> Result<LockedServiceProfile> {
        let mut locked = self.lock_row(id).await?;

        locked.profile.policy = self
            .remote(self.policies.get_policy(id))
            .await
            .map_err(remote_error)?;

        debug!(profile_id = %id, "Service profile read for update");
        Ok(locked)
    }

    /// Update the name and policy of an existing service profile.
    ///
    /// `organization_id` and `network_server_id` are immutable.
    pub async fn update(&self, profile: &mut ServiceProfile) -> Result<()> {
        if profile.id.is_nil() {
            return Err(ProfileSyncError::InvalidArgument(
                "service profile id is required".to_string(),
            ));
        }

        let locked = self.lock_row(profile.id).await?;
        self.update_locked(locked, profile).await
    }

    /// Update a service profile whose row was locked by
    /// [`ServiceProfileService::get_for_update`]. The lock is released on return.
    pub async fn update_locked(
        &self,
        locked: LockedServiceProfile,
        profile: &mut ServiceProfile,
    ) -> Result<()> {
        let LockedServiceProfile { mut tx, profile: current } = locked;
        let id = current.id;

        if profile.id != id {
            return Err(ProfileSyncError::InvalidArgument(format!(
                "service profile {} does not match the locked row {}",
                profile.id, id
            )));
        }
        if profile.organization_id != current.organization_id {
            return Err(ProfileSyncError::InvalidArgument(
                "organization_id can not be changed".to_string(),
            ));
        }
        if profile.network_server_id != current.network_server_id {
            return Err(ProfileSyncError::InvalidArgument(
                "network_server_id can not be changed".to_string(),
            ));
        }

        if let Err(e) = self
            .remote(self.policies.update_policy(id, &profile.policy))
            .await
        {
            warn!(profile_id = %id, error = %e, "Network-server refused service profile update");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(profile_id = %id, error = %rollback_err, "Rollback failed");
            }
            return Err(remote_error(e));
        }

        let local = match tx.update(profile).await {
            Ok(()) => tx.commit().await,
            Err(e) => Err(e),
        };
        if let Err(e) = local {
            return Err(self.partial_commit(
                id,
                Operation::Update,
                format!("local update failed: {}", store_error(e)),
            ));
        }

        profile.created_at = current.created_at;
        info!(profile_id = %id, "Service profile updated");
        Ok(())
    }

    /// Delete a service profile locally, then on the network-server.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.delete_local(id).await.map_err(store_error)?;

        match self.remote(self.policies.delete_policy(id)).await {
            Ok(()) => {}
            Err(e) if e.kind() == FailureKind::NotFound => {
                warn!(profile_id = %id, "Network-server policy was already gone");
            }
            Err(e) => {
                return Err(self.partial_commit(
                    id,
                    Operation::Delete,
                    format!("network-server delete failed: {}", remote_error(e)),
                ));
            }
        }

        info!(profile_id = %id, "Service profile deleted");
        Ok(())
    }

    async fn delete_local(&self, id: Uuid) -> StoreResult<()> {
        let mut tx = self.store.begin().await?;
        tx.delete(id).await?;
        tx.commit().await
    }
}

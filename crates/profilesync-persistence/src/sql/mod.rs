//! SQL-based persistence backend (MySQL/PostgreSQL via SeaORM)
//!
//! Row locks map to `SELECT ... FOR UPDATE` inside a `DatabaseTransaction`;
//! SeaORM rolls an uncommitted transaction back when it is dropped, which
//! releases the locks on every exit path.

use async_trait::async_trait;
use profilesync_api::ServiceProfile;
use sea_orm::{prelude::Expr, *};
use tracing::debug;
use uuid::Uuid;

use crate::entity::{network_server, organization, organization_user, service_profile, user};
use crate::error::{StoreError, StoreResult};
use crate::model::*;
use crate::traits::*;

/// External database persistence service
///
/// Wraps a SeaORM `DatabaseConnection` and implements all persistence traits
/// by direct database queries.
pub struct ExternalDbPersistService {
    db: DatabaseConnection,
}

impl ExternalDbPersistService {
    /// Create a new ExternalDbPersistService with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Get a reference to the underlying database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// ============================================================================
// PersistenceService implementation
// ============================================================================

#[async_trait]
impl PersistenceService for ExternalDbPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::ExternalDb
    }

    async fn health_check(&self) -> StoreResult<()> {
        // Execute a simple query to verify connectivity
        organization::Entity::find()
            .select_only()
            .column_as(Expr::cust("1"), "health")
            .into_tuple::<i32>()
            .one(&self.db)
            .await?;
        Ok(())
    }
}

// ============================================================================
// ServiceProfilePersistence implementation
// ============================================================================

fn profile_from_model(model: service_profile::Model) -> StoreResult<ServiceProfile> {
    Ok(ServiceProfile {
        id: model.id,
        organization_id: model.organization_id,
        network_server_id: model.network_server_id,
        name: model.name,
        policy: serde_json::from_value(model.policy)?,
        created_at: model.created_at.and_utc(),
        updated_at: model.updated_at.and_utc(),
    })
}

/// Base select restricted to the rows visible in `scope`.
fn scoped_select(scope: &ProfileScope) -> Select<service_profile::Entity> {
    let select = service_profile::Entity::find();
    match scope {
        ProfileScope::All => select,
        ProfileScope::Organization(id) => {
            select.filter(service_profile::Column::OrganizationId.eq(*id))
        }
        ProfileScope::Organizations(ids) => {
            select.filter(service_profile::Column::OrganizationId.is_in(ids.iter().copied()))
        }
    }
}

/// A service-profile transaction on the external database
pub struct SqlServiceProfileTransaction {
    tx: DatabaseTransaction,
}

#[async_trait]
impl ServiceProfileTransaction for SqlServiceProfileTransaction {
    async fn get(&mut self, id: Uuid, for_update: bool) -> StoreResult<ServiceProfile> {
        let mut select = service_profile::Entity::find_by_id(id);
        if for_update {
            select = select.lock_exclusive();
        }

        let model = select.one(&self.tx).await?.ok_or(StoreError::NotFound)?;
        profile_from_model(model)
    }

    async fn insert(&mut self, profile: &mut ServiceProfile) -> StoreResult<()> {
        let now = now_millis();
        let entity = service_profile::ActiveModel {
            id: Set(profile.id),
            organization_id: Set(profile.organization_id),
            network_server_id: Set(profile.network_server_id),
            name: Set(profile.name.clone()),
            policy: Set(serde_json::to_value(&profile.policy)?),
            created_at: Set(now.naive_utc()),
            updated_at: Set(now.naive_utc()),
        };

        service_profile::Entity::insert(entity)
            .exec_without_returning(&self.tx)
            .await?;

        profile.created_at = now;
        profile.updated_at = now;
        debug!(id = %profile.id, "service-profile row inserted");
        Ok(())
    }

    async fn update(&mut self, profile: &mut ServiceProfile) -> StoreResult<()> {
        let now = now_millis();
        let result = service_profile::Entity::update_many()
            .col_expr(
                service_profile::Column::Name,
                Expr::value(profile.name.clone()),
            )
            .col_expr(
                service_profile::Column::Policy,
                Expr::value(serde_json::to_value(&profile.policy)?),
            )
            .col_expr(service_profile::Column::UpdatedAt, Expr::value(now.naive_utc()))
            .filter(service_profile::Column::Id.eq(profile.id))
            .exec(&self.tx)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        profile.updated_at = now;
        debug!(id = %profile.id, "service-profile row updated");
        Ok(())
    }

    async fn delete(&mut self, id: Uuid) -> StoreResult<()> {
        let result = service_profile::Entity::delete_by_id(id)
            .exec(&self.tx)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        debug!(id = %id, "service-profile row deleted");
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl ServiceProfilePersistence for ExternalDbPersistService {
    async fn begin(&self) -> StoreResult<Box<dyn ServiceProfileTransaction>> {
        let tx = self.db.begin().await?;
        Ok(Box::new(SqlServiceProfileTransaction { tx }))
    }

    async fn service_profile_get(&self, id: Uuid) -> StoreResult<ServiceProfile> {
        let model = service_profile::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(StoreError::NotFound)?;
        profile_from_model(model)
    }

    async fn service_profile_check_references(
        &self,
        organization_id: i64,
        network_server_id: i64,
    ) -> StoreResult<()> {
        if organization::Entity::find_by_id(organization_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(StoreError::ConstraintViolation(format!(
                "organization {} does not exist",
                organization_id
            )));
        }

        if network_server::Entity::find_by_id(network_server_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(StoreError::ConstraintViolation(format!(
                "network-server {} does not exist",
                network_server_id
            )));
        }

        Ok(())
    }

    async fn service_profile_count(&self, scope: &ProfileScope) -> StoreResult<u64> {
        if scope.is_empty() {
            return Ok(0);
        }

        let count = scoped_select(scope).count(&self.db).await?;
        Ok(count)
    }

    async fn service_profile_list(
        &self,
        scope: &ProfileScope,
        limit: u64,
        offset: u64,
    ) -> StoreResult<Vec<ServiceProfile>> {
        if limit == 0 || scope.is_empty() {
            return Ok(Vec::new());
        }

        scoped_select(scope)
            .order_by_asc(service_profile::Column::Name)
            .order_by_asc(service_profile::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(profile_from_model)
            .collect()
    }
}

// ============================================================================
// DirectoryPersistence implementation
// ============================================================================

#[async_trait]
impl DirectoryPersistence for ExternalDbPersistService {
    async fn organization_create(&self, name: &str) -> StoreResult<OrganizationInfo> {
        let now = now_millis().naive_utc();
        let model = organization::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(OrganizationInfo {
            id: model.id,
            name: model.name,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.and_utc(),
        })
    }

    async fn organization_find(&self, id: i64) -> StoreResult<Option<OrganizationInfo>> {
        let model = organization::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(|m| OrganizationInfo {
            id: m.id,
            name: m.name,
            created_at: m.created_at.and_utc(),
            updated_at: m.updated_at.and_utc(),
        }))
    }

    async fn network_server_create(
        &self,
        name: &str,
        server: &str,
    ) -> StoreResult<NetworkServerInfo> {
        let now = now_millis().naive_utc();
        let model = network_server::ActiveModel {
            name: Set(name.to_string()),
            server: Set(server.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(NetworkServerInfo {
            id: model.id,
            name: model.name,
            server: model.server,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.and_utc(),
        })
    }

    async fn network_server_find(&self, id: i64) -> StoreResult<Option<NetworkServerInfo>> {
        let model = network_server::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(|m| NetworkServerInfo {
            id: m.id,
            name: m.name,
            server: m.server,
            created_at: m.created_at.and_utc(),
            updated_at: m.updated_at.and_utc(),
        }))
    }

    async fn user_create(&self, username: &str) -> StoreResult<UserInfo> {
        let now = now_millis().naive_utc();
        let model = user::ActiveModel {
            username: Set(username.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(UserInfo {
            id: model.id,
            username: model.username,
            created_at: model.created_at.and_utc(),
            updated_at: model.updated_at.and_utc(),
        })
    }

    async fn organization_user_create(
        &self,
        organization_id: i64,
        user_id: i64,
        is_admin: bool,
    ) -> StoreResult<()> {
        let now = now_millis().naive_utc();
        organization_user::ActiveModel {
            organization_id: Set(organization_id),
            user_id: Set(user_id),
            is_admin: Set(is_admin),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    async fn organizations_for_user(&self, username: &str) -> StoreResult<Vec<i64>> {
        let mut ids = organization_user::Entity::find()
            .select_only()
            .column(organization_user::Column::OrganizationId)
            .inner_join(user::Entity)
            .filter(user::Column::Username.eq(username))
            .into_tuple::<i64>()
            .all(&self.db)
            .await?;

        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

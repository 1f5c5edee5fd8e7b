// Embedded persistence backend using RocksDB
// Provides standalone (single-node) storage without an external database

mod lock;

pub use lock::RowLocks;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use profilesync_api::ServiceProfile;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::model::*;
use crate::traits::*;

pub const CF_ORGANIZATION: &str = "organization";
pub const CF_NETWORK_SERVER: &str = "network_server";
pub const CF_USER: &str = "user";
pub const CF_USER_NAME: &str = "user_name";
pub const CF_ORGANIZATION_USER: &str = "organization_user";
pub const CF_SERVICE_PROFILE: &str = "service_profile";
pub const CF_SEQUENCE: &str = "sequence";

const COLUMN_FAMILIES: [&str; 7] = [
    CF_ORGANIZATION,
    CF_NETWORK_SERVER,
    CF_USER,
    CF_USER_NAME,
    CF_ORGANIZATION_USER,
    CF_SERVICE_PROFILE,
    CF_SEQUENCE,
];

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembershipRecord {
    is_admin: bool,
}

fn cf_handle<'a>(db: &'a DB, name: &str) -> StoreResult<&'a ColumnFamily> {
    db.cf_handle(name)
        .ok_or_else(|| StoreError::Database(format!("Column family '{}' not found", name)))
}

fn read_json<T: DeserializeOwned>(db: &DB, cf_name: &str, key: &[u8]) -> StoreResult<Option<T>> {
    let cf = cf_handle(db, cf_name)?;
    match db.get_cf(cf, key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

fn membership_key(user_id: i64, organization_id: i64) -> Vec<u8> {
    let mut key = Vec::with_capacity(16);
    key.extend_from_slice(&user_id.to_be_bytes());
    key.extend_from_slice(&organization_id.to_be_bytes());
    key
}

/// Standalone embedded persistence using RocksDB
///
/// Each table lives in its own column family with JSON values. Row locks are
/// process-local, so a data directory must only be opened by one process.
pub struct EmbeddedPersistService {
    db: Arc<DB>,
    locks: Arc<RowLocks>,
    // Serializes directory writes (sequence allocation and uniqueness checks)
    directory_lock: Mutex<()>,
}

impl EmbeddedPersistService {
    /// Open (or create) a RocksDB store at `path` with every column family
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cfs = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cfs)?;
        info!(path = %path.as_ref().display(), "Embedded RocksDB store opened");

        Ok(Self::new(Arc::new(db)))
    }

    /// Create from a raw RocksDB instance that already carries the column families
    pub fn new(db: Arc<DB>) -> Self {
        Self {
            db,
            locks: Arc::new(RowLocks::new()),
            directory_lock: Mutex::new(()),
        }
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> StoreResult<()> {
        let cf = cf_handle(&self.db, cf_name)?;
        self.db.put_cf(cf, key, serde_json::to_vec(value)?)?;
        Ok(())
    }

    /// Allocate the next id of a sequence; caller must hold `directory_lock`
    fn next_id(&self, sequence: &str) -> StoreResult<i64> {
        let cf = cf_handle(&self.db, CF_SEQUENCE)?;
        let current = match self.db.get_cf(cf, sequence.as_bytes())? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::Database(format!("corrupt sequence '{}'", sequence))
                })?;
                i64::from_be_bytes(raw)
            }
            None => 0,
        };

        let next = current + 1;
        self.db.put_cf(cf, sequence.as_bytes(), next.to_be_bytes())?;
        Ok(next)
    }

    fn all_profiles(&self, scope: &ProfileScope) -> StoreResult<Vec<ServiceProfile>> {
        let cf = cf_handle(&self.db, CF_SERVICE_PROFILE)?;
        let mut profiles = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_, value) = item?;
            let profile: ServiceProfile = serde_json::from_slice(&value)?;
            if scope.contains(profile.organization_id) {
                profiles.push(profile);
            }
        }

        Ok(profiles)
    }
}

// ============================================================================
// PersistenceService implementation
// ============================================================================

#[async_trait]
impl PersistenceService for EmbeddedPersistService {
    fn storage_mode(&self) -> StorageMode {
        StorageMode::StandaloneEmbedded
    }

    async fn health_check(&self) -> StoreResult<()> {
        for name in COLUMN_FAMILIES {
            cf_handle(&self.db, name)?;
        }
        Ok(())
    }
}

// ============================================================================
// ServiceProfilePersistence implementation
// ============================================================================

/// A service-profile transaction on the embedded store
///
/// Writes are buffered and applied atomically as one `WriteBatch` on commit.
/// Every row the transaction touches stays locked until commit, rollback or
/// drop.
pub struct EmbeddedServiceProfileTransaction {
    db: Arc<DB>,
    locks: Arc<RowLocks>,
    held: HashMap<Uuid, OwnedMutexGuard<()>>,
    pending: HashMap<Uuid, Option<ServiceProfile>>,
}

impl EmbeddedServiceProfileTransaction {
    async fn lock_row(&mut self, id: Uuid) {
        if !self.held.contains_key(&id) {
            let guard = self.locks.acquire(id).await;
            self.held.insert(id, guard);
        }
    }

    /// Current view of a row, including this transaction's own writes
    fn load(&self, id: Uuid) -> StoreResult<Option<ServiceProfile>> {
        if let Some(pending) = self.pending.get(&id) {
            return Ok(pending.clone());
        }
        read_json(&self.db, CF_SERVICE_PROFILE, id.as_bytes())
    }

    fn release_all(&mut self) {
        self.pending.clear();
        for (id, guard) in self.held.drain() {
            self.locks.release(&id, guard);
        }
    }
}

impl Drop for EmbeddedServiceProfileTransaction {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[async_trait]
impl ServiceProfileTransaction for EmbeddedServiceProfileTransaction {
    async fn get(&mut self, id: Uuid, for_update: bool) -> StoreResult<ServiceProfile> {
        if for_update {
            self.lock_row(id).await;
        }
        self.load(id)?.ok_or(StoreError::NotFound)
    }

    async fn insert(&mut self, profile: &mut ServiceProfile) -> StoreResult<()> {
        self.lock_row(profile.id).await;

        if self.load(profile.id)?.is_some() {
            return Err(StoreError::ConstraintViolation(format!(
                "service profile {} already exists",
                profile.id
            )));
        }

        let organization: Option<OrganizationInfo> = read_json(
            &self.db,
            CF_ORGANIZATION,
            &profile.organization_id.to_be_bytes(),
        )?;
        if organization.is_none() {
            return Err(StoreError::ConstraintViolation(format!(
                "organization {} does not exist",
                profile.organization_id
            )));
        }

        let network_server: Option<NetworkServerInfo> = read_json(
            &self.db,
            CF_NETWORK_SERVER,
            &profile.network_server_id.to_be_bytes(),
        )?;
        if network_server.is_none() {
            return Err(StoreError::ConstraintViolation(format!(
                "network-server {} does not exist",
                profile.network_server_id
            )));
        }

        let now = now_millis();
        profile.created_at = now;
        profile.updated_at = now;
        self.pending.insert(profile.id, Some(profile.clone()));
        debug!(id = %profile.id, "service-profile row inserted");
        Ok(())
    }

    async fn update(&mut self, profile: &mut ServiceProfile) -> StoreResult<()> {
        self.lock_row(profile.id).await;

        let mut row = self.load(profile.id)?.ok_or(StoreError::NotFound)?;
        let now = now_millis();
        row.name = profile.name.clone();
        row.policy = profile.policy.clone();
        row.updated_at = now;
        profile.updated_at = now;

        self.pending.insert(profile.id, Some(row));
        debug!(id = %profile.id, "service-profile row updated");
        Ok(())
    }

    async fn delete(&mut self, id: Uuid) -> StoreResult<()> {
        self.lock_row(id).await;

        if self.load(id)?.is_none() {
            return Err(StoreError::NotFound);
        }

        self.pending.insert(id, None);
        debug!(id = %id, "service-profile row deleted");
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut this = self;
        if !this.pending.is_empty() {
            let cf = cf_handle(&this.db, CF_SERVICE_PROFILE)?;
            let mut batch = rocksdb::WriteBatch::default();
            for (id, row) in &this.pending {
                match row {
                    Some(profile) => batch.put_cf(cf, id.as_bytes(), serde_json::to_vec(profile)?),
                    None => batch.delete_cf(cf, id.as_bytes()),
                }
            }
            this.db.write(batch)?;
        }

        this.release_all();
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        let mut this = self;
        this.release_all();
        Ok(())
    }
}

#[async_trait]
impl ServiceProfilePersistence for EmbeddedPersistService {
    async fn begin(&self) -> StoreResult<Box<dyn ServiceProfileTransaction>> {
        Ok(Box::new(EmbeddedServiceProfileTransaction {
            db: self.db.clone(),
            locks: self.locks.clone(),
            held: HashMap::new(),
            pending: HashMap::new(),
        }))
    }

    async fn service_profile_get(&self, id: Uuid) -> StoreResult<ServiceProfile> {
        read_json(&self.db, CF_SERVICE_PROFILE, id.as_bytes())?.ok_or(StoreError::NotFound)
    }

    async fn service_profile_check_references(
        &self,
        organization_id: i64,
        network_server_id: i64,
    ) -> StoreResult<()> {
        if self.organization_find(organization_id).await?.is_none() {
            return Err(StoreError::ConstraintViolation(format!(
                "organization {} does not exist",
                organization_id
            )));
        }
        if self.network_server_find(network_server_id).await?.is_none() {
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
        Ok(self.all_profiles(scope)?.len() as u64)
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

        let mut profiles = self.all_profiles(scope)?;
        profiles.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(profiles
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

// ============================================================================
// DirectoryPersistence implementation
// ============================================================================

#[async_trait]
impl DirectoryPersistence for EmbeddedPersistService {
    async fn organization_create(&self, name: &str) -> StoreResult<OrganizationInfo> {
        let _guard = self.directory_lock.lock();
        let now = now_millis();
        let info = OrganizationInfo {
            id: self.next_id(CF_ORGANIZATION)?,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.put_json(CF_ORGANIZATION, &info.id.to_be_bytes(), &info)?;
        Ok(info)
    }

    async fn organization_find(&self, id: i64) -> StoreResult<Option<OrganizationInfo>> {
        read_json(&self.db, CF_ORGANIZATION, &id.to_be_bytes())
    }

    async fn network_server_create(
        &self,
        name: &str,
        server: &str,
    ) -> StoreResult<NetworkServerInfo> {
        let _guard = self.directory_lock.lock();
        let now = now_millis();
        let info = NetworkServerInfo {
            id: self.next_id(CF_NETWORK_SERVER)?,
            name: name.to_string(),
            server: server.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.put_json(CF_NETWORK_SERVER, &info.id.to_be_bytes(), &info)?;
        Ok(info)
    }

    async fn network_server_find(&self, id: i64) -> StoreResult<Option<NetworkServerInfo>> {
        read_json(&self.db, CF_NETWORK_SERVER, &id.to_be_bytes())
    }

    async fn user_create(&self, username: &str) -> StoreResult<UserInfo> {
        let _guard = self.directory_lock.lock();

        let existing: Option<i64> = read_json(&self.db, CF_USER_NAME, username.as_bytes())?;
        if existing.is_some() {
            return Err(StoreError::ConstraintViolation(format!(
                "username '{}' already exists",
                username
            )));
        }

        let now = now_millis();
        let info = UserInfo {
            id: self.next_id(CF_USER)?,
            username: username.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.put_json(CF_USER, &info.id.to_be_bytes(), &info)?;
        self.put_json(CF_USER_NAME, username.as_bytes(), &info.id)?;
        Ok(info)
    }

    async fn organization_user_create(
        &self,
        organization_id: i64,
        user_id: i64,
        is_admin: bool,
    ) -> StoreResult<()> {
        let _guard = self.directory_lock.lock();

        let organization: Option<OrganizationInfo> =
            read_json(&self.db, CF_ORGANIZATION, &organization_id.to_be_bytes())?;
        if organization.is_none() {
            return Err(StoreError::ConstraintViolation(format!(
                "organization {} does not exist",
                organization_id
            )));
        }

        let user: Option<UserInfo> = read_json(&self.db, CF_USER, &user_id.to_be_bytes())?;
        if user.is_none() {
            return Err(StoreError::ConstraintViolation(format!(
                "user {} does not exist",
                user_id
            )));
        }

        self.put_json(
            CF_ORGANIZATION_USER,
            &membership_key(user_id, organization_id),
            &MembershipRecord { is_admin },
        )
    }

    async fn organizations_for_user(&self, username: &str) -> StoreResult<Vec<i64>> {
        let Some(user_id) = read_json::<i64>(&self.db, CF_USER_NAME, username.as_bytes())? else {
            return Ok(Vec::new());
        };

        let prefix = user_id.to_be_bytes();
        let cf = cf_handle(&self.db, CF_ORGANIZATION_USER)?;
        let mut ids = Vec::new();

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(&prefix[..], Direction::Forward));
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix[..]) {
                break;
            }
            let raw: [u8; 8] = key[8..].try_into().map_err(|_| {
                StoreError::Database("corrupt organization_user key".to_string())
            })?;
            ids.push(i64::from_be_bytes(raw));
        }

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use profilesync_api::PolicyDocument;
    use tempfile::TempDir;

    use super::*;

    fn create_test_service() -> (EmbeddedPersistService, TempDir) {
        let tmp_dir = TempDir::new().unwrap();
        let service = EmbeddedPersistService::open(tmp_dir.path()).unwrap();
        (service, tmp_dir)
    }

    async fn seed(svc: &EmbeddedPersistService) -> (i64, i64) {
        let org = svc.organization_create("acme").await.unwrap();
        let ns = svc
            .network_server_create("ns-1", "ns.local:8000")
            .await
            .unwrap();
        (org.id, ns.id)
    }

    async fn insert_profile(
        svc: &EmbeddedPersistService,
        org: i64,
        ns: i64,
        name: &str,
    ) -> ServiceProfile {
        let mut profile = ServiceProfile::new(org, ns, name, PolicyDocument::default());
        profile.id = Uuid::new_v4();
        let mut tx = svc.begin().await.unwrap();
        tx.insert(&mut profile).await.unwrap();
        tx.commit().await.unwrap();
        profile
    }

    // ==================== Directory Tests ====================

    #[tokio::test]
    async fn test_directory_ids_are_sequential() {
        let (svc, _tmp) = create_test_service();

        let first = svc.organization_create("a").await.unwrap();
        let second = svc.organization_create("b").await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let found = svc.organization_find(2).await.unwrap().unwrap();
        assert_eq!(found.name, "b");
        assert!(svc.organization_find(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_create_rejects_duplicate_username() {
        let (svc, _tmp) = create_test_service();

        svc.user_create("alice").await.unwrap();
        let err = svc.user_create("alice").await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_organizations_for_user() {
        let (svc, _tmp) = create_test_service();

        let org_a = svc.organization_create("a").await.unwrap();
        let org_b = svc.organization_create("b").await.unwrap();
        svc.organization_create("c").await.unwrap();
        let alice = svc.user_create("alice").await.unwrap();
        let bob = svc.user_create("bob").await.unwrap();

        svc.organization_user_create(org_b.id, alice.id, false)
            .await
            .unwrap();
        svc.organization_user_create(org_a.id, alice.id, true)
            .await
            .unwrap();
        svc.organization_user_create(org_a.id, bob.id, false)
            .await
            .unwrap();

        assert_eq!(
            svc.organizations_for_user("alice").await.unwrap(),
            vec![org_a.id, org_b.id]
        );
        assert_eq!(
            svc.organizations_for_user("bob").await.unwrap(),
            vec![org_a.id]
        );
        assert!(svc.organizations_for_user("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_organization_user_requires_existing_rows() {
        let (svc, _tmp) = create_test_service();
        let org = svc.organization_create("a").await.unwrap();

        let err = svc
            .organization_user_create(org.id, 42, false)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    // ==================== Service Profile Tests ====================

    #[tokio::test]
    async fn test_insert_and_get() {
        let (svc, _tmp) = create_test_service();
        let (org, ns) = seed(&svc).await;

        let profile = insert_profile(&svc, org, ns, "sp-1").await;
        assert_eq!(profile.created_at, profile.updated_at);

        let stored = svc.service_profile_get(profile.id).await.unwrap();
        assert_eq!(stored, profile);
    }

    #[tokio::test]
    async fn test_insert_requires_existing_references() {
        let (svc, _tmp) = create_test_service();
        let (org, _ns) = seed(&svc).await;

        let mut profile = ServiceProfile::new(org, 999, "sp", PolicyDocument::default());
        profile.id = Uuid::new_v4();
        let mut tx = svc.begin().await.unwrap();
        let err = tx.insert(&mut profile).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));

        let err = svc
            .service_profile_check_references(999, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_insert_duplicate_id() {
        let (svc, _tmp) = create_test_service();
        let (org, ns) = seed(&svc).await;
        let existing = insert_profile(&svc, org, ns, "sp").await;

        let mut duplicate = existing.clone();
        let mut tx = svc.begin().await.unwrap();
        let err = tx.insert(&mut duplicate).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let (svc, _tmp) = create_test_service();
        let (org, ns) = seed(&svc).await;

        let mut profile = ServiceProfile::new(org, ns, "sp", PolicyDocument::default());
        profile.id = Uuid::new_v4();
        let mut tx = svc.begin().await.unwrap();
        tx.insert(&mut profile).await.unwrap();
        assert_eq!(tx.get(profile.id, false).await.unwrap().name, "sp");
        tx.rollback().await.unwrap();

        let err = svc.service_profile_get(profile.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let (svc, _tmp) = create_test_service();
        let (org, ns) = seed(&svc).await;
        let profile = insert_profile(&svc, org, ns, "sp").await;

        {
            let mut tx = svc.begin().await.unwrap();
            tx.delete(profile.id).await.unwrap();
        }

        assert!(svc.service_profile_get(profile.id).await.is_ok());
        assert!(svc.locks.is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let (svc, _tmp) = create_test_service();
        let (org, ns) = seed(&svc).await;
        let original = insert_profile(&svc, org, ns, "sp").await;

        tokio::time::sleep(Duration::from_millis(5)).await;

        let mut tx = svc.begin().await.unwrap();
        let mut locked = tx.get(original.id, true).await.unwrap();
        locked.name = "renamed".to_string();
        locked.policy.dl_rate = 42;
        tx.update(&mut locked).await.unwrap();
        tx.commit().await.unwrap();

        let stored = svc.service_profile_get(original.id).await.unwrap();
        assert_eq!(stored.name, "renamed");
        assert_eq!(stored.policy.dl_rate, 42);
        assert_eq!(stored.created_at, original.created_at);
        assert!(stored.updated_at > original.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let (svc, _tmp) = create_test_service();
        let (org, ns) = seed(&svc).await;

        let mut ghost = ServiceProfile::new(org, ns, "ghost", PolicyDocument::default());
        ghost.id = Uuid::new_v4();

        let mut tx = svc.begin().await.unwrap();
        assert!(matches!(
            tx.get(ghost.id, true).await.unwrap_err(),
            StoreError::NotFound
        ));
        assert!(matches!(
            tx.update(&mut ghost).await.unwrap_err(),
            StoreError::NotFound
        ));
        assert!(matches!(
            tx.delete(ghost.id).await.unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (svc, _tmp) = create_test_service();
        let (org, ns) = seed(&svc).await;
        let profile = insert_profile(&svc, org, ns, "sp").await;

        let mut tx = svc.begin().await.unwrap();
        tx.delete(profile.id).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = svc.begin().await.unwrap();
        assert!(matches!(
            tx.delete(profile.id).await.unwrap_err(),
            StoreError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_for_update_blocks_second_locker() {
        let (svc, _tmp) = create_test_service();
        let svc = Arc::new(svc);
        let (org, ns) = seed(&svc).await;
        let profile = insert_profile(&svc, org, ns, "sp").await;

        let mut first = svc.begin().await.unwrap();
        first.get(profile.id, true).await.unwrap();

        let contender = {
            let svc = svc.clone();
            tokio::spawn(async move {
                let mut tx = svc.begin().await.unwrap();
                let row = tx.get(profile.id, true).await.unwrap();
                tx.commit().await.unwrap();
                row
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        // Plain reads are not blocked by the lock
        assert!(svc.service_profile_get(profile.id).await.is_ok());

        let mut locked = first.get(profile.id, true).await.unwrap();
        locked.name = "first".to_string();
        first.update(&mut locked).await.unwrap();
        first.commit().await.unwrap();

        let seen = tokio::time::timeout(Duration::from_secs(5), contender)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(seen.name, "first");
        assert!(svc.locks.is_empty());
    }

    #[tokio::test]
    async fn test_count_and_list_scoping() {
        let (svc, _tmp) = create_test_service();
        let (org_a, ns) = seed(&svc).await;
        let org_b = svc.organization_create("other").await.unwrap().id;

        insert_profile(&svc, org_a, ns, "charlie").await;
        insert_profile(&svc, org_a, ns, "alpha").await;
        insert_profile(&svc, org_b, ns, "bravo").await;

        assert_eq!(svc.service_profile_count(&ProfileScope::All).await.unwrap(), 3);
        assert_eq!(
            svc.service_profile_count(&ProfileScope::Organization(org_a))
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            svc.service_profile_count(&ProfileScope::Organizations(vec![]))
                .await
                .unwrap(),
            0
        );

        let names: Vec<String> = svc
            .service_profile_list(&ProfileScope::All, 10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["alpha", "bravo", "charlie"]);

        let page = svc
            .service_profile_list(&ProfileScope::Organization(org_a), 1, 1)
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "charlie");

        assert!(
            svc.service_profile_list(&ProfileScope::All, 0, 0)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            svc.service_profile_list(&ProfileScope::All, 10, 3)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_reopen_keeps_data() {
        let tmp_dir = TempDir::new().unwrap();
        let id = {
            let svc = EmbeddedPersistService::open(tmp_dir.path()).unwrap();
            let (org, ns) = seed(&svc).await;
            insert_profile(&svc, org, ns, "durable").await.id
        };

        let svc = EmbeddedPersistService::open(tmp_dir.path()).unwrap();
        assert_eq!(svc.service_profile_get(id).await.unwrap().name, "durable");
        assert_eq!(svc.organization_create("next").await.unwrap().id, 2);
        assert!(svc.health_check().await.is_ok());
    }
}

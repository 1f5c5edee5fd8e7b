#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use profilesync_api::{PolicyDocument, RatePolicy, ServiceProfile};
use profilesync_client::{ClientError, PolicyClient};
use profilesync_core::{ServiceProfileQuery, ServiceProfileService, SyncConfig};
use profilesync_persistence::{
    DirectoryPersistence, EmbeddedPersistService, NetworkServerInfo, OrganizationInfo,
    PersistenceService, ProfileScope, ServiceProfilePersistence, ServiceProfileTransaction,
    StorageMode, StoreError, StoreResult, UserInfo,
};
use tempfile::TempDir;
use uuid::Uuid;

// ============================================================================
// Network-server double
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Create,
    Get,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(Uuid, PolicyDocument),
    Get(Uuid),
    Update(Uuid, PolicyDocument),
    Delete(Uuid),
}

impl Call {
    fn method(&self) -> Method {
        match self {
            Call::Create(..) => Method::Create,
            Call::Get(_) => Method::Get,
            Call::Update(..) => Method::Update,
            Call::Delete(_) => Method::Delete,
        }
    }
}

/// In-memory network-server that records every call it receives.
#[derive(Default)]
pub struct RecordingPolicyClient {
    policies: Mutex<HashMap<Uuid, PolicyDocument>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Method, VecDeque<tonic::Status>>>,
    delays: Mutex<HashMap<Method, Duration>>,
    minted: Mutex<VecDeque<Uuid>>,
}

impl RecordingPolicyClient {
    /// Make the next call of `method` fail with `status`
    pub fn fail_next(&self, method: Method, status: tonic::Status) {
        self.failures
            .lock()
            .entry(method)
            .or_default()
            .push_back(status);
    }

    /// Answer the next create with `id` instead of a fresh one
    pub fn mint_next(&self, id: Uuid) {
        self.minted.lock().push_back(id);
    }

    /// Hold every call of `method` for `delay` before answering
    pub fn delay(&self, method: Method, delay: Duration) {
        self.delays.lock().insert(method, delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, method: Method) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method() == method)
            .count()
    }

    pub fn policy(&self, id: Uuid) -> Option<PolicyDocument> {
        self.policies.lock().get(&id).cloned()
    }

    /// Overwrite a policy behind the caller's back
    pub fn put(&self, id: Uuid, document: PolicyDocument) {
        self.policies.lock().insert(id, document);
    }

    /// Drop a policy behind the caller's back
    pub fn forget(&self, id: Uuid) {
        self.policies.lock().remove(&id);
    }

    async fn enter(&self, call: Call) -> Result<(), ClientError> {
        let method = call.method();
        self.calls.lock().push(call);

        let delay = self.delays.lock().get(&method).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .failures
            .lock()
            .get_mut(&method)
            .and_then(|queue| queue.pop_front());
        match failure {
            Some(status) => Err(ClientError::Grpc(status)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PolicyClient for RecordingPolicyClient {
    async fn create_policy(&self, document: &PolicyDocument) -> Result<Uuid, ClientError> {
        let id = self.minted.lock().pop_front().unwrap_or_else(Uuid::new_v4);
        self.enter(Call::Create(id, document.clone())).await?;
        self.policies.lock().insert(id, document.clone());
        Ok(id)
    }

    async fn get_policy(&self, id: Uuid) -> Result<PolicyDocument, ClientError> {
        self.enter(Call::Get(id)).await?;
        self.policy(id)
            .ok_or_else(|| ClientError::Grpc(tonic::Status::not_found("object does not exist")))
    }

    async fn update_policy(&self, id: Uuid, document: &PolicyDocument) -> Result<(), ClientError> {
        self.enter(Call::Update(id, document.clone())).await?;
        let mut policies = self.policies.lock();
        match policies.get_mut(&id) {
            Some(existing) => {
                *existing = document.clone();
                Ok(())
            }
            None => Err(ClientError::Grpc(tonic::Status::not_found(
                "object does not exist",
            ))),
        }
    }

    async fn delete_policy(&self, id: Uuid) -> Result<(), ClientError> {
        self.enter(Call::Delete(id)).await?;
        match self.policies.lock().remove(&id) {
            Some(_) => Ok(()),
            None => Err(ClientError::Grpc(tonic::Status::not_found(
                "object does not exist",
            ))),
        }
    }
}

// ============================================================================
// Local store with injectable write failures
// ============================================================================

pub struct FlakyStore {
    inner: EmbeddedPersistService,
    pub fail_insert: AtomicBool,
    pub fail_update: AtomicBool,
}

impl FlakyStore {
    fn new(inner: EmbeddedPersistService) -> Self {
        Self {
            inner,
            fail_insert: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
        }
    }
}

struct FlakyTransaction {
    inner: Box<dyn ServiceProfileTransaction>,
    fail_insert: bool,
    fail_update: bool,
}

#[async_trait]
impl ServiceProfileTransaction for FlakyTransaction {
    async fn get(&mut self, id: Uuid, for_update: bool) -> StoreResult<ServiceProfile> {
        self.inner.get(id, for_update).await
    }

    async fn insert(&mut self, profile: &mut ServiceProfile) -> StoreResult<()> {
        if self.fail_insert {
            return Err(StoreError::Database("injected insert failure".to_string()));
        }
        self.inner.insert(profile).await
    }

    async fn update(&mut self, profile: &mut ServiceProfile) -> StoreResult<()> {
        if self.fail_update {
            return Err(StoreError::Database("injected update failure".to_string()));
        }
        self.inner.update(profile).await
    }

    async fn delete(&mut self, id: Uuid) -> StoreResult<()> {
        self.inner.delete(id).await
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.inner.rollback().await
    }
}

#[async_trait]
impl PersistenceService for FlakyStore {
    fn storage_mode(&self) -> StorageMode {
        self.inner.storage_mode()
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.inner.health_check().await
    }
}

#[async_trait]
impl ServiceProfilePersistence for FlakyStore {
    async fn begin(&self) -> StoreResult<Box<dyn ServiceProfileTransaction>> {
        Ok(Box::new(FlakyTransaction {
            inner: self.inner.begin().await?,
            fail_insert: self.fail_insert.load(Ordering::SeqCst),
            fail_update: self.fail_update.load(Ordering::SeqCst),
        }))
    }

    async fn service_profile_get(&self, id: Uuid) -> StoreResult<ServiceProfile> {
        self.inner.service_profile_get(id).await
    }

    async fn service_profile_check_references(
        &self,
        organization_id: i64,
        network_server_id: i64,
    ) -> StoreResult<()> {
        self.inner
            .service_profile_check_references(organization_id, network_server_id)
            .await
    }

    async fn service_profile_count(&self, scope: &ProfileScope) -> StoreResult<u64> {
        self.inner.service_profile_count(scope).await
    }

    async fn service_profile_list(
        &self,
        scope: &ProfileScope,
        limit: u64,
        offset: u64,
    ) -> StoreResult<Vec<ServiceProfile>> {
        self.inner.service_profile_list(scope, limit, offset).await
    }
}

#[async_trait]
impl DirectoryPersistence for FlakyStore {
    async fn organization_create(&self, name: &str) -> StoreResult<OrganizationInfo> {
        self.inner.organization_create(name).await
    }

    async fn organization_find(&self, id: i64) -> StoreResult<Option<OrganizationInfo>> {
        self.inner.organization_find(id).await
    }

    async fn network_server_create(
        &self,
        name: &str,
        server: &str,
    ) -> StoreResult<NetworkServerInfo> {
        self.inner.network_server_create(name, server).await
    }

    async fn network_server_find(&self, id: i64) -> StoreResult<Option<NetworkServerInfo>> {
        self.inner.network_server_find(id).await
    }

    async fn user_create(&self, username: &str) -> StoreResult<UserInfo> {
        self.inner.user_create(username).await
    }

    async fn organization_user_create(
        &self,
        organization_id: i64,
        user_id: i64,
        is_admin: bool,
    ) -> StoreResult<()> {
        self.inner
            .organization_user_create(organization_id, user_id, is_admin)
            .await
    }

    async fn organizations_for_user(&self, username: &str) -> StoreResult<Vec<i64>> {
        self.inner.organizations_for_user(username).await
    }
}

// ============================================================================
// Fixture
// ============================================================================

pub struct Fixture {
    pub service: Arc<ServiceProfileService>,
    pub query: ServiceProfileQuery,
    pub store: Arc<FlakyStore>,
    pub policies: Arc<RecordingPolicyClient>,
    pub organization_id: i64,
    pub network_server_id: i64,
    _tmp: TempDir,
}

impl Fixture {
    pub fn profile(&self, name: &str, policy: PolicyDocument) -> ServiceProfile {
        ServiceProfile::new(self.organization_id, self.network_server_id, name, policy)
    }

    /// Create a profile through the service and return it with its minted id
    pub async fn create(&self, organization_id: i64, name: &str) -> ServiceProfile {
        let mut profile = ServiceProfile::new(
            organization_id,
            self.network_server_id,
            name,
            scenario_policy(),
        );
        self.service.create(&mut profile).await.unwrap();
        profile
    }
}

pub async fn fixture() -> Fixture {
    fixture_with_timeout(Duration::from_secs(5)).await
}

pub async fn fixture_with_timeout(remote_timeout: Duration) -> Fixture {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(FlakyStore::new(
        EmbeddedPersistService::open(tmp.path()).unwrap(),
    ));
    let policies = Arc::new(RecordingPolicyClient::default());

    let organization_id = store.organization_create("org1").await.unwrap().id;
    let network_server_id = store
        .network_server_create("ns1", "ns1.local:8000")
        .await
        .unwrap()
        .id;

    let persistence: Arc<dyn PersistenceService> = store.clone();
    let client: Arc<dyn PolicyClient> = policies.clone();
    let service = Arc::new(ServiceProfileService::with_config(
        persistence.clone(),
        client,
        SyncConfig { remote_timeout },
    ));

    Fixture {
        service,
        query: ServiceProfileQuery::new(persistence),
        store,
        policies,
        organization_id,
        network_server_id,
        _tmp: tmp,
    }
}

/// Uplink 100/10/MARK, downlink 200/20/DROP, data-rate 3..5, gateway diversity 3
pub fn scenario_policy() -> PolicyDocument {
    PolicyDocument {
        ul_rate: 100,
        ul_bucket_size: 10,
        ul_rate_policy: RatePolicy::Mark,
        dl_rate: 200,
        dl_bucket_size: 20,
        dl_rate_policy: RatePolicy::Drop,
        dr_min: 3,
        dr_max: 5,
        min_gw_diversity: 3,
        ..Default::default()
    }
}

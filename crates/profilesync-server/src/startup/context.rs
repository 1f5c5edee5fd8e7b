use std::sync::Arc;

use profilesync_client::{GrpcPolicyClient, PolicyClient};
use profilesync_core::{ServiceProfileQuery, ServiceProfileService, SyncConfig};
use profilesync_migration::{Migrator, MigratorTrait};
use profilesync_persistence::{
    EmbeddedPersistService, ExternalDbPersistService, PersistenceService, StorageMode,
};
use tracing::info;

use crate::model::Configuration;

/// Everything a command needs
pub struct AppContext {
    pub store: Arc<dyn PersistenceService>,
    pub service: ServiceProfileService,
    pub query: ServiceProfileQuery,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn PersistenceService>,
        policies: Arc<dyn PolicyClient>,
        sync_config: SyncConfig,
    ) -> Self {
        Self {
            service: ServiceProfileService::with_config(store.clone(), policies, sync_config),
            query: ServiceProfileQuery::new(store.clone()),
            store,
        }
    }

    pub async fn from_configuration(configuration: &Configuration) -> anyhow::Result<Self> {
        let store = open_store(configuration).await?;
        store.health_check().await?;

        let policies = GrpcPolicyClient::connect(&configuration.grpc_client_config()).await?;

        Ok(Self::new(
            store,
            Arc::new(policies),
            configuration.sync_config(),
        ))
    }
}

/// Open the local store selected by `persistence.mode`
pub async fn open_store(
    configuration: &Configuration,
) -> anyhow::Result<Arc<dyn PersistenceService>> {
    let storage_mode = configuration.persistence_mode()?;
    info!("Persistence mode: {}", storage_mode);

    let store: Arc<dyn PersistenceService> = match storage_mode {
        StorageMode::ExternalDb => {
            let db = configuration.database_connection().await?;
            Arc::new(ExternalDbPersistService::new(db))
        }
        StorageMode::StandaloneEmbedded => {
            let data_dir = configuration.embedded_data_dir();
            info!("Opening embedded storage at: {}", data_dir.display());
            Arc::new(EmbeddedPersistService::open(&data_dir)?)
        }
    };
    Ok(store)
}

pub async fn run_migrations(configuration: &Configuration) -> anyhow::Result<()> {
    match configuration.persistence_mode()? {
        StorageMode::ExternalDb => {
            let db = configuration.database_connection().await?;
            Migrator::up(&db, None).await?;
            info!("Database schema is up to date");
        }
        StorageMode::StandaloneEmbedded => {
            info!("Embedded storage has no schema to migrate");
        }
    }
    Ok(())
}

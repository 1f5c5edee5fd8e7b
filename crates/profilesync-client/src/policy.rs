//! Network-server policy client abstraction

use async_trait::async_trait;
use profilesync_api::PolicyDocument;
use uuid::Uuid;

use crate::error::Result;

/// Remote policy store holding the canonical service-profile policies.
///
/// The network-server mints the id of every policy it creates.
#[async_trait]
pub trait PolicyClient: Send + Sync {
    async fn create_policy(&self, document: &PolicyDocument) -> Result<Uuid>;

    async fn get_policy(&self, id: Uuid) -> Result<PolicyDocument>;

    async fn update_policy(&self, id: Uuid, document: &PolicyDocument) -> Result<()>;

    async fn delete_policy(&self, id: Uuid) -> Result<()>;
}

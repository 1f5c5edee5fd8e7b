//! gRPC implementation of [`PolicyClient`] on top of `NetworkServerService`

use std::time::Duration;

use async_trait::async_trait;
use profilesync_api::PolicyDocument;
use profilesync_api::grpc::{
    CreateServiceProfileRequest, DeleteServiceProfileRequest, GetServiceProfileRequest,
    UpdateServiceProfileRequest, network_server_service_client::NetworkServerServiceClient,
};
use profilesync_api::uuid_from_bytes;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ClientError, Result};
use crate::policy::PolicyClient;

/// Configuration for the network-server gRPC client.
#[derive(Clone, Debug)]
pub struct GrpcClientConfig {
    /// Network-server address, e.g. "127.0.0.1:8000" or "http://ns:8000"
    pub server_addr: String,
    pub connect_timeout: Duration,
    /// Deadline applied to every unary request
    pub request_timeout: Duration,
    /// Defer connecting until the first request
    pub lazy: bool,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8000".to_string(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
            lazy: false,
        }
    }
}

fn endpoint_uri(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

/// Policy client backed by a tonic `Channel`.
///
/// The channel multiplexes requests, so one instance is shared by every caller.
#[derive(Clone)]
pub struct GrpcPolicyClient {
    client: NetworkServerServiceClient<Channel>,
    request_timeout: Duration,
}

impl GrpcPolicyClient {
    pub async fn connect(config: &GrpcClientConfig) -> Result<Self> {
        let uri = endpoint_uri(&config.server_addr);
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| ClientError::InvalidAddress(format!("{}: {}", uri, e)))?
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);

        let channel = if config.lazy {
            endpoint.connect_lazy()
        } else {
            endpoint.connect().await?
        };

        info!("Network-server client ready at {}", uri);
        Ok(Self::new(channel, config.request_timeout))
    }

    pub fn new(channel: Channel, request_timeout: Duration) -> Self {
        Self {
            client: NetworkServerServiceClient::new(channel),
            request_timeout,
        }
    }
}

/// Id returned by a create call; the nil id is never a valid profile id
fn minted_id(bytes: &[u8]) -> Result<Uuid> {
    let id = uuid_from_bytes(bytes).map_err(ClientError::InvalidResponse)?;
    if id.is_nil() {
        return Err(ClientError::InvalidResponse(
            "network-server returned the nil service-profile id".to_string(),
        ));
    }
    Ok(id)
}

#[async_trait]
impl PolicyClient for GrpcPolicyClient {
    async fn create_policy(&self, document: &PolicyDocument) -> Result<Uuid> {
        let mut client = self.client.clone();
        let request = CreateServiceProfileRequest {
            service_profile: Some(document.to_proto(None)),
        };

        let response = tokio::time::timeout(
            self.request_timeout,
            client.create_service_profile(request),
        )
        .await
        .map_err(|_| ClientError::Timeout)??;

        let id = minted_id(&response.into_inner().id)?;
        debug!(id = %id, "network-server policy created");
        Ok(id)
    }

    async fn get_policy(&self, id: Uuid) -> Result<PolicyDocument> {
        let mut client = self.client.clone();
        let request = GetServiceProfileRequest {
            id: id.as_bytes().to_vec(),
        };

        let response = tokio::time::timeout(self.request_timeout, client.get_service_profile(request))
            .await
            .map_err(|_| ClientError::Timeout)??;

        let profile = response.into_inner().service_profile.ok_or_else(|| {
            ClientError::InvalidResponse("response carries no service_profile".to_string())
        })?;
        PolicyDocument::from_proto(&profile).map_err(ClientError::InvalidResponse)
    }

    async fn update_policy(&self, id: Uuid, document: &PolicyDocument) -> Result<()> {
        let mut client = self.client.clone();
        let request = UpdateServiceProfileRequest {
            service_profile: Some(document.to_proto(Some(id))),
        };

        tokio::time::timeout(self.request_timeout, client.update_service_profile(request))
            .await
            .map_err(|_| ClientError::Timeout)??;

        debug!(id = %id, "network-server policy updated");
        Ok(())
    }

    async fn delete_policy(&self, id: Uuid) -> Result<()> {
        let mut client = self.client.clone();
        let request = DeleteServiceProfileRequest {
            id: id.as_bytes().to_vec(),
        };

        tokio::time::timeout(self.request_timeout, client.delete_service_profile(request))
            .await
            .map_err(|_| ClientError::Timeout)??;

        debug!(id = %id, "network-server policy deleted");
        Ok(())
    }
}

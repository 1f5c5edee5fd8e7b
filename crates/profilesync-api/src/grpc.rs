// Messages and client for the network-server `ns.NetworkServerService` API.
// Only the service-profile subset of the service is declared here.

/// Rate-limit policy as carried on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum RatePolicy {
    /// Drop the packets over the limit
    Drop = 0,
    /// Mark the packets over the limit
    Mark = 1,
}

impl RatePolicy {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Drop => "DROP",
            Self::Mark => "MARK",
        }
    }

    pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
        match value {
            "DROP" => Some(Self::Drop),
            "MARK" => Some(Self::Mark),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceProfile {
    /// Service-profile ID (16 raw UUID bytes)
    #[prost(bytes = "vec", tag = "1")]
    pub id: ::prost::alloc::vec::Vec<u8>,
    #[prost(uint32, tag = "2")]
    pub ul_rate: u32,
    #[prost(uint32, tag = "3")]
    pub ul_bucket_size: u32,
    #[prost(enumeration = "RatePolicy", tag = "4")]
    pub ul_rate_policy: i32,
    #[prost(uint32, tag = "5")]
    pub dl_rate: u32,
    #[prost(uint32, tag = "6")]
    pub dl_bucket_size: u32,
    #[prost(enumeration = "RatePolicy", tag = "7")]
    pub dl_rate_policy: i32,
    #[prost(bool, tag = "8")]
    pub add_gw_metadata: bool,
    #[prost(uint32, tag = "9")]
    pub dev_status_req_freq: u32,
    #[prost(bool, tag = "10")]
    pub report_dev_status_battery: bool,
    #[prost(bool, tag = "11")]
    pub report_dev_status_margin: bool,
    #[prost(uint32, tag = "12")]
    pub dr_min: u32,
    #[prost(uint32, tag = "13")]
    pub dr_max: u32,
    #[prost(bool, tag = "15")]
    pub pr_allowed: bool,
    #[prost(bool, tag = "16")]
    pub hr_allowed: bool,
    #[prost(bool, tag = "17")]
    pub ra_allowed: bool,
    #[prost(bool, tag = "18")]
    pub nwk_geo_loc: bool,
    #[prost(uint32, tag = "19")]
    pub target_per: u32,
    #[prost(uint32, tag = "20")]
    pub min_gw_diversity: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateServiceProfileRequest {
    #[prost(message, optional, tag = "1")]
    pub service_profile: ::core::option::Option<ServiceProfile>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateServiceProfileResponse {
    /// ID of the created service-profile
    #[prost(bytes = "vec", tag = "1")]
    pub id: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetServiceProfileRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub id: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetServiceProfileResponse {
    #[prost(message, optional, tag = "1")]
    pub service_profile: ::core::option::Option<ServiceProfile>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateServiceProfileRequest {
    #[prost(message, optional, tag = "1")]
    pub service_profile: ::core::option::Option<ServiceProfile>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteServiceProfileRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub id: ::prost::alloc::vec::Vec<u8>,
}

/// Generated client implementations.
pub mod network_server_service_client {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value
    )]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct NetworkServerServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl NetworkServerServiceClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> NetworkServerServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::Body>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }

        async fn ready(&mut self) -> std::result::Result<(), tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unknown(format!("Service was not ready: {}", e.into()))
            })
        }

        /// Create the given service-profile.
        pub async fn create_service_profile(
            &mut self,
            request: impl tonic::IntoRequest<super::CreateServiceProfileRequest>,
        ) -> std::result::Result<tonic::Response<super::CreateServiceProfileResponse>, tonic::Status>
        {
            self.ready().await?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/ns.NetworkServerService/CreateServiceProfile",
            );
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "ns.NetworkServerService",
                "CreateServiceProfile",
            ));
            self.inner.unary(req, path, codec).await
        }

        /// Get the service-profile matching the given id.
        pub async fn get_service_profile(
            &mut self,
            request: impl tonic::IntoRequest<super::GetServiceProfileRequest>,
        ) -> std::result::Result<tonic::Response<super::GetServiceProfileResponse>, tonic::Status>
        {
            self.ready().await?;
            let codec = tonic_prost::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/ns.NetworkServerService/GetServiceProfile");
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "ns.NetworkServerService",
                "GetServiceProfile",
            ));
            self.inner.unary(req, path, codec).await
        }

        /// Update the given service-profile.
        pub async fn update_service_profile(
            &mut self,
            request: impl tonic::IntoRequest<super::UpdateServiceProfileRequest>,
        ) -> std::result::Result<tonic::Response<()>, tonic::Status> {
            self.ready().await?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/ns.NetworkServerService/UpdateServiceProfile",
            );
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "ns.NetworkServerService",
                "UpdateServiceProfile",
            ));
            self.inner.unary(req, path, codec).await
        }

        /// Delete the service-profile matching the given id.
        pub async fn delete_service_profile(
            &mut self,
            request: impl tonic::IntoRequest<super::DeleteServiceProfileRequest>,
        ) -> std::result::Result<tonic::Response<()>, tonic::Status> {
            self.ready().await?;
            let codec = tonic_prost::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/ns.NetworkServerService/DeleteServiceProfile",
            );
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "ns.NetworkServerService",
                "DeleteServiceProfile",
            ));
            self.inner.unary(req, path, codec).await
        }
    }
}

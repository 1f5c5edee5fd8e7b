//! Profilesync Client - network-server policy client
//!
//! This crate provides:
//! - The `PolicyClient` seam used by the synchronization layer
//! - A tonic-based implementation talking to `ns.NetworkServerService`
//! - Classification of gRPC failures into not-found, rejected, timeout and unavailable

pub mod error;
pub mod grpc;
pub mod policy;

pub use error::{ClientError, FailureKind};
pub use grpc::{GrpcClientConfig, GrpcPolicyClient};
pub use policy::PolicyClient;

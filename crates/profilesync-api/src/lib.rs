//! profilesync API - service-profile models and network-server gRPC definitions
//!
//! This crate provides:
//! - The `ServiceProfile` aggregate and its `PolicyDocument` payload
//! - gRPC messages and client for the network-server service-profile API
//! - Input validation utilities

pub mod grpc;
pub mod model;
pub mod validation;

// Re-export commonly used types
pub use model::*;
pub use validation::*;

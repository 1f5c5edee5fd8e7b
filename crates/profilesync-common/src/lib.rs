//! profilesync Common - Shared types and utilities
//!
//! This crate provides the foundational types used across all profilesync components:
//! - Error taxonomy and error codes
//! - Common constants

pub mod error;

// Re-exports for convenience
pub use error::{ErrorCode, Operation, ProfileSyncError};

pub type Result<T> = std::result::Result<T, ProfileSyncError>;

/// Default page size for service-profile listings
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Default timeout applied to every network-server call, in milliseconds
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 5000;

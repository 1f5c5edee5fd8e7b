//! Error types and error codes for profilesync
//!
//! This module defines:
//! - `ProfileSyncError`: the error taxonomy surfaced by service-profile operations
//! - `Operation`: the cross-store operation a `PartialCommit` happened in
//! - `ErrorCode`: Structured error codes for API responses

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cross-store operation that mutates both the local row and the remote policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors returned by the service-profile synchronization layer
#[derive(thiserror::Error, Debug)]
pub enum ProfileSyncError {
    #[error("service profile does not exist")]
    NotFound,

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("network-server rejected the service profile: {0}")]
    RemoteRejected(String),

    #[error("network-server unavailable: {0}")]
    RemoteUnavailable(String),

    /// One store was mutated and the other was not. The two copies of the
    /// profile identified by `id` have diverged.
    #[error("partial commit during {operation} of service profile {id}: {cause}")]
    PartialCommit {
        id: Uuid,
        operation: Operation,
        cause: String,
    },

    #[error("storage error: {0}")]
    Storage(String),
}

impl ProfileSyncError {
    pub fn partial_commit(id: Uuid, operation: Operation, cause: impl Display) -> Self {
        ProfileSyncError::PartialCommit {
            id,
            operation,
            cause: cause.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProfileSyncError::NotFound)
    }

    pub fn is_partial_commit(&self) -> bool {
        matches!(self, ProfileSyncError::PartialCommit { .. })
    }

    /// Whether the whole operation may be retried from the start.
    ///
    /// Only remote unavailability qualifies: it is raised before any local
    /// mutation. A `PartialCommit` is never retryable as a whole.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProfileSyncError::RemoteUnavailable(_))
    }

    pub fn error_code(&self) -> ErrorCode<'static> {
        match self {
            ProfileSyncError::NotFound => RESOURCE_NOT_FOUND,
            ProfileSyncError::ConstraintViolation(_) => CONSTRAINT_VIOLATION,
            ProfileSyncError::InvalidArgument(_) => PARAMETER_VALIDATE_ERROR,
            ProfileSyncError::RemoteRejected(_) => REMOTE_REJECTED,
            ProfileSyncError::RemoteUnavailable(_) => REMOTE_UNAVAILABLE,
            ProfileSyncError::PartialCommit { .. } => PARTIAL_COMMIT,
            ProfileSyncError::Storage(_) => DATA_ACCESS_ERROR,
        }
    }
}

/// Error code structure for API responses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode<'a> {
    pub code: i32,
    pub message: &'a str,
}

// General success and error codes
pub const SUCCESS: ErrorCode<'static> = ErrorCode {
    code: 0,
    message: "success",
};

pub const DATA_ACCESS_ERROR: ErrorCode<'static> = ErrorCode {
    code: 10002,
    message: "data access error",
};

pub const PARAMETER_VALIDATE_ERROR: ErrorCode<'static> = ErrorCode {
    code: 20002,
    message: "parameter validate error",
};

pub const RESOURCE_NOT_FOUND: ErrorCode<'static> = ErrorCode {
    code: 20004,
    message: "resource not found",
};

pub const CONSTRAINT_VIOLATION: ErrorCode<'static> = ErrorCode {
    code: 20005,
    message: "resource conflict",
};

// Network-server errors
pub const REMOTE_REJECTED: ErrorCode<'static> = ErrorCode {
    code: 24000,
    message: "network-server rejected request",
};

pub const REMOTE_UNAVAILABLE: ErrorCode<'static> = ErrorCode {
    code: 24001,
    message: "network-server unavailable",
};

pub const PARTIAL_COMMIT: ErrorCode<'static> = ErrorCode {
    code: 24002,
    message: "local and network-server state diverged",
};

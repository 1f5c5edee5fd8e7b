//! Client error types for the network-server client

use tonic::Code;

/// Error type for network-server gRPC client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("gRPC error: {0}")]
    Grpc(#[from] tonic::Status),

    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("invalid network-server address: {0}")]
    InvalidAddress(String),

    #[error("request timeout")]
    Timeout,

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// How the caller should treat a failed network-server call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The policy does not exist on the network-server
    NotFound,
    /// The network-server refused the request; retrying will not help
    Rejected,
    /// The call did not complete within its deadline
    Timeout,
    /// The network-server could not be reached
    Unavailable,
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Grpc(status) => match status.code() {
                Code::NotFound => FailureKind::NotFound,
                Code::InvalidArgument | Code::FailedPrecondition | Code::OutOfRange => {
                    FailureKind::Rejected
                }
                Code::DeadlineExceeded => FailureKind::Timeout,
                _ => FailureKind::Unavailable,
            },
            ClientError::InvalidResponse(_) => FailureKind::Rejected,
            ClientError::Timeout => FailureKind::Timeout,
            ClientError::Transport(_) | ClientError::InvalidAddress(_) => FailureKind::Unavailable,
        }
    }
}

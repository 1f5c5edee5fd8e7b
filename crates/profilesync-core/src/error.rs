// Mapping of store and network-server failures onto `ProfileSyncError`

use profilesync_client::{ClientError, FailureKind};
use profilesync_common::ProfileSyncError;
use profilesync_persistence::StoreError;

pub(crate) fn store_error(err: StoreError) -> ProfileSyncError {
    match err {
        StoreError::NotFound => ProfileSyncError::NotFound,
        StoreError::ConstraintViolation(detail) => ProfileSyncError::ConstraintViolation(detail),
        StoreError::Database(detail) => ProfileSyncError::Storage(detail),
        StoreError::Serialization(e) => ProfileSyncError::Storage(e.to_string()),
    }
}

/// Detail string of a remote failure; gRPC statuses contribute their message only
pub(crate) fn remote_detail(err: &ClientError) -> String {
    match err {
        ClientError::Grpc(status) => status.message().to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn remote_error(err: ClientError) -> ProfileSyncError {
    match err.kind() {
        FailureKind::NotFound => ProfileSyncError::NotFound,
        FailureKind::Rejected => ProfileSyncError::RemoteRejected(remote_detail(&err)),
        FailureKind::Timeout => ProfileSyncError::RemoteUnavailable("request timeout".to_string()),
        FailureKind::Unavailable => ProfileSyncError::RemoteUnavailable(remote_detail(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        assert!(store_error(StoreError::NotFound).is_not_found());
        assert!(matches!(
            store_error(StoreError::ConstraintViolation("fk".to_string())),
            ProfileSyncError::ConstraintViolation(d) if d == "fk"
        ));
        assert!(matches!(
            store_error(StoreError::Database("down".to_string())),
            ProfileSyncError::Storage(_)
        ));
    }

    #[test]
    fn test_remote_error_mapping() {
        assert!(remote_error(tonic_status_not_found()).is_not_found());

        let err = remote_error(ClientError::Grpc(tonic::Status::invalid_argument(
            "dr_min > dr_max",
        )));
        assert!(matches!(err, ProfileSyncError::RemoteRejected(d) if d == "dr_min > dr_max"));

        let err = remote_error(ClientError::Timeout);
        assert!(err.is_retryable());

        let err = remote_error(ClientError::Grpc(tonic::Status::unavailable("down")));
        assert!(matches!(err, ProfileSyncError::RemoteUnavailable(d) if d == "down"));
    }

    fn tonic_status_not_found() -> ClientError {
        ClientError::Grpc(tonic::Status::not_found("object does not exist"))
    }
}

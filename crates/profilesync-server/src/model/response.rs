//! Response envelope written by every command

use profilesync_common::{ErrorCode, ProfileSyncError, error::SUCCESS};
use serde::{Deserialize, Serialize};

/// Generic result wrapper for command output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Result<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> Result<T> {
    pub fn new(code: i32, message: String, data: T) -> Self {
        Result::<T> {
            code,
            message,
            data,
        }
    }

    pub fn success(data: T) -> Result<T> {
        Result::<T> {
            code: SUCCESS.code,
            message: SUCCESS.message.to_string(),
            data,
        }
    }
}

impl Result<String> {
    /// Error code and message of the failure; `data` carries the detail
    pub fn from_code(code: ErrorCode<'_>, detail: impl ToString) -> Self {
        Result::new(code.code, code.message.to_string(), detail.to_string())
    }

    pub fn from_error(err: &ProfileSyncError) -> Self {
        Self::from_code(err.error_code(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(Result::success(3u64)).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["message"], "success");
        assert_eq!(json["data"], 3);
    }

    #[test]
    fn test_error_envelope_carries_code_and_detail() {
        let err = ProfileSyncError::RemoteUnavailable("connection refused".to_string());
        let result = Result::from_error(&err);
        assert_eq!(result.code, err.error_code().code);
        assert_eq!(result.message, err.error_code().message);
        assert!(result.data.contains("connection refused"));
    }
}

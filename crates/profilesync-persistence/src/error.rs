//! Persistence error types

use sea_orm::{DbErr, SqlErr};

/// Error type for local record store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record does not exist")]
    NotFound,

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(detail))
            | Some(SqlErr::UniqueConstraintViolation(detail)) => {
                StoreError::ConstraintViolation(detail)
            }
            _ => match err {
                DbErr::RecordNotFound(_) => StoreError::NotFound,
                other => StoreError::Database(other.to_string()),
            },
        }
    }
}

impl From<rocksdb::Error> for StoreError {
    fn from(err: rocksdb::Error) -> Self {
        StoreError::Database(format!("RocksDB error: {}", err))
    }
}

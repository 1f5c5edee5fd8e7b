//! Domain model types for the persistence abstraction layer
//!
//! These types are used as arguments and return values of the persistence
//! traits, decoupled from specific storage backends. Service-profile rows are
//! exchanged as `profilesync_api::ServiceProfile`.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Organization row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationInfo {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Network-server row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkServerInfo {
    pub id: i64,
    pub name: String,
    pub server: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row visibility for counting and listing service profiles
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileScope {
    /// Every row (administrator listings)
    All,
    /// Rows owned by one organization
    Organization(i64),
    /// Rows owned by any of the given organizations; empty matches nothing
    Organizations(Vec<i64>),
}

impl ProfileScope {
    /// Whether the scope can only ever match zero rows.
    pub fn is_empty(&self) -> bool {
        matches!(self, ProfileScope::Organizations(ids) if ids.is_empty())
    }

    /// Whether a row owned by `organization_id` is visible in this scope.
    pub fn contains(&self, organization_id: i64) -> bool {
        match self {
            ProfileScope::All => true,
            ProfileScope::Organization(id) => *id == organization_id,
            ProfileScope::Organizations(ids) => ids.contains(&organization_id),
        }
    }
}

/// Storage mode for the persistence layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageMode {
    /// External database (MySQL/PostgreSQL via SeaORM)
    ExternalDb,
    /// Standalone embedded RocksDB (single node, no external DB)
    StandaloneEmbedded,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::ExternalDb => write!(f, "external_db"),
            StorageMode::StandaloneEmbedded => write!(f, "standalone_embedded"),
        }
    }
}

impl std::str::FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "external_db" | "mysql" | "postgresql" => Ok(StorageMode::ExternalDb),
            "standalone_embedded" | "embedded" => Ok(StorageMode::StandaloneEmbedded),
            _ => Err(format!("Invalid storage mode: {}", s)),
        }
    }
}

/// Current time at the millisecond precision every backend stores.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

//! Network-server entity
//!
//! A network-server instance enforcing service-profile policies.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "network_server")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// gRPC address of the network-server (host:port)
    pub server: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_profile::Entity")]
    ServiceProfile,
}

impl Related<super::service_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceProfile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

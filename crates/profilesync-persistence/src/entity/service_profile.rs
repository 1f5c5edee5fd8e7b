//! Service-profile entity
//!
//! The primary key is the UUID minted by the network-server. `policy` caches the
//! policy document last accepted by the network-server; it is never the source
//! of truth.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "service_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: i64,
    pub network_server_id: i64,
    pub name: String,
    /// Cached policy document (JSON)
    #[sea_orm(column_type = "Json")]
    pub policy: Json,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::OrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,
    #[sea_orm(
        belongs_to = "super::network_server::Entity",
        from = "Column::NetworkServerId",
        to = "super::network_server::Column::Id"
    )]
    NetworkServer,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::network_server::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NetworkServer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

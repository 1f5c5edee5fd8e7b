//! Organization entity
//!
//! Owning tenant of service profiles.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "organization")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_profile::Entity")]
    ServiceProfile,
    #[sea_orm(has_many = "super::organization_user::Entity")]
    OrganizationUser,
}

impl Related<super::service_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceProfile.def()
    }
}

impl Related<super::organization_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

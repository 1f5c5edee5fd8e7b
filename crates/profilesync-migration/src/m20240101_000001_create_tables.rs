use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Millisecond timestamp column type for the connected backend
fn timestamp_millis(backend: DbBackend) -> Alias {
    match backend {
        DbBackend::MySql => Alias::new("datetime(3)"),
        _ => Alias::new("timestamp(3)"),
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let ts = timestamp_millis(manager.get_database_backend());

        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organization::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organization::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Organization::CreatedAt).custom(ts.clone()).not_null())
                    .col(ColumnDef::new(Organization::UpdatedAt).custom(ts.clone()).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NetworkServer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NetworkServer::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NetworkServer::Name).string_len(100).not_null())
                    .col(ColumnDef::new(NetworkServer::Server).string_len(255).not_null())
                    .col(ColumnDef::new(NetworkServer::CreatedAt).custom(ts.clone()).not_null())
                    .col(ColumnDef::new(NetworkServer::UpdatedAt).custom(ts.clone()).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).custom(ts.clone()).not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).custom(ts.clone()).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrganizationUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrganizationUser::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrganizationUser::OrganizationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrganizationUser::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(OrganizationUser::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(OrganizationUser::CreatedAt).custom(ts.clone()).not_null())
                    .col(ColumnDef::new(OrganizationUser::UpdatedAt).custom(ts.clone()).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_user_organization")
                            .from(OrganizationUser::Table, OrganizationUser::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_user_user")
                            .from(OrganizationUser::Table, OrganizationUser::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_organization_user")
                    .table(OrganizationUser::Table)
                    .col(OrganizationUser::UserId)
                    .col(OrganizationUser::OrganizationId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServiceProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceProfile::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServiceProfile::OrganizationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceProfile::NetworkServerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceProfile::Name).string_len(100).not_null())
                    .col(ColumnDef::new(ServiceProfile::Policy).json().not_null())
                    .col(ColumnDef::new(ServiceProfile::CreatedAt).custom(ts.clone()).not_null())
                    .col(ColumnDef::new(ServiceProfile::UpdatedAt).custom(ts).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_profile_organization")
                            .from(ServiceProfile::Table, ServiceProfile::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_profile_network_server")
                            .from(ServiceProfile::Table, ServiceProfile::NetworkServerId)
                            .to(NetworkServer::Table, NetworkServer::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_profile_organization_name")
                    .table(ServiceProfile::Table)
                    .col(ServiceProfile::OrganizationId)
                    .col(ServiceProfile::Name)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceProfile::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrganizationUser::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NetworkServer::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organization::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Organization {
    Table,
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum NetworkServer {
    Table,
    Id,
    Name,
    Server,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrganizationUser {
    Table,
    Id,
    OrganizationId,
    UserId,
    IsAdmin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ServiceProfile {
    Table,
    Id,
    OrganizationId,
    NetworkServerId,
    Name,
    Policy,
    CreatedAt,
    UpdatedAt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_millis_per_backend() {
        assert_eq!(timestamp_millis(DbBackend::MySql).to_string(), "datetime(3)");
        assert_eq!(timestamp_millis(DbBackend::Postgres).to_string(), "timestamp(3)");
    }

    #[test]
    fn test_service_profile_table_sql() {
        let sql = Table::create()
            .table(ServiceProfile::Table)
            .col(ColumnDef::new(ServiceProfile::Id).uuid().not_null().primary_key())
            .to_owned()
            .to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#"CREATE TABLE "service_profile""#));
        assert!(sql.contains(r#""id" uuid NOT NULL PRIMARY KEY"#));
    }
}

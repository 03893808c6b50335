use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Tenant { Table, Id, Email, Name, Avatar, Role, Departments, Employees, Tasks, CreatedAt, UpdatedAt }

#[derive(DeriveMigrationName)]
pub struct Migration;
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Extensions (safe if already present)
        manager.get_connection().execute_unprepared(r#"CREATE EXTENSION IF NOT EXISTS "pgcrypto";"#).await?;

        manager.create_table(
            Table::create()
                .table(Tenant::Table)
                .if_not_exists()
                .col(ColumnDef::new(Tenant::Id).uuid().not_null().primary_key().default(Expr::cust("gen_random_uuid()")))
                .col(ColumnDef::new(Tenant::Email).string_len(320).not_null())
                .col(ColumnDef::new(Tenant::Name).string_len(256).not_null())
                .col(ColumnDef::new(Tenant::Avatar).text())
                .col(ColumnDef::new(Tenant::Role).string_len(50).not_null().default("admin"))
                .col(ColumnDef::new(Tenant::Departments).json_binary().not_null().default(Expr::cust("'[]'::jsonb")))
                .col(ColumnDef::new(Tenant::Employees).json_binary().not_null().default(Expr::cust("'[]'::jsonb")))
                .col(ColumnDef::new(Tenant::Tasks).json_binary().not_null().default(Expr::cust("'[]'::jsonb")))
                .col(ColumnDef::new(Tenant::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::cust("now()")))
                .col(ColumnDef::new(Tenant::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::cust("now()")))
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create().name("idx_tenant_email").table(Tenant::Table).col(Tenant::Email).unique().to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Tenant::Table).to_owned()).await?;
        Ok(())
    }
}

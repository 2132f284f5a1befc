use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_health_records_time")
                    .table(HealthRecords::Table)
                    .col(HealthRecords::Time)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_health_records_time")
                    .table(HealthRecords::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum HealthRecords {
    Table,
    Time,
}

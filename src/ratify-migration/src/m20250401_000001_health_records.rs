use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HealthRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HealthRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HealthRecords::Time).date_time().not_null())
                    // Sqlite and sea orm doesn't have `u8`
                    .col(
                        ColumnDef::new(HealthRecords::HeartRate)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HealthRecords::RespiratoryRate)
                            .small_integer()
                            .not_null(),
                    )
                    .col(rating(HealthRecords::Nausea))
                    .col(rating(HealthRecords::Headache))
                    .col(rating(HealthRecords::Diarrhea))
                    .col(rating(HealthRecords::SoreThroat))
                    .col(rating(HealthRecords::Fever))
                    .col(rating(HealthRecords::MuscleAche))
                    .col(rating(HealthRecords::LossOfSmellOrTaste))
                    .col(rating(HealthRecords::Cough))
                    .col(rating(HealthRecords::ShortnessOfBreath))
                    .col(rating(HealthRecords::FeelingTired))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HealthRecords::Table).to_owned())
            .await
    }
}

fn rating(column: HealthRecords) -> ColumnDef {
    ColumnDef::new(column)
        .float()
        .not_null()
        .default(0.0_f32)
        .to_owned()
}

#[derive(Iden)]
enum HealthRecords {
    Table,
    Id,
    Time,
    HeartRate,
    RespiratoryRate,
    Nausea,
    Headache,
    Diarrhea,
    SoreThroat,
    Fever,
    MuscleAche,
    LossOfSmellOrTaste,
    Cough,
    ShortnessOfBreath,
    FeelingTired,
}

pub use sea_orm_migration::prelude::*;

mod m20250401_000001_health_records;
mod m20250415_000002_health_records_time_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250401_000001_health_records::Migration),
            Box::new(m20250415_000002_health_records_time_index::Migration),
        ]
    }
}

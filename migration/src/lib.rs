pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_indicators_and_volatility;
mod m20250601_000002_create_users_and_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_indicators_and_volatility::Migration),
            Box::new(m20250601_000002_create_users_and_settings::Migration),
        ]
    }
}

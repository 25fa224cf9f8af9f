pub use sea_orm_migration::prelude::*;

mod m20260101_000001_create_guild_config_table;
mod m20260101_000002_create_user_data_table;
mod m20260101_000003_create_custom_command_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_guild_config_table::Migration),
            Box::new(m20260101_000002_create_user_data_table::Migration),
            Box::new(m20260101_000003_create_custom_command_table::Migration),
        ]
    }
}

pub use sea_orm_migration::prelude::*;

mod m20240118_101500_ledgers;
mod m20240406_090000_category;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240118_101500_ledgers::Migration),
            Box::new(m20240406_090000_category::Migration),
        ]
    }
}

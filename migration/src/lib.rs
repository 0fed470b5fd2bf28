pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20261001_000001_accounts;
mod m20261001_000002_banners;
mod m20261001_000003_links;
mod m20261001_000004_legacy_banners;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_accounts::Migration),
            Box::new(m20261001_000002_banners::Migration),
            Box::new(m20261001_000003_links::Migration),
            Box::new(m20261001_000004_legacy_banners::Migration),
        ]
    }
}

pub use sea_orm_migration::prelude::*;

mod m20240110_000000_create_reference;
mod m20240110_000001_create_hr;
mod m20240110_000002_create_access;
mod m20240110_000003_create_customers;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240110_000000_create_reference::Migration),
            Box::new(m20240110_000001_create_hr::Migration),
            Box::new(m20240110_000002_create_access::Migration),
            Box::new(m20240110_000003_create_customers::Migration),
        ]
    }
}

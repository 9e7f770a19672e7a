use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202601120001_create_users::Migration),
            Box::new(migrations::m202601120002_create_venues::Migration),
            Box::new(migrations::m202601120003_create_children::Migration),
            Box::new(migrations::m202601190001_create_attendance_events::Migration),
        ]
    }
}

use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;

/// Creates a fully migrated throwaway database.
///
/// File-backed rather than `sqlite::memory:` so that every connection in
/// the pool sees the same schema. The returned `TempDir` guard must be
/// kept alive for the lifetime of the connection.
pub async fn setup_test_db() -> (DatabaseConnection, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir for test db");
    let path = dir.path().join("test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to test db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    (db, dir)
}

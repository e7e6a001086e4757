use slatrack::Database;

pub async fn setup_test_db() -> Database {
    // Install drivers for AnyPool (required for tests)
    sqlx::any::install_default_drivers();

    // Use file-based SQLite for tests (unique UUID per test for parallel execution)
    let temp_file = format!("test_{}.db", uuid::Uuid::new_v4());
    let db_url = format!("sqlite://{}?mode=rwc", temp_file);

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.bootstrap_schema()
        .await
        .expect("Failed to create test schema");

    db
}

use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

/// Creates a throwaway database for one test run and migrates it. Tests
/// that go through `#[sqlx::test]` get this for free; this helper exists
/// for ad-hoc harnesses that need their own pool.
pub async fn create_test_db() -> PgPool {
    let db_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/recipes_test".to_string());

    let test_db_name = format!("test_{}_{}", std::process::id(), Uuid::new_v4().simple());
    let base_url = db_url.rsplit_once('/').unwrap().0;
    let test_db_url = format!("{base_url}/{test_db_name}");

    let maintenance_pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await
        .expect("Failed to connect to postgres");

    sqlx::query(&format!("CREATE DATABASE \"{test_db_name}\""))
        .execute(&maintenance_pool)
        .await
        .expect("Failed to create test database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_db_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

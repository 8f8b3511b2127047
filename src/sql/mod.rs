//! PostgreSQL database operations for agro.
//!
//! This module provides functions for interacting with the PostgreSQL database,
//! organized by table. Every function runs inside a caller-supplied transaction.

/// Farmer operations with automatic timestamp tracking.
pub mod farmer;

/// Migrations embedded at compile time from the `migrations/` directory.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[cfg(test)]
/// Test utilities for PostgreSQL database operations.
pub mod tests {
    use sqlx::PgPool;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Creates a unique test database for each test invocation.
    ///
    /// The database name combines the process ID, the current timestamp and an
    /// atomic counter, so tests never share state. Returns `None` when
    /// `TEST_DATABASE_URL` is unset; callers skip themselves in that case.
    ///
    /// The database is created by:
    /// 1. Connecting to the base database URL
    /// 2. Creating a new database with a unique name
    /// 3. Running migrations on the new database
    /// 4. Returning a connection pool to the new database
    pub async fn setup_test_db() -> Option<PgPool> {
        let base_url = std::env::var("TEST_DATABASE_URL").ok()?;

        let pid = std::process::id();
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("agro_test_{}_{}_{}", pid, timestamp, counter);

        let mut parsed_url = url::Url::parse(&base_url).expect("Invalid database URL");

        let admin_pool = PgPool::connect(&base_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::query(&format!("CREATE DATABASE {}", db_name))
            .execute(&admin_pool)
            .await
            .expect("Failed to create test database");

        admin_pool.close().await;

        parsed_url.set_path(&format!("/{}", db_name));

        let pool = PgPool::connect(parsed_url.as_str())
            .await
            .expect("Failed to connect to test database");

        super::MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(pool)
    }
}

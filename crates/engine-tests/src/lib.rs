#![allow(dead_code)]

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

pub mod integration;
pub mod utils;

const TEST_SQLITE_URL: &str = "sqlite::memory:";

/// Every connection to `sqlite::memory:` opens its own database, so the
/// pool is pinned to a single connection that is never recycled.
async fn sqlite_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(TEST_SQLITE_URL)
        .await
        .expect("connect sqlite")
}

/// A fresh database holding the fixture schema and rows.
async fn seeded_pool() -> SqlitePool {
    let pool = sqlite_pool().await;
    sqlx::raw_sql(utils::FIXTURE_DDL)
        .execute(&pool)
        .await
        .expect("create fixture schema");
    sqlx::raw_sql(utils::FIXTURE_ROWS)
        .execute(&pool)
        .await
        .expect("load fixture rows");
    pool
}

//! Upload metadata storage (SQLite)

pub mod uploads;

pub use uploads::{NewUpload, UploadRecord, UploadStore};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Open the pool and create the schema.
///
/// With no URL the database lives in memory on a single connection that is
/// never recycled, so rows survive for the life of the process only.
pub async fn init_database_pool(database_url: Option<&str>) -> Result<SqlitePool, sqlx::Error> {
    let pool = match database_url {
        Some(url) if url != IN_MEMORY_URL => {
            info!(url, "opening upload database");
            let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        }
        _ => {
            warn!("DATABASE_URL not set - uploads are kept in memory and lost on restart");
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect(IN_MEMORY_URL)
                .await?
        }
    };

    create_schema(&pool).await?;
    Ok(pool)
}

pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS uploads (
            id TEXT PRIMARY KEY,
            file_name TEXT NOT NULL,
            file_size INTEGER NOT NULL,
            file_type TEXT NOT NULL,
            upload_date TEXT NOT NULL,
            source_ip TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

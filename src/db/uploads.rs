//! Upload metadata rows
//!
//! Rows are inserted once and listed newest first; nothing updates or
//! deletes them.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Metadata supplied by the client for a new upload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUpload {
    pub file_name: String,
    pub file_size: i64,
    #[serde(default)]
    pub file_type: String,
}

/// Stored upload metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadRecord {
    pub id: Uuid,
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    pub upload_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
}

/// Handle to the uploads table, cloned into each request
#[derive(Clone)]
pub struct UploadStore {
    pool: SqlitePool,
}

impl UploadStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a row with a fresh identifier and the current time.
    pub async fn insert(
        &self,
        upload: NewUpload,
        source_ip: Option<String>,
    ) -> Result<UploadRecord, sqlx::Error> {
        let record = UploadRecord {
            id: Uuid::new_v4(),
            file_name: upload.file_name,
            file_size: upload.file_size,
            file_type: upload.file_type,
            upload_date: Utc::now().trunc_subsecs(6),
            source_ip,
        };

        sqlx::query(
            r#"
            INSERT INTO uploads (id, file_name, file_size, file_type, upload_date, source_ip)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.file_name)
        .bind(record.file_size)
        .bind(&record.file_type)
        .bind(format_timestamp(&record.upload_date))
        .bind(&record.source_ip)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    /// All rows, newest first.
    pub async fn list(&self) -> Result<Vec<UploadRecord>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, file_name, file_size, file_type, upload_date, source_ip
            FROM uploads
            ORDER BY upload_date DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let id: String = row.get("id");
                let upload_date: String = row.get("upload_date");
                Ok(UploadRecord {
                    id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
                    file_name: row.get("file_name"),
                    file_size: row.get("file_size"),
                    file_type: row.get("file_type"),
                    upload_date: DateTime::parse_from_rfc3339(&upload_date)
                        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
                        .with_timezone(&Utc),
                    source_ip: row.get("source_ip"),
                })
            })
            .collect()
    }
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database_pool;

    async fn store() -> UploadStore {
        UploadStore::new(init_database_pool(None).await.unwrap())
    }

    fn upload(name: &str, size: i64) -> NewUpload {
        NewUpload {
            file_name: name.to_string(),
            file_size: size,
            file_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let store = store().await;
        let created = store
            .insert(upload("cat.png", 2048), Some("10.0.0.7".to_string()))
            .await
            .unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
        assert_eq!(listed[0].file_name, "cat.png");
        assert_eq!(listed[0].file_size, 2048);
        assert_eq!(listed[0].source_ip.as_deref(), Some("10.0.0.7"));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = store().await;
        store.insert(upload("first.txt", 1), None).await.unwrap();
        store.insert(upload("second.txt", 2), None).await.unwrap();
        store.insert(upload("third.txt", 3), None).await.unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.file_name)
            .collect();
        assert_eq!(names, vec!["third.txt", "second.txt", "first.txt"]);
    }

    #[tokio::test]
    async fn test_identifiers_are_unique() {
        let store = store().await;
        let a = store.insert(upload("same.txt", 1), None).await.unwrap();
        let b = store.insert(upload("same.txt", 1), None).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let ts = DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(&ts), "2024-01-02T03:04:05.000000Z");
    }
}

//! SQLite feedback store
//!
//! Persistent storage for feedback records using rusqlite behind a
//! deadpool-sqlite connection pool. Each store call checks out one
//! connection and runs a single transaction on it; dropping an
//! uncommitted transaction rolls it back.

use crate::error::{FeedbackError, Result};
use crate::storage::{schema, FeedbackStore};
use crate::types::{
    format_timestamp, parse_timestamp, CountFilter, FeedbackId, FeedbackRecord, Judgment,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use deadpool_sqlite::{Config, Pool, PoolConfig, Runtime};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default connection pool size
pub const DEFAULT_POOL_SIZE: usize = 8;

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const COUNT_SQL: &str = "SELECT COUNT(*) FROM Feedback \
     WHERE (?1 IS NULL OR predicted_class = ?1) AND (?2 IS NULL OR status = ?2)";

/// SQLite feedback store with connection pooling
pub struct SqliteFeedbackStore {
    pool: Pool,
    path: PathBuf,
}

impl SqliteFeedbackStore {
    /// Open (or create) the database file with the default pool size
    ///
    /// # Example
    /// ```ignore
    /// let store = SqliteFeedbackStore::open("feedback.db")?;
    /// store.init_schema().await?;
    /// ```
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        Self::with_pool_size(db_path, DEFAULT_POOL_SIZE)
    }

    /// Open the database file with a custom pool size
    pub fn with_pool_size<P: AsRef<Path>>(db_path: P, pool_size: usize) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        info!(
            "Creating feedback store pool at: {} (pool_size: {})",
            path.display(),
            pool_size
        );

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut config = Config::new(path.clone());
        config.pool = Some(PoolConfig::new(pool_size));
        let pool = config.create_pool(Runtime::Tokio1).map_err(|e| {
            FeedbackError::StorageUnavailable(format!("Failed to create connection pool: {}", e))
        })?;

        Ok(Self { pool, path })
    }

    /// Database file backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the `Feedback` table if it does not exist
    pub async fn init_schema(&self) -> Result<()> {
        self.with_conn(|conn| schema::apply_schema(conn)).await
    }

    /// Run `f` on a pooled connection
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.pool.get().await.map_err(|e| {
            FeedbackError::StorageUnavailable(format!(
                "Failed to get connection from pool: {}",
                e
            ))
        })?;

        conn.interact(move |conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            f(conn)
        })
        .await
        .map_err(|e| FeedbackError::StorageUnavailable(format!("Pool interaction failed: {}", e)))?
    }
}

fn count_in(conn: &Connection, filter: &CountFilter) -> Result<u64> {
    let count: i64 = conn.query_row(
        COUNT_SQL,
        params![
            filter.predicted_class.as_deref(),
            filter.status.map(|s| s.as_str())
        ],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

#[async_trait]
impl FeedbackStore for SqliteFeedbackStore {
    async fn insert(
        &self,
        timestamp: NaiveDateTime,
        predicted_class: Option<&str>,
        status: Judgment,
    ) -> Result<FeedbackId> {
        let ts = format_timestamp(&timestamp);
        let class = predicted_class.map(str::to_owned);

        let id = self
            .with_conn(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                tx.execute(
                    "INSERT INTO Feedback (timestamp, predicted_class, status) VALUES (?1, ?2, ?3)",
                    params![ts, class, status.as_str()],
                )?;
                let id = tx.last_insert_rowid();
                tx.commit()?;
                Ok(FeedbackId(id))
            })
            .await?;

        debug!("Inserted feedback record {} ({})", id, status);
        Ok(id)
    }

    async fn amend(
        &self,
        id: FeedbackId,
        timestamp: NaiveDateTime,
        predicted_class: Option<&str>,
        status: Judgment,
    ) -> Result<bool> {
        let ts = format_timestamp(&timestamp);
        let class = predicted_class.map(str::to_owned);

        let updated = self
            .with_conn(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let rows = tx.execute(
                    "UPDATE Feedback SET predicted_class = ?1, status = ?2, timestamp = ?3 WHERE id = ?4",
                    params![class, status.as_str(), ts, id.0],
                )?;
                tx.commit()?;
                Ok(rows > 0)
            })
            .await?;

        debug!("Amended feedback record {} ({}): matched={}", id, status, updated);
        Ok(updated)
    }

    async fn count(&self, filter: &CountFilter) -> Result<u64> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let count = count_in(&tx, &filter)?;
            tx.commit()?;
            Ok(count)
        })
        .await
    }

    async fn count_many(&self, filters: &[CountFilter]) -> Result<Vec<u64>> {
        let filters = filters.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let counts = filters
                .iter()
                .map(|filter| count_in(&tx, filter))
                .collect::<Result<Vec<_>>>()?;
            tx.commit()?;
            Ok(counts)
        })
        .await
    }

    async fn get(&self, id: FeedbackId) -> Result<Option<FeedbackRecord>> {
        let row = self
            .with_conn(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT timestamp, predicted_class, status FROM Feedback WHERE id = ?1",
                        params![id.0],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, Option<String>>(1)?,
                                row.get::<_, String>(2)?,
                            ))
                        },
                    )
                    .optional()?;
                Ok(row)
            })
            .await?;

        let Some((ts, predicted_class, status)) = row else {
            return Ok(None);
        };

        let status = status.parse::<Judgment>().map_err(|_| {
            FeedbackError::StorageUnavailable(format!(
                "Record {} has unknown status '{}'",
                id, status
            ))
        })?;

        Ok(Some(FeedbackRecord {
            id,
            timestamp: parse_timestamp(&ts)?,
            predicted_class,
            status,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::now_timestamp;
    use tempfile::TempDir;

    async fn create_test_store() -> (TempDir, SqliteFeedbackStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteFeedbackStore::open(temp_dir.path().join("feedback.db")).unwrap();
        store.init_schema().await.expect("Failed to init schema");
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let (_dir, store) = create_test_store().await;

        let first = store
            .insert(now_timestamp(), Some("Cat"), Judgment::Unreported)
            .await
            .unwrap();
        let second = store
            .insert(now_timestamp(), Some("Dog"), Judgment::Unreported)
            .await
            .unwrap();

        assert!(second > first);
    }

    #[tokio::test]
    async fn test_get_returns_inserted_record() {
        let (_dir, store) = create_test_store().await;
        let ts = now_timestamp();

        let id = store.insert(ts, Some("Dog"), Judgment::Correct).await.unwrap();
        let record = store.get(id).await.unwrap().expect("record should exist");

        assert_eq!(record.id, id);
        assert_eq!(record.timestamp, ts);
        assert_eq!(record.predicted_class.as_deref(), Some("Dog"));
        assert_eq!(record.status, Judgment::Correct);
    }

    #[tokio::test]
    async fn test_null_class_round_trips() {
        let (_dir, store) = create_test_store().await;

        let id = store
            .insert(now_timestamp(), None, Judgment::Unreported)
            .await
            .unwrap();
        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(record.predicted_class, None);
    }

    #[tokio::test]
    async fn test_amend_overwrites_fields() {
        let (_dir, store) = create_test_store().await;

        let id = store
            .insert(now_timestamp(), Some("Cat"), Judgment::Unreported)
            .await
            .unwrap();
        let later = now_timestamp();
        let matched = store
            .amend(id, later, Some("Dog"), Judgment::Incorrect)
            .await
            .unwrap();

        assert!(matched);
        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(record.predicted_class.as_deref(), Some("Dog"));
        assert_eq!(record.status, Judgment::Incorrect);
        assert_eq!(record.timestamp, later);
    }

    #[tokio::test]
    async fn test_amend_missing_id_writes_nothing() {
        let (_dir, store) = create_test_store().await;
        store
            .insert(now_timestamp(), Some("Cat"), Judgment::Correct)
            .await
            .unwrap();

        let matched = store
            .amend(FeedbackId(999), now_timestamp(), Some("Dog"), Judgment::Incorrect)
            .await
            .unwrap();

        assert!(!matched);
        assert_eq!(store.count(&CountFilter::all()).await.unwrap(), 1);
        assert!(store.get(FeedbackId(999)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_filters() {
        let (_dir, store) = create_test_store().await;
        let rows = [
            ("Cat", Judgment::Correct),
            ("Cat", Judgment::Incorrect),
            ("Dog", Judgment::Incorrect),
            ("Dog", Judgment::Unreported),
        ];
        for (class, status) in rows {
            store.insert(now_timestamp(), Some(class), status).await.unwrap();
        }

        assert_eq!(store.count(&CountFilter::all()).await.unwrap(), 4);
        assert_eq!(
            store
                .count(&CountFilter::status(Judgment::Incorrect))
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            store
                .count(&CountFilter::class_status("Cat", Judgment::Correct))
                .await
                .unwrap(),
            1
        );
        let by_class = CountFilter {
            predicted_class: Some("Dog".to_string()),
            status: None,
        };
        assert_eq!(store.count(&by_class).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_count_many_matches_individual_counts() {
        let (_dir, store) = create_test_store().await;
        store
            .insert(now_timestamp(), Some("Cat"), Judgment::Correct)
            .await
            .unwrap();
        store
            .insert(now_timestamp(), Some("Dog"), Judgment::Incorrect)
            .await
            .unwrap();

        let filters = vec![
            CountFilter::all(),
            CountFilter::status(Judgment::Correct),
            CountFilter::class_status("Dog", Judgment::Incorrect),
            CountFilter::class_status("Bird", Judgment::Incorrect),
        ];
        let counts = store.count_many(&filters).await.unwrap();
        assert_eq!(counts, vec![2, 1, 1, 0]);
    }

    #[tokio::test]
    async fn test_missing_schema_is_storage_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteFeedbackStore::open(temp_dir.path().join("empty.db")).unwrap();

        let result = store
            .insert(now_timestamp(), Some("Cat"), Judgment::Unreported)
            .await;
        assert!(matches!(result, Err(FeedbackError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_distinct_ids() {
        let (_dir, store) = create_test_store().await;
        let store = std::sync::Arc::new(store);

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let class = if i % 2 == 0 { "Cat" } else { "Dog" };
                store
                    .insert(now_timestamp(), Some(class), Judgment::Unreported)
                    .await
                    .unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(store.count(&CountFilter::all()).await.unwrap(), 16);
    }
}

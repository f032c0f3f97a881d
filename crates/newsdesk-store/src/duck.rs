//! Embedded DuckDB backend for the interaction log.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use duckdb::{Connection, params};
use newsdesk_core::{InteractionRecord, Label, NewInteraction};
use tracing::info;

use crate::schema::{COLUMNS, DUCKDB_CREATE_TABLE, INSERT_PLACEHOLDERS};
use crate::{InteractionStore, StoreError};

/// DuckDB store for the `user_login` table.
///
/// Supports both in-memory (ephemeral) and persistent (file-backed) modes.
/// Use [`open`](Self::open) for in-memory and [`open_persistent`](Self::open_persistent)
/// for a file that survives across process restarts.
///
/// Each call works on its own connection cloned from the database handle,
/// used on the blocking pool and dropped when the call returns.
pub struct DuckStore {
    conn: Mutex<Connection>,
    schema_ready: AtomicBool,
}

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened duckdb interaction log");
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            schema_ready: AtomicBool::new(false),
        }
    }

    fn acquire(&self) -> Result<Connection, StoreError> {
        let base = self
            .conn
            .lock()
            .map_err(|_| StoreError::Other("duckdb handle lock poisoned".into()))?;
        Ok(base.try_clone()?)
    }

    /// Run `f` against a fresh connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.acquire()?;
        tokio::task::spawn_blocking(move || f(&conn))
            .await
            .map_err(|e| StoreError::Other(format!("duckdb task failed: {e}")))?
    }

    /// Number of rows in `user_login`.
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.acquire()?;
        let n: i64 = conn.query_row("SELECT count(*)::BIGINT FROM user_login", [], |row| {
            row.get(0)
        })?;
        Ok(n as usize)
    }
}

#[async_trait]
impl InteractionStore for DuckStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| Ok(conn.execute_batch(DUCKDB_CREATE_TABLE)?))
            .await?;
        if !self.schema_ready.swap(true, Ordering::SeqCst) {
            info!("user_login table ready");
        }
        Ok(())
    }

    async fn append(&self, record: &NewInteraction) -> Result<i64, StoreError> {
        if !self.schema_ready.load(Ordering::SeqCst) {
            self.ensure_schema().await?;
        }
        let record = record.clone();
        self.with_conn(move |conn| {
            let sql = format!("{INSERT_PLACEHOLDERS} RETURNING id");
            let id: i64 = conn.query_row(
                &sql,
                params![
                    record.name,
                    record.interaction_time,
                    record.input_text,
                    record.predicted_category.map(Label::as_str),
                ],
                |row| row.get(0),
            )?;
            Ok(id)
        })
        .await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<InteractionRecord>, StoreError> {
        if !self.schema_ready.load(Ordering::SeqCst) {
            self.ensure_schema().await?;
        }
        self.with_conn(move |conn| {
            let sql = format!("SELECT {COLUMNS} FROM user_login ORDER BY id DESC LIMIT ?");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![limit as i64], |row| {
                Ok(InteractionRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    interaction_time: row.get::<_, Option<NaiveDateTime>>(2)?,
                    input_text: row.get(3)?,
                    predicted_category: row.get(4)?,
                })
            })?;
            let mut records = Vec::with_capacity(limit.min(256));
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let store = DuckStore::open().unwrap();
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn append_bootstraps_schema() {
        let store = DuckStore::open().unwrap();
        let id = store
            .append(&NewInteraction::classified("ada", at(10, 0, 0), "text", Label::World))
            .await
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn append_then_read_back() {
        let store = DuckStore::open().unwrap();
        let text = "The stock market rallied today amid tech earnings.";
        let time = at(14, 5, 9);
        let id = store
            .append(&NewInteraction::classified("grace", time, text, Label::Business))
            .await
            .unwrap();

        let rows = store.recent(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id, id);
        assert_eq!(row.name.as_deref(), Some("grace"));
        assert_eq!(row.interaction_time, Some(time));
        assert_eq!(row.input_text.as_deref(), Some(text));
        assert_eq!(row.predicted_category.as_deref(), Some("Business"));
        assert_eq!(row.label(), Some(Label::Business));
    }

    #[tokio::test]
    async fn ids_increase_and_recent_is_newest_first() {
        let store = DuckStore::open().unwrap();
        let mut ids = Vec::new();
        for (i, label) in Label::ALL.into_iter().enumerate() {
            let rec = NewInteraction::classified("ada", at(9, i as u32, 0), format!("article {i}"), label);
            ids.push(store.append(&rec).await.unwrap());
        }
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "{ids:?}");

        let rows = store.recent(2).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].predicted_category.as_deref(), Some("Sci/Tech"));
        assert_eq!(rows[1].predicted_category.as_deref(), Some("Business"));
    }

    #[tokio::test]
    async fn login_row_stores_nulls() {
        let store = DuckStore::open().unwrap();
        store
            .append(&NewInteraction::login("ada", at(8, 0, 0)))
            .await
            .unwrap();
        let rows = store.recent(1).await.unwrap();
        assert!(rows[0].input_text.is_none());
        assert!(rows[0].predicted_category.is_none());
    }

    #[tokio::test]
    async fn persistent_rows_survive_reopen() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("log.duckdb");

        let store = DuckStore::open_persistent(&db_path).unwrap();
        store
            .append(&NewInteraction::classified("ada", at(7, 0, 0), "goal!", Label::Sports))
            .await
            .unwrap();
        drop(store);

        let store = DuckStore::open_persistent(&db_path).unwrap();
        store.ensure_schema().await.unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let next = store
            .append(&NewInteraction::classified("ada", at(7, 1, 0), "chips", Label::SciTech))
            .await
            .unwrap();
        assert_eq!(next, 2);
    }

    #[tokio::test]
    async fn connect_selects_duckdb() {
        let store = crate::connect("duckdb::memory:", &crate::StoreOptions::default())
            .await
            .unwrap();
        store.ensure_schema().await.unwrap();
        assert!(store.recent(5).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_appends_get_distinct_ids() {
        let store = std::sync::Arc::new(DuckStore::open().unwrap());
        store.ensure_schema().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8u32 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let rec = NewInteraction::classified("ada", at(12, i, 0), format!("article {i}"), Label::World);
                store.append(&rec).await
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.count().unwrap(), 8);
    }
}

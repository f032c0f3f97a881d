//! MySQL backend (RDS-compatible) over a sqlx connection pool.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use newsdesk_core::{InteractionRecord, Label, NewInteraction};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use tracing::info;

use crate::schema::{COLUMNS, INSERT_PLACEHOLDERS, MYSQL_CREATE_TABLE};
use crate::{InteractionStore, StoreError, StoreOptions, redact};

type Row = (
    i32,
    Option<String>,
    Option<NaiveDateTime>,
    Option<String>,
    Option<String>,
);

/// MySQL store for the `user_login` table.
///
/// Calls borrow a pooled connection for one statement and return it to the
/// pool afterwards. The schema is created on first use and re-attempted on
/// later calls until it succeeds.
pub struct MySqlStore {
    pool: MySqlPool,
    schema_ready: AtomicBool,
}

impl MySqlStore {
    /// Build a pool without connecting. Fails only on a malformed URL.
    pub fn connect_lazy(url: &str, options: &StoreOptions) -> Result<Self, StoreError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect_lazy(url)?;
        info!(url = %redact(url), max_connections = options.max_connections, "configured mysql pool");
        Ok(Self {
            pool,
            schema_ready: AtomicBool::new(false),
        })
    }

    async fn ensure_schema_once(&self) -> Result<(), StoreError> {
        if self.schema_ready.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.ensure_schema().await
    }
}

#[async_trait]
impl InteractionStore for MySqlStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(MYSQL_CREATE_TABLE).execute(&self.pool).await?;
        if !self.schema_ready.swap(true, Ordering::SeqCst) {
            info!("user_login table ready");
        }
        Ok(())
    }

    async fn append(&self, record: &NewInteraction) -> Result<i64, StoreError> {
        self.ensure_schema_once().await?;
        let result = sqlx::query(INSERT_PLACEHOLDERS)
            .bind(&record.name)
            .bind(record.interaction_time)
            .bind(record.input_text.as_deref())
            .bind(record.predicted_category.map(Label::as_str))
            .execute(&self.pool)
            .await?;
        i64::try_from(result.last_insert_id())
            .map_err(|_| StoreError::Other(format!("insert id {} out of range", result.last_insert_id())))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<InteractionRecord>, StoreError> {
        self.ensure_schema_once().await?;
        let sql = format!("SELECT {COLUMNS} FROM user_login ORDER BY id DESC LIMIT ?");
        let rows: Vec<Row> = sqlx::query_as(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(
                |(id, name, interaction_time, input_text, predicted_category)| InteractionRecord {
                    id: i64::from(id),
                    name,
                    interaction_time,
                    input_text,
                    predicted_category,
                },
            )
            .collect())
    }
}

use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use log::{ debug, info };
use parking_lot::Mutex;
use rusqlite::{ params, Connection, Row };
use std::path::Path;
use std::sync::Arc;
use crate::models::interaction::{ Interaction, NewInteraction, DEFAULT_MODEL, DEFAULT_TEMPERATURE };
use crate::store::{ InteractionStore, StoreError };

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS llm_interactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_message TEXT NOT NULL,
    assistant_response TEXT,
    model VARCHAR(255) DEFAULT 'gpt-3.5-turbo',
    temperature REAL DEFAULT 0.7,
    tokens_used INTEGER DEFAULT 0,
    error_message TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS ix_llm_interactions_created_at ON llm_interactions(created_at);
"#;

const SELECT_COLUMNS: &str =
    "id, user_message, assistant_response, model, temperature, tokens_used, error_message, created_at, updated_at";

/// Embedded store. One connection guarded by a mutex; queries run on the
/// blocking thread pool.
pub struct SqliteInteractionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteInteractionStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!("Opened SQLite interaction store at {:?}", path);
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
        where F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static, T: Send + 'static
    {
        let conn = Arc::clone(&self.conn);
        let result = tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        }).await?;
        Ok(result?)
    }
}

fn row_to_interaction(row: &Row<'_>) -> rusqlite::Result<Interaction> {
    Ok(Interaction {
        id: row.get(0)?,
        user_message: row.get(1)?,
        assistant_response: row.get(2)?,
        model: row.get::<_, Option<String>>(3)?.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        temperature: row.get::<_, Option<f64>>(4)?.unwrap_or(DEFAULT_TEMPERATURE),
        tokens_used: row.get::<_, Option<i64>>(5)?.unwrap_or(0),
        error_message: row.get(6)?,
        created_at: row.get::<_, DateTime<Utc>>(7)?,
        updated_at: row.get::<_, DateTime<Utc>>(8)?,
    })
}

#[async_trait]
impl InteractionStore for SqliteInteractionStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.with_conn(|conn| conn.execute_batch(SCHEMA)).await
    }

    async fn insert(&self, record: NewInteraction) -> Result<i64, StoreError> {
        let id = self.with_conn(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO llm_interactions
                 (user_message, assistant_response, model, temperature, tokens_used, error_message, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.user_message,
                    record.assistant_response,
                    record.model,
                    record.temperature,
                    record.tokens_used,
                    record.error_message,
                    now,
                    now
                ]
            )?;
            Ok(conn.last_insert_rowid())
        }).await?;
        debug!("Stored interaction {}", id);
        Ok(id)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Interaction>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                &format!(
                    "SELECT {} FROM llm_interactions ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
                    SELECT_COLUMNS
                )
            )?;
            let rows = stmt
                .query_map(params![limit, offset], row_to_interaction)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        }).await
    }

    async fn count_and_sum_tokens(&self) -> Result<(i64, i64), StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(tokens_used), 0) FROM llm_interactions",
                [],
                |row| Ok((row.get(0)?, row.get(1)?))
            )
        }).await
    }
}

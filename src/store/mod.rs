mod postgres;
mod sqlite;

pub use postgres::PostgresInteractionStore;
pub use sqlite::SqliteInteractionStore;

use async_trait::async_trait;
use log::info;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use crate::models::interaction::{ Interaction, NewInteraction };

pub const TABLE_NAME: &str = "llm_interactions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),
}

/// Append-only log of completion attempts.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Creates the table and index if they are missing. Safe to call on every start.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Appends a row and returns its id.
    async fn insert(&self, record: NewInteraction) -> Result<i64, StoreError>;

    /// Newest first, `limit`/`offset` applied after ordering.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Interaction>, StoreError>;

    /// Row count and the sum of `tokens_used` (0 for an empty table).
    async fn count_and_sum_tokens(&self) -> Result<(i64, i64), StoreError>;
}

/// Where interactions are kept, parsed from `DATABASE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    SqliteFile(PathBuf),
    SqliteMemory,
    Postgres(String),
}

impl FromStr for StoreLocation {
    type Err = StoreError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let url = url.trim();
        if url == "sqlite::memory:" || url == "sqlite://" || url == "sqlite:///:memory:" {
            return Ok(StoreLocation::SqliteMemory);
        }
        // sqlite:///relative.db and sqlite:////absolute.db
        if let Some(path) = url.strip_prefix("sqlite:///") {
            return Ok(StoreLocation::SqliteFile(PathBuf::from(path)));
        }
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(StoreLocation::Postgres(url.to_string()));
        }
        Err(StoreError::UnsupportedUrl(url.to_string()))
    }
}

pub fn create_store(database_url: &str) -> Result<Arc<dyn InteractionStore>, StoreError> {
    match database_url.parse::<StoreLocation>()? {
        StoreLocation::SqliteFile(path) => {
            let store = SqliteInteractionStore::open(&path)?;
            Ok(Arc::new(store))
        }
        StoreLocation::SqliteMemory => {
            let store = SqliteInteractionStore::in_memory()?;
            Ok(Arc::new(store))
        }
        StoreLocation::Postgres(url) => {
            let store = PostgresInteractionStore::new(&url)?;
            Ok(Arc::new(store))
        }
    }
}

pub async fn initialize_store(
    database_url: &str,
    display_url: &str
) -> Result<Arc<dyn InteractionStore>, StoreError> {
    info!("Interactions will be stored in: {}", display_url);
    let store = create_store(database_url)?;
    store.initialize().await?;
    info!("Interaction table '{}' ready", TABLE_NAME);
    Ok(store)
}

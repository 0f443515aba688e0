use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;

use crate::codegen::CodeGenerator;
use crate::config::AppConfig;
use crate::models::{Record, Resolution};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// How many fresh candidates `allocate` draws before declaring the key space
/// exhausted. Collisions are vanishingly rare at the default 62^7 key space,
/// so hitting this bound means the space is nearly saturated or the generator
/// is broken.
pub const MAX_ALLOC_ATTEMPTS: u32 = 10;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The target code has no live record. Expected, recoverable.
    #[error("short code not found")]
    NotFound,

    /// `allocate` could not find a free code within the retry bound.
    #[error("no free short code after {attempts} attempts")]
    KeyspaceExhausted { attempts: u32 },

    /// Precondition violation (empty code or url reaching the store
    /// directly). Distinct from `NotFound` on purpose.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Sole authority over record existence and mutation.
///
/// Every operation is atomic with respect to the code it targets: two calls
/// touching the same code are linearized, two calls touching different codes
/// never wait on each other. There are no cross-code transactions.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Generate a candidate code and insert `{code, url, clicks: 0,
    /// indexable}` only if the code is free, retrying with a fresh candidate
    /// on collision up to [`MAX_ALLOC_ATTEMPTS`] times.
    ///
    /// The caller has already validated `url` syntactically; the store only
    /// refuses empty input outright.
    async fn allocate(&self, url: &str, indexable: bool) -> Result<Record>;

    /// Look up `code` and advance its click counter by exactly one in the
    /// same atomic step. The returned target and indexing hint are
    /// point-in-time consistent with the increment.
    async fn resolve(&self, code: &str) -> Result<Resolution>;

    /// Rewrite `url` and `indexable` on an existing record, preserving its
    /// current `clicks` value even when resolutions race with the rewrite.
    async fn update(&self, code: &str, url: &str, indexable: bool) -> Result<Record>;

    /// Remove the record. Destructive and immediate — the code becomes
    /// eligible for reallocation right away.
    async fn delete(&self, code: &str) -> Result<()>;

    /// Read-only snapshot of the record, clicks included. No mutation.
    async fn analytics(&self, code: &str) -> Result<Record>;
}

/// Build the configured store backend.
///
/// `sqlite` (the default) opens the pool and applies migrations; `memory`
/// needs no setup and is what the test suite leans on.
pub async fn from_config(config: &AppConfig) -> anyhow::Result<Arc<dyn LinkStore>> {
    let codegen = CodeGenerator::new(&config.code_alphabet, config.code_length)?;

    let store: Arc<dyn LinkStore> = match config.storage_backend.as_str() {
        "memory" => Arc::new(MemoryStore::new(codegen)),
        _ => {
            let pool = SqlitePoolOptions::new()
                .max_connections(10)
                .connect_with(
                    config
                        .database_url
                        .parse::<sqlx::sqlite::SqliteConnectOptions>()?
                        .create_if_missing(true)
                        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                        .foreign_keys(true),
                )
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations applied");

            Arc::new(SqliteStore::new(pool, codegen))
        }
    };

    Ok(store)
}

/// Reject an empty or whitespace-only code before it reaches a backend.
pub(crate) fn ensure_code(code: &str) -> Result<()> {
    if code.trim().is_empty() {
        return Err(StoreError::InvalidInput("code must not be empty".into()));
    }
    Ok(())
}

/// Reject an empty or whitespace-only url before it reaches a backend.
pub(crate) fn ensure_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(StoreError::InvalidInput("url must not be empty".into()));
    }
    Ok(())
}

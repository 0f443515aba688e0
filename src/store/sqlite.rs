use chrono::Utc;
use sqlx::SqlitePool;

use async_trait::async_trait;

use super::{ensure_code, ensure_url, LinkStore, Result, StoreError, MAX_ALLOC_ATTEMPTS};
use crate::codegen::CodeGenerator;
use crate::models::{Record, Resolution};

/// SQLite-backed store.
///
/// Every operation is a single statement, so per-code atomicity falls out of
/// the database: `ON CONFLICT DO NOTHING .. RETURNING` makes allocation an
/// insert-if-absent, and `SET clicks = clicks + 1 .. RETURNING` reads the
/// target in the same statement that advances the counter.
pub struct SqliteStore {
    pool: SqlitePool,
    codegen: CodeGenerator,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, codegen: CodeGenerator) -> Self {
        Self { pool, codegen }
    }
}

#[async_trait]
impl LinkStore for SqliteStore {
    async fn allocate(&self, url: &str, indexable: bool) -> Result<Record> {
        ensure_url(url)?;

        for attempt in 1..=MAX_ALLOC_ATTEMPTS {
            let code = self.codegen.generate();

            // RETURNING yields a row only when the insert actually happened,
            // so a collision shows up as an empty result, not an error.
            let inserted: Option<Record> = sqlx::query_as(
                "INSERT INTO links (code, url, clicks, indexable, created_at)
                 VALUES (?1, ?2, 0, ?3, ?4)
                 ON CONFLICT(code) DO NOTHING
                 RETURNING code, url, clicks, indexable, created_at",
            )
            .bind(&code)
            .bind(url)
            .bind(indexable)
            .bind(Utc::now().naive_utc())
            .fetch_optional(&self.pool)
            .await?;

            match inserted {
                Some(record) => return Ok(record),
                None => tracing::debug!(
                    "code '{}' already taken (attempt {}/{})",
                    code,
                    attempt,
                    MAX_ALLOC_ATTEMPTS
                ),
            }
        }

        Err(StoreError::KeyspaceExhausted {
            attempts: MAX_ALLOC_ATTEMPTS,
        })
    }

    async fn resolve(&self, code: &str) -> Result<Resolution> {
        ensure_code(code)?;

        let row: Option<(String, bool)> = sqlx::query_as(
            "UPDATE links SET clicks = clicks + 1 WHERE code = ?1
             RETURNING url, indexable",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((url, indexable)) => Ok(Resolution { url, indexable }),
            None => Err(StoreError::NotFound),
        }
    }

    async fn update(&self, code: &str, url: &str, indexable: bool) -> Result<Record> {
        ensure_code(code)?;
        ensure_url(url)?;

        // `clicks` is absent from the SET list, so a racing resolve can never
        // be overwritten with a stale counter.
        let updated: Option<Record> = sqlx::query_as(
            "UPDATE links SET url = ?1, indexable = ?2 WHERE code = ?3
             RETURNING code, url, clicks, indexable, created_at",
        )
        .bind(url)
        .bind(indexable)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or(StoreError::NotFound)
    }

    async fn delete(&self, code: &str) -> Result<()> {
        ensure_code(code)?;

        let affected = sqlx::query("DELETE FROM links WHERE code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if affected > 0 {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn analytics(&self, code: &str) -> Result<Record> {
        ensure_code(code)?;

        let record: Option<Record> = sqlx::query_as(
            "SELECT code, url, clicks, indexable, created_at
             FROM links WHERE code = ?1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or(StoreError::NotFound)
    }
}

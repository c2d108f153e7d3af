//! `PostgreSQL` backend for the draft cache.

use async_trait::async_trait;
use sqlx::PgPool;

use pitchside_core::drafts::{DraftKey, DraftRepository};
use pitchside_core::error::DomainError;

use crate::infrastructure;

/// Draft storage in the `form_drafts` table, one row per draft key.
#[derive(Debug, Clone)]
pub struct PgDraftRepository {
    pool: PgPool,
}

impl PgDraftRepository {
    /// Creates a new `PgDraftRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DraftRepository for PgDraftRepository {
    async fn read(&self, key: &DraftKey) -> Result<Option<serde_json::Value>, DomainError> {
        sqlx::query_scalar("SELECT fields FROM form_drafts WHERE draft_key = $1")
            .bind(key.storage_key())
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)
    }

    async fn write(&self, key: &DraftKey, value: serde_json::Value) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO form_drafts (draft_key, module, fields, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (draft_key)
            DO UPDATE SET fields = EXCLUDED.fields, updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(key.storage_key())
        .bind(key.module.slug())
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        Ok(())
    }

    async fn remove(&self, key: &DraftKey) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM form_drafts WHERE draft_key = $1")
            .bind(key.storage_key())
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}

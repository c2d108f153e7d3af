//! Read-only player listing over the `players` table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use pitchside_core::collaborators::{Player, PlayerDirectory};
use pitchside_core::error::DomainError;

use crate::infrastructure;

/// PostgreSQL-backed player directory.
#[derive(Debug, Clone)]
pub struct PgPlayerDirectory {
    pool: PgPool,
}

impl PgPlayerDirectory {
    /// Creates a new `PgPlayerDirectory`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PlayerRow {
    player_id: Uuid,
    display_name: String,
    squad: Option<String>,
}

#[async_trait]
impl PlayerDirectory for PgPlayerDirectory {
    async fn get_all(&self) -> Result<Vec<Player>, DomainError> {
        let rows = sqlx::query_as::<_, PlayerRow>(
            "SELECT player_id, display_name, squad FROM players ORDER BY display_name, player_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(rows
            .into_iter()
            .map(|row| Player {
                player_id: row.player_id,
                display_name: row.display_name,
                squad: row.squad,
            })
            .collect())
    }
}

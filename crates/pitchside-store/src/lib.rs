//! Pitchside Store — `PostgreSQL` adapters.
//!
//! Implements the event store, the draft cache backend and the player
//! directory over a shared `PgPool`. Queries are checked at runtime; the
//! schema lives in the workspace `migrations/` directory.

use pitchside_core::error::DomainError;

pub mod pg_draft_repository;
pub mod pg_event_repository;
pub mod pg_player_directory;

/// Migrations for every table the adapters use.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

pub(crate) fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

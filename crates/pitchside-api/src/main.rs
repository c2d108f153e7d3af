//! Pitchside API server entry point.

use std::sync::Arc;

use pitchside_api::config::AppConfig;
use pitchside_api::error::AppError;
use pitchside_api::state::AppState;
use pitchside_api::{routes, telemetry};
use pitchside_core::clock::SystemClock;
use pitchside_store::pg_draft_repository::PgDraftRepository;
use pitchside_store::pg_event_repository::PgEventRepository;
use pitchside_store::pg_player_directory::PgPlayerDirectory;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(config.otlp_endpoint.as_deref())?;

    tracing::info!(
        failure_policy = ?config.failure_policy,
        pending_drafts = ?config.pending_drafts,
        "Starting Pitchside API server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    pitchside_store::MIGRATOR.run(&pool).await?;

    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(PgEventRepository::new(pool.clone())),
        Arc::new(PgDraftRepository::new(pool.clone())),
        Arc::new(PgPlayerDirectory::new(pool)),
        config.failure_policy,
        config.pending_drafts,
        config.wizard_ttl,
    );

    // TODO: Replace CorsLayer::permissive() with the operator UI's origin.
    let app = routes::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    telemetry.shutdown();
    Ok(())
}

//! Route modules organized by bounded context.

use axum::Router;

use crate::state::AppState;

pub mod drafts;
pub mod encounters;
pub mod health;
pub mod intake;
pub mod players;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/players", players::router())
        .nest("/api/v1/encounters", encounters::router())
        .nest("/api/v1/intake", intake::router())
        .nest("/api/v1/drafts", drafts::router())
        .with_state(state)
}

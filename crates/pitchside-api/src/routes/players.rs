//! Player listing for pickers.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use pitchside_core::collaborators::Player;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
#[instrument(skip(state))]
async fn list_players(State(state): State<AppState>) -> Result<Json<Vec<Player>>, ApiError> {
    let players = state.players.get_all().await?;
    Ok(Json(players))
}

/// Returns the router for player listing.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_players))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{empty_request, json_body, test_state};
    use axum::http::StatusCode;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_list_players_returns_directory_contents() {
        let app = router().with_state(test_state());

        let response = app.oneshot(empty_request("GET", "/")).await.unwrap();

        let (status, json) = json_body(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["display_name"], "Aaron Blake");
    }
}

//! Routes for the draft cache of saved encounter forms.
//!
//! Drafts are best effort: reads of a missing or unreadable draft return an
//! empty map and writes never fail the request.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use pitchside_core::drafts::DraftKey;
use pitchside_core::fields::FieldMap;
use pitchside_core::module::Module;
use tracing::instrument;
use uuid::Uuid;

use crate::state::AppState;

/// GET /{module}/{encounter_id}
#[instrument(skip(state))]
async fn load_draft(
    State(state): State<AppState>,
    Path((module, encounter_id)): Path<(Module, Uuid)>,
) -> Json<FieldMap> {
    let key = DraftKey::for_encounter(module, encounter_id);
    Json(state.drafts.load(&key).await)
}

/// PUT /{module}/{encounter_id}
#[instrument(skip(state, fields))]
async fn save_draft(
    State(state): State<AppState>,
    Path((module, encounter_id)): Path<(Module, Uuid)>,
    Json(fields): Json<FieldMap>,
) -> StatusCode {
    let key = DraftKey::for_encounter(module, encounter_id);
    state.drafts.save(&key, &fields).await;
    StatusCode::NO_CONTENT
}

/// DELETE /{module}/{encounter_id}
#[instrument(skip(state))]
async fn clear_draft(
    State(state): State<AppState>,
    Path((module, encounter_id)): Path<(Module, Uuid)>,
) -> StatusCode {
    let key = DraftKey::for_encounter(module, encounter_id);
    state.drafts.clear(&key).await;
    StatusCode::NO_CONTENT
}

/// Returns the router for the draft cache.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{module}/{encounter_id}",
        get(load_draft).put(save_draft).delete(clear_draft),
    )
}

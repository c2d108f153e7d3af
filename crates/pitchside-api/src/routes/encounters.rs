//! Routes for the Encounter bounded context.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use chrono::NaiveDate;
use pitchside_core::error::DomainError;
use pitchside_core::fields::FieldMap;
use pitchside_core::module::Module;
use pitchside_encounters::application::command_handlers::{self, EncounterCommandResult};
use pitchside_encounters::application::query_handlers::{self, EncounterView};
use pitchside_encounters::domain::commands;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CreateEncounterRequest {
    /// The player being examined.
    pub player_id: Uuid,
    /// Date of the session.
    pub date: NaiveDate,
    /// The examination module.
    pub module: Module,
    /// Staff member creating the encounter.
    pub created_by: Uuid,
}

/// Request body for POST /{encounter_id}/void.
#[derive(Debug, Deserialize)]
pub struct VoidEncounterRequest {
    /// Why the encounter is voided.
    pub reason: String,
}

/// Request body for module payload writes.
#[derive(Debug, Deserialize)]
pub struct ModuleDataRequest {
    /// The form's fields.
    pub fields: FieldMap,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// The aggregate ID affected or created by the command.
    pub aggregate_id: Uuid,
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
}

impl From<EncounterCommandResult> for CommandResponse {
    fn from(result: EncounterCommandResult) -> Self {
        Self {
            aggregate_id: result.aggregate_id,
            event_ids: result.stored_events.iter().map(|e| e.event_id).collect(),
        }
    }
}

/// POST /
#[instrument(skip(state, request), fields(player_id = %request.player_id, module = %request.module))]
async fn create_encounter(
    State(state): State<AppState>,
    Json(request): Json<CreateEncounterRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CreateEncounter {
        correlation_id: Uuid::new_v4(),
        player_id: request.player_id,
        date: request.date,
        module: request.module,
        created_by: request.created_by,
    };

    info!(correlation_id = %command.correlation_id, "handling create_encounter command");

    let result = command_handlers::handle_create_encounter(
        &command,
        state.clock.as_ref(),
        state.event_repository.as_ref(),
    )
    .await?;

    Ok(Json(result.into()))
}

/// GET /{encounter_id}
#[instrument(skip(state))]
async fn get_encounter(
    State(state): State<AppState>,
    Path(encounter_id): Path<Uuid>,
) -> Result<Json<EncounterView>, ApiError> {
    let view =
        query_handlers::get_encounter_by_id(encounter_id, state.event_repository.as_ref()).await?;
    Ok(Json(view))
}

/// POST /{encounter_id}/void
#[instrument(skip(state, request))]
async fn void_encounter(
    State(state): State<AppState>,
    Path(encounter_id): Path<Uuid>,
    Json(request): Json<VoidEncounterRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::VoidEncounter {
        correlation_id: Uuid::new_v4(),
        encounter_id,
        reason: request.reason,
    };

    info!(correlation_id = %command.correlation_id, "handling void_encounter command");

    let result = command_handlers::handle_void_encounter(
        &command,
        state.clock.as_ref(),
        state.event_repository.as_ref(),
    )
    .await?;

    Ok(Json(result.into()))
}

/// GET /{encounter_id}/modules/{module}
///
/// 404 means the form has not been filled yet.
#[instrument(skip(state))]
async fn get_module_data(
    State(state): State<AppState>,
    Path((encounter_id, module)): Path<(Uuid, Module)>,
) -> Result<Json<FieldMap>, ApiError> {
    state
        .module_data
        .get_by_encounter_id(module, encounter_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            DomainError::NotFound(format!("{module} data for encounter {encounter_id}")).into()
        })
}

/// POST /{encounter_id}/modules/{module}
#[instrument(skip(state, request))]
async fn create_module_data(
    State(state): State<AppState>,
    Path((encounter_id, module)): Path<(Uuid, Module)>,
    Json(request): Json<ModuleDataRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .module_data
        .create(module, encounter_id, &request.fields)
        .await?;
    Ok(StatusCode::CREATED)
}

/// PUT /{encounter_id}/modules/{module}
#[instrument(skip(state, request))]
async fn update_module_data(
    State(state): State<AppState>,
    Path((encounter_id, module)): Path<(Uuid, Module)>,
    Json(request): Json<ModuleDataRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .module_data
        .update(module, encounter_id, &request.fields)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for the encounter context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_encounter))
        .route("/{encounter_id}", get(get_encounter))
        .route("/{encounter_id}/void", post(void_encounter))
        .route(
            "/{encounter_id}/modules/{module}",
            get(get_module_data)
                .post(create_module_data)
                .put(update_module_data),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{empty_request, json_body, json_request, test_state};
    use tower::ServiceExt;

    async fn create(state: &AppState, module: &str) -> Uuid {
        let body = serde_json::json!({
            "player_id": Uuid::new_v4(),
            "date": "2026-03-02",
            "module": module,
            "created_by": Uuid::new_v4(),
        });
        let response = router()
            .with_state(state.clone())
            .oneshot(json_request("POST", "/", &body))
            .await
            .unwrap();
        let (status, json) = json_body(response).await;
        assert_eq!(status, StatusCode::OK);
        json["aggregate_id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_create_encounter_then_get_returns_view() {
        // Arrange
        let state = test_state();
        let encounter_id = create(&state, "medical_exam").await;

        // Act
        let response = router()
            .with_state(state)
            .oneshot(empty_request("GET", &format!("/{encounter_id}")))
            .await
            .unwrap();

        // Assert
        let (status, json) = json_body(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["module"], "medical_exam");
        assert_eq!(json["has_module_data"], false);
        assert_eq!(json["voided"], false);
        assert_eq!(json["version"], 1);
    }

    #[tokio::test]
    async fn test_get_unknown_encounter_returns_404() {
        let app = router().with_state(test_state());

        let response = app
            .oneshot(empty_request("GET", &format!("/{}", Uuid::new_v4())))
            .await
            .unwrap();

        let (status, json) = json_body(response).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "aggregate_not_found");
    }

    #[tokio::test]
    async fn test_unfilled_module_data_returns_404() {
        let state = test_state();
        let encounter_id = create(&state, "nutrition").await;

        let response = router()
            .with_state(state)
            .oneshot(empty_request(
                "GET",
                &format!("/{encounter_id}/modules/nutrition"),
            ))
            .await
            .unwrap();

        let (status, json) = json_body(response).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
    }

    #[tokio::test]
    async fn test_module_data_create_update_and_read() {
        // Arrange
        let state = test_state();
        let encounter_id = create(&state, "physiotherapy").await;
        let uri = format!("/{encounter_id}/modules/physiotherapy");

        // Act
        let created = router()
            .with_state(state.clone())
            .oneshot(json_request("POST", &uri, &serde_json::json!({ "fields": { "rom_deg": 110.0 } })))
            .await
            .unwrap();
        let duplicate = router()
            .with_state(state.clone())
            .oneshot(json_request("POST", &uri, &serde_json::json!({ "fields": { "rom_deg": 111.0 } })))
            .await
            .unwrap();
        let updated = router()
            .with_state(state.clone())
            .oneshot(json_request("PUT", &uri, &serde_json::json!({ "fields": { "rom_deg": 125.0 } })))
            .await
            .unwrap();
        let read = router()
            .with_state(state)
            .oneshot(empty_request("GET", &uri))
            .await
            .unwrap();

        // Assert
        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
        assert_eq!(updated.status(), StatusCode::NO_CONTENT);
        let (status, json) = json_body(read).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "rom_deg": 125.0 }));
    }

    #[tokio::test]
    async fn test_void_encounter_marks_view_voided() {
        let state = test_state();
        let encounter_id = create(&state, "gps_performance").await;

        let response = router()
            .with_state(state.clone())
            .oneshot(json_request(
                "POST",
                &format!("/{encounter_id}/void"),
                &serde_json::json!({ "reason": "duplicate" }),
            ))
            .await
            .unwrap();
        let view = router()
            .with_state(state)
            .oneshot(empty_request("GET", &format!("/{encounter_id}")))
            .await
            .unwrap();

        let (status, json) = json_body(response).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);
        let (_, view) = json_body(view).await;
        assert_eq!(view["voided"], true);
    }

    #[tokio::test]
    async fn test_unknown_module_in_path_is_rejected() {
        let app = router().with_state(test_state());

        let response = app
            .oneshot(empty_request(
                "GET",
                &format!("/{}/modules/dentistry", Uuid::new_v4()),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! Routes for the intake workflow: selection wizards, sequencing, quick
//! creation and the module form protocol.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post};
use pitchside_core::drafts::{ActiveForm, DraftKey};
use pitchside_core::error::DomainError;
use pitchside_core::fields::FieldMap;
use pitchside_core::module::Module;
use pitchside_intake::application::confirm::{ConfirmationOutcome, confirm_selection};
use pitchside_intake::application::module_form::{FormSession, FormView};
use pitchside_intake::application::quick_create::{FormEntry, QuickCreateRequest};
use pitchside_intake::domain::sequence::{
    Destination, ModuleSequence, NavigationState, Progress, compute_next_destination,
    compute_progress,
};
use pitchside_intake::domain::wizard::{DateMode, WizardSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Fields a client holds for the form it has open.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedForm {
    /// The form's draft key.
    pub key: DraftKey,
    /// The form's in-memory fields.
    pub fields: FieldMap,
}

impl ActiveForm for SubmittedForm {
    fn draft_key(&self) -> DraftKey {
        self.key
    }

    fn flush(&self) -> FieldMap {
        self.fields.clone()
    }
}

/// Request body for POST /wizards.
#[derive(Debug, Deserialize)]
pub struct StartWizardRequest {
    /// Staff member running the wizard.
    pub created_by: Uuid,
}

/// Request body for POST /wizards/{wizard_id}/player.
#[derive(Debug, Deserialize)]
pub struct SelectPlayerRequest {
    /// The chosen player.
    pub player_id: Uuid,
}

/// Request body for POST /wizards/{wizard_id}/modules/toggle.
#[derive(Debug, Deserialize)]
pub struct ToggleModuleRequest {
    /// The module to add or remove.
    pub module: Module,
}

/// Response body for POST /wizards/{wizard_id}/modules/toggle.
#[derive(Debug, Serialize)]
pub struct ToggleModuleResponse {
    /// Whether the module is selected after the toggle.
    pub selected: bool,
    /// The wizard after the toggle.
    pub wizard: WizardSnapshot,
}

/// Request body for POST /wizards/{wizard_id}/confirm.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmRequest {
    /// The form open while confirming, flushed before any encounter is
    /// created.
    #[serde(default)]
    pub active_form: Option<SubmittedForm>,
}

/// Request body for POST /progress.
#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    /// The sequence, absent for single-module flows.
    #[serde(default)]
    pub module_sequence: Option<ModuleSequence>,
    /// Index of the current step.
    #[serde(default)]
    pub current_index: usize,
}

/// Response body for POST /progress.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    /// Progress; `null` when there is nothing to render.
    pub progress: Option<Progress>,
}

/// Request body for POST /next-destination.
#[derive(Debug, Deserialize)]
pub struct NextDestinationRequest {
    /// The sequence, absent for single-module flows.
    #[serde(default)]
    pub module_sequence: Option<ModuleSequence>,
    /// Index of the step just saved.
    #[serde(default)]
    pub current_index: usize,
    /// The player being examined.
    pub player_id: Uuid,
}

/// Request body for POST /quick-encounter.
#[derive(Debug, Deserialize)]
pub struct QuickEncounterRequest {
    /// The player the form is open for.
    pub player_id: Uuid,
    /// The form's module.
    pub module: Module,
    /// Staff member creating the encounter.
    pub created_by: Uuid,
    /// Unsaved fields of the open form.
    #[serde(default)]
    pub fields: Option<FieldMap>,
}

/// Request body for POST /forms/{module}/submit.
#[derive(Debug, Deserialize)]
pub struct SubmitFormRequest {
    /// The state the form was entered with.
    pub state: NavigationState,
    /// The fields to save.
    pub fields: FieldMap,
}

/// Response body for POST /forms/{module}/submit.
#[derive(Debug, Serialize)]
pub struct SubmitFormResponse {
    /// Where to go next.
    pub destination: Destination,
}

/// POST /wizards
#[instrument(skip(state, request), fields(created_by = %request.created_by))]
async fn start_wizard(
    State(state): State<AppState>,
    Json(request): Json<StartWizardRequest>,
) -> (StatusCode, Json<WizardSnapshot>) {
    let wizard = state.wizards.start(request.created_by);
    info!(wizard_id = %wizard.id(), "selection wizard started");
    (StatusCode::CREATED, Json(wizard.snapshot()))
}

/// GET /wizards/{wizard_id}
#[instrument(skip(state))]
async fn get_wizard(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, ApiError> {
    Ok(Json(state.wizards.get(wizard_id)?.snapshot()))
}

/// DELETE /wizards/{wizard_id}
#[instrument(skip(state))]
async fn cancel_wizard(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.wizards.remove(wizard_id)?;
    info!("selection wizard cancelled");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /wizards/{wizard_id}/player
#[instrument(skip(state, request), fields(player_id = %request.player_id))]
async fn select_player(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
    Json(request): Json<SelectPlayerRequest>,
) -> Result<Json<WizardSnapshot>, ApiError> {
    let snapshot = state.wizards.update(wizard_id, |wizard| {
        wizard.select_player(request.player_id)?;
        Ok(wizard.snapshot())
    })?;
    Ok(Json(snapshot))
}

/// POST /wizards/{wizard_id}/modules/toggle
#[instrument(skip(state, request), fields(module = %request.module))]
async fn toggle_module(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
    Json(request): Json<ToggleModuleRequest>,
) -> Result<Json<ToggleModuleResponse>, ApiError> {
    let response = state.wizards.update(wizard_id, |wizard| {
        let selected = wizard.toggle_module(request.module)?;
        Ok(ToggleModuleResponse {
            selected,
            wizard: wizard.snapshot(),
        })
    })?;
    Ok(Json(response))
}

/// POST /wizards/{wizard_id}/date
#[instrument(skip(state))]
async fn set_date_mode(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
    Json(date_mode): Json<DateMode>,
) -> Result<Json<WizardSnapshot>, ApiError> {
    let today = state.clock.today();
    let snapshot = state.wizards.update(wizard_id, |wizard| {
        wizard.set_date_mode(date_mode, today)?;
        Ok(wizard.snapshot())
    })?;
    Ok(Json(snapshot))
}

/// POST /wizards/{wizard_id}/advance
#[instrument(skip(state))]
async fn advance_wizard(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, ApiError> {
    let today = state.clock.today();
    let snapshot = state.wizards.update(wizard_id, |wizard| {
        wizard.advance(today)?;
        Ok(wizard.snapshot())
    })?;
    Ok(Json(snapshot))
}

/// POST /wizards/{wizard_id}/back
#[instrument(skip(state))]
async fn wizard_back(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, ApiError> {
    let snapshot = state.wizards.update(wizard_id, |wizard| {
        wizard.go_back()?;
        Ok(wizard.snapshot())
    })?;
    Ok(Json(snapshot))
}

/// POST /wizards/{wizard_id}/confirm
///
/// Creation runs on its own task: once started it finishes even if the
/// client goes away. A second confirm of the same wizard is rejected while
/// the first is running.
#[instrument(skip(state, request))]
async fn confirm_wizard(
    State(state): State<AppState>,
    Path(wizard_id): Path<Uuid>,
    Json(request): Json<ConfirmRequest>,
) -> Result<Json<ConfirmationOutcome>, ApiError> {
    let wizard = state.wizards.begin_confirm(wizard_id)?;
    let task_state = state.clone();

    let outcome = tokio::spawn(async move {
        let active_form = request.active_form;
        let result = confirm_selection(
            &wizard,
            task_state.encounter_creator.as_ref(),
            &task_state.drafts,
            active_form.as_ref().map(|form| form as &dyn ActiveForm),
            task_state.clock.as_ref(),
            task_state.failure_policy,
        )
        .await;
        task_state.wizards.finish_confirm(wizard_id, result.is_ok());
        result
    })
    .await
    .map_err(|e| DomainError::Infrastructure(format!("confirmation task failed: {e}")))??;

    Ok(Json(outcome))
}

/// POST /progress
async fn progress(Json(request): Json<ProgressRequest>) -> Json<ProgressResponse> {
    Json(ProgressResponse {
        progress: compute_progress(request.module_sequence.as_ref(), request.current_index),
    })
}

/// POST /next-destination
async fn next_destination(Json(request): Json<NextDestinationRequest>) -> Json<Destination> {
    Json(compute_next_destination(
        request.module_sequence.as_ref(),
        request.current_index,
        request.player_id,
    ))
}

/// POST /quick-encounter
#[instrument(skip(state, request), fields(player_id = %request.player_id, module = %request.module))]
async fn quick_encounter(
    State(state): State<AppState>,
    Json(request): Json<QuickEncounterRequest>,
) -> Result<Json<FormEntry>, ApiError> {
    let active_form = request.fields.map(|fields| SubmittedForm {
        key: DraftKey::pending(request.module, request.player_id),
        fields,
    });
    let entry = state
        .quick_creator
        .create(
            QuickCreateRequest {
                player_id: request.player_id,
                module: request.module,
                created_by: request.created_by,
            },
            active_form.as_ref().map(|form| form as &dyn ActiveForm),
            state.encounter_creator.as_ref(),
            &state.drafts,
            state.clock.as_ref(),
        )
        .await?;
    Ok(Json(entry))
}

/// POST /forms/{module}/mount
#[instrument(skip(state, entry), fields(encounter_id = %entry.encounter_id))]
async fn mount_form(
    State(state): State<AppState>,
    Path(module): Path<Module>,
    Json(entry): Json<NavigationState>,
) -> Result<Json<FormView>, ApiError> {
    let session =
        FormSession::mount(module, entry, &state.drafts, state.module_data.as_ref()).await?;
    Ok(Json(session.view()))
}

/// POST /forms/{module}/submit
#[instrument(skip(state, request), fields(encounter_id = %request.state.encounter_id))]
async fn submit_form(
    State(state): State<AppState>,
    Path(module): Path<Module>,
    Json(request): Json<SubmitFormRequest>,
) -> Result<Json<SubmitFormResponse>, ApiError> {
    let mut session = FormSession::from_fields(module, request.state, request.fields)?;
    let destination = session
        .submit(&state.drafts, state.module_data.as_ref())
        .await?;
    Ok(Json(SubmitFormResponse { destination }))
}

/// Returns the router for the intake workflow.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wizards", post(start_wizard))
        .route("/wizards/{wizard_id}", get(get_wizard).delete(cancel_wizard))
        .route("/wizards/{wizard_id}/player", post(select_player))
        .route("/wizards/{wizard_id}/modules/toggle", post(toggle_module))
        .route("/wizards/{wizard_id}/date", post(set_date_mode))
        .route("/wizards/{wizard_id}/advance", post(advance_wizard))
        .route("/wizards/{wizard_id}/back", post(wizard_back))
        .route("/wizards/{wizard_id}/confirm", post(confirm_wizard))
        .route("/progress", post(progress))
        .route("/next-destination", post(next_destination))
        .route("/quick-encounter", post(quick_encounter))
        .route("/forms/{module}/mount", post(mount_form))
        .route("/forms/{module}/submit", post(submit_form))
}

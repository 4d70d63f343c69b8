//! # Registration Routes
//!
//! | Method | Path                                     | Requires        |
//! |--------|------------------------------------------|-----------------|
//! | POST   | `/v1/registrations`                      | a profile agent |
//! | GET    | `/v1/registrations/{id}`                 | `view`          |
//! | DELETE | `/v1/registrations/{id}`                 | `@control`      |
//! | POST   | `/v1/registrations/{id}/status/{target}` | `changeStatus`  |
//! | PUT    | `/v1/registrations/{id}/status`          | `@control`      |
//! | GET    | `/v1/registrations/{id}/owner`           | `view`          |
//! | PUT    | `/v1/registrations/{id}/owner`           | `@control`      |
//! | POST   | `/v1/registrations/{id}/files/{group}`   | `@control`      |
//! | PUT    | `/v1/registrations/{id}/metadata/{key}`  | `@control`      |
//!
//! Handlers clone the registration out of the store, work on the copy, and
//! write it back through the repository. No lock is held in between.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use mapas_core::{AgentId, Capability, EntityRef, FileId, ProjectId, RegistrationId};
use mapas_state::{
    EntitySummary, FileRef, MetadataStore, OwnerStatus, OwnershipResolver, ProjectDirectory,
    Registration, RegistrationError, RegistrationRepository, RegistrationStatus,
    RegistrationView, StatusMachine, Transition,
};

use crate::auth::CallerIdentity;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path, extract_validated_json, Validate};
use crate::state::AppState;

/// Length limit of the `category` column.
const CATEGORY_MAX_LEN: usize = 255;

// ── Request / Response Bodies ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistrationRequest {
    pub project_id: ProjectId,
    #[serde(default)]
    pub category: String,
}

impl Validate for CreateRegistrationRequest {
    fn validate(&self) -> Result<(), String> {
        if self.category.chars().count() > CATEGORY_MAX_LEN {
            return Err(format!(
                "category must be at most {CATEGORY_MAX_LEN} characters"
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: RegistrationStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetOwnerRequest {
    pub agent_id: AgentId,
}

#[derive(Debug, Deserialize)]
pub struct AttachFileRequest {
    pub id: FileId,
    pub name: String,
    pub url: String,
}

impl Validate for AttachFileRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("file name must not be empty".to_string());
        }
        if self.url.trim().is_empty() {
            return Err("file url must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SetMetadataRequest {
    pub value: String,
}

/// The effective owner, which differs from the recorded owner while a
/// transfer request is pending.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub agent: EntitySummary,
    pub status: OwnerStatus,
    /// The agent that asked for the pending transfer, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<AgentId>,
}

// ── Router ──────────────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/registrations", post(create_registration))
        .route(
            "/v1/registrations/{id}",
            get(get_registration).delete(delete_registration),
        )
        .route("/v1/registrations/{id}/status", put(set_status))
        .route("/v1/registrations/{id}/status/{target}", post(change_status))
        .route("/v1/registrations/{id}/owner", get(get_owner).put(set_owner))
        .route("/v1/registrations/{id}/files/{group}", post(attach_file))
        .route("/v1/registrations/{id}/metadata/{key}", put(set_metadata))
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn load(state: &AppState, id: u64) -> Result<Registration, AppError> {
    state
        .registrations
        .find(RegistrationId(id))
        .ok_or_else(|| AppError::NotFound(format!("registration {id} not found")))
}

fn view(state: &AppState, registration: &Registration) -> Json<RegistrationView> {
    Json(RegistrationView::from_registration(
        registration,
        &state.relations,
        &state.config.urls,
    ))
}

// ── Handlers ────────────────────────────────────────────────────────────────

/// POST /v1/registrations: Create a draft owned by the caller's profile agent.
async fn create_registration(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    body: Result<Json<CreateRegistrationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegistrationView>), AppError> {
    let req = extract_validated_json(body)?;
    let project = state
        .directory
        .find_project(req.project_id)
        .ok_or(RegistrationError::ProjectNotFound(req.project_id))?;

    let mut registration = Registration::new(project, &actor, &state.directory)?;
    registration.set_category(req.category);
    state.registrations.save(&mut registration, false)?;

    tracing::info!(
        registration = ?registration.id(),
        project = %registration.project().id,
        owner = %registration.owner().id,
        "registration created"
    );
    Ok((StatusCode::CREATED, view(&state, &registration)))
}

/// GET /v1/registrations/{id}
async fn get_registration(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<RegistrationView>, AppError> {
    let id = extract_path(path)?;
    let registration = load(&state, id)?;
    registration.require_capability(Capability::View, &actor, &state.permissions)?;
    Ok(view(&state, &registration))
}

/// DELETE /v1/registrations/{id}: Delete with its metadata. Pending
/// ownership-transfer requests for it are withdrawn.
async fn delete_registration(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    path: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_path(path)?;
    let registration = load(&state, id)?;
    registration.require_capability(Capability::Control, &actor, &state.permissions)?;
    state.registrations.delete(registration)?;
    state
        .ownership_requests
        .withdraw(EntityRef::registration(RegistrationId(id)));
    tracing::info!(registration_id = id, actor = %actor, "registration deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/registrations/{id}/status/{target}: Run a status transition.
async fn change_status(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    path: Result<Path<(u64, String)>, PathRejection>,
) -> Result<Json<RegistrationView>, AppError> {
    let (id, target) = extract_path(path)?;
    let transition: Transition = target.parse()?;
    let mut registration = load(&state, id)?;

    let machine = StatusMachine::new(&state.permissions, &state.hooks, &state.registrations);
    machine.apply(&mut registration, &actor, transition)?;

    Ok(view(&state, &registration))
}

/// PUT /v1/registrations/{id}/status: Plain status assignment. Accepted and
/// ignored; status only moves through the transition endpoint.
async fn set_status(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<SetStatusRequest>, JsonRejection>,
) -> Result<Json<RegistrationView>, AppError> {
    let id = extract_path(path)?;
    let req = extract_json(body)?;
    let mut registration = load(&state, id)?;
    registration.require_capability(Capability::Control, &actor, &state.permissions)?;
    registration.set_status(req.status);
    Ok(view(&state, &registration))
}

/// GET /v1/registrations/{id}/owner: Effective owner and ownership status.
async fn get_owner(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<OwnerResponse>, AppError> {
    let id = extract_path(path)?;
    let registration = load(&state, id)?;
    registration.require_capability(Capability::View, &actor, &state.permissions)?;

    let owner = OwnershipResolver::new(&state.ownership_requests).resolve(&registration);
    Ok(Json(OwnerResponse {
        agent: EntitySummary::of_agent(&owner.agent, &state.config.urls),
        status: owner.status,
        requested_by: owner.requested_by,
    }))
}

/// PUT /v1/registrations/{id}/owner: Reassign the recorded owner.
async fn set_owner(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<SetOwnerRequest>, JsonRejection>,
) -> Result<Json<RegistrationView>, AppError> {
    let id = extract_path(path)?;
    let req = extract_json(body)?;
    let mut registration = load(&state, id)?;
    registration.require_capability(Capability::Control, &actor, &state.permissions)?;

    let previous = registration.owner().id;
    registration.set_owner_id(req.agent_id, &state.directory)?;
    state.registrations.save(&mut registration, false)?;

    tracing::info!(
        registration_id = id,
        from = %previous,
        to = %req.agent_id,
        "registration owner changed"
    );
    Ok(view(&state, &registration))
}

/// POST /v1/registrations/{id}/files/{group}: Attach a file, replacing the
/// group's previous one.
async fn attach_file(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    path: Result<Path<(u64, String)>, PathRejection>,
    body: Result<Json<AttachFileRequest>, JsonRejection>,
) -> Result<Json<RegistrationView>, AppError> {
    let (id, group) = extract_path(path)?;
    let req = extract_validated_json(body)?;
    let mut registration = load(&state, id)?;
    registration.require_capability(Capability::Control, &actor, &state.permissions)?;

    let replaced = registration.files_mut().attach(
        group.clone(),
        FileRef {
            id: req.id,
            name: req.name,
            url: req.url,
        },
    );
    state.registrations.save(&mut registration, false)?;

    tracing::debug!(
        registration_id = id,
        group = %group,
        replaced = ?replaced.map(|f| f.id),
        "file attached"
    );
    Ok(view(&state, &registration))
}

/// PUT /v1/registrations/{id}/metadata/{key}: Set one metadata value.
async fn set_metadata(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    path: Result<Path<(u64, String)>, PathRejection>,
    body: Result<Json<SetMetadataRequest>, JsonRejection>,
) -> Result<Json<MetadataStore>, AppError> {
    let (id, key) = extract_path(path)?;
    let req = extract_json(body)?;
    let mut registration = load(&state, id)?;
    registration.require_capability(Capability::Control, &actor, &state.permissions)?;

    registration.metadata_mut().set(key, req.value);
    state.registrations.save(&mut registration, false)?;

    Ok(Json(registration.metadata().clone()))
}

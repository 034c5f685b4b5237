use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::{ApiError, auth::MessageResponse};
use crate::{
    AppState,
    auth::VerifiedUser,
    gate::sections,
    models::{ClassRequest, ClassView, SubjectQuery, SubjectRequest, SubjectView},
};

#[tracing::instrument(name = "classes.list", skip_all)]
pub async fn list(
    State(state): State<AppState>,
    caller: VerifiedUser,
) -> Result<Json<Vec<ClassView>>, ApiError> {
    caller.require_any(sections::CLASSES)?;
    Ok(Json(state.services.classes.list().await?))
}

#[tracing::instrument(name = "classes.create", skip_all)]
pub async fn create(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Json(input): Json<ClassRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_any(sections::CLASSES)?;
    let record = input.validate_input().map_err(ApiError::Validation)?;
    let view = state.services.classes.create(record).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[tracing::instrument(name = "classes.get", skip(state, caller))]
pub async fn get(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassView>, ApiError> {
    caller.require_any(sections::CLASSES)?;
    Ok(Json(state.services.classes.get(id).await?))
}

#[tracing::instrument(name = "classes.update", skip(state, caller, input))]
pub async fn update(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ClassRequest>,
) -> Result<Json<ClassView>, ApiError> {
    caller.require_any(sections::CLASSES)?;
    let record = input.validate_input().map_err(ApiError::Validation)?;
    Ok(Json(state.services.classes.update(id, record).await?))
}

#[tracing::instrument(name = "classes.delete", skip(state, caller))]
pub async fn delete(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.require_any(sections::CLASSES)?;
    state.services.classes.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Class deleted",
    }))
}

// ============================================================================
// Subjects
// ============================================================================

#[tracing::instrument(name = "subjects.list", skip_all)]
pub async fn list_subjects(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Query(query): Query<SubjectQuery>,
) -> Result<Json<Vec<SubjectView>>, ApiError> {
    caller.require_any(sections::CLASSES)?;
    let class_id = query.class_id().map_err(ApiError::Validation)?;
    Ok(Json(state.services.classes.list_subjects(class_id).await?))
}

#[tracing::instrument(name = "subjects.create", skip_all)]
pub async fn create_subject(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Json(input): Json<SubjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_any(sections::CLASSES)?;
    let record = input.validate_create().map_err(ApiError::Validation)?;
    let view = state.services.classes.create_subject(record).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[tracing::instrument(name = "subjects.get", skip(state, caller))]
pub async fn get_subject(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SubjectView>, ApiError> {
    caller.require_any(sections::CLASSES)?;
    Ok(Json(state.services.classes.get_subject(id).await?))
}

#[tracing::instrument(name = "subjects.update", skip(state, caller, input))]
pub async fn update_subject(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<SubjectRequest>,
) -> Result<Json<SubjectView>, ApiError> {
    caller.require_any(sections::CLASSES)?;
    let patch = input.validate_patch().map_err(ApiError::Validation)?;
    Ok(Json(state.services.classes.update_subject(id, patch).await?))
}

#[tracing::instrument(name = "subjects.delete", skip(state, caller))]
pub async fn delete_subject(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.require_any(sections::CLASSES)?;
    state.services.classes.delete_subject(id).await?;
    Ok(Json(MessageResponse {
        message: "Subject deleted",
    }))
}

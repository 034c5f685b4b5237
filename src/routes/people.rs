//! Student and teacher directories and parent-to-child links.
//!
//! Staff (administrators and teachers) may read the directories; only
//! administrators change them.

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
    auth::{AuthError, VerifiedUser},
    gate::sections,
    models::{
        Page, PageQuery, ParentLinkRequest, Role, StudentQuery, StudentRequest, StudentView,
        TeacherRequest, TeacherView,
    },
};

const STAFF: &[Role] = sections::TEACHER;

#[tracing::instrument(name = "students.list", skip_all)]
pub async fn list_students(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Query(query): Query<StudentQuery>,
) -> Result<Json<Page<StudentView>>, ApiError> {
    caller.require_any(STAFF)?;
    Ok(Json(state.services.people.list_students(&query).await?))
}

#[tracing::instrument(name = "students.create", skip_all)]
pub async fn create_student(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Json(input): Json<StudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_any(sections::ADMIN)?;
    let view = state.services.people.create_student(input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[tracing::instrument(name = "students.get", skip(state, caller))]
pub async fn get_student(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<StudentView>, ApiError> {
    caller.require_any(STAFF)?;
    Ok(Json(state.services.people.get_student(id).await?))
}

#[tracing::instrument(name = "students.update", skip(state, caller, input))]
pub async fn update_student(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<StudentRequest>,
) -> Result<Json<StudentView>, ApiError> {
    caller.require_any(sections::ADMIN)?;
    Ok(Json(state.services.people.update_student(id, input).await?))
}

#[tracing::instrument(name = "students.delete", skip(state, caller))]
pub async fn delete_student(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.require_any(sections::ADMIN)?;
    state.services.people.delete_student(id).await?;
    Ok(Json(MessageResponse {
        message: "Student deleted",
    }))
}

#[tracing::instrument(name = "teachers.list", skip_all)]
pub async fn list_teachers(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<TeacherView>>, ApiError> {
    caller.require_any(STAFF)?;
    Ok(Json(state.services.people.list_teachers(&query).await?))
}

#[tracing::instrument(name = "teachers.create", skip_all)]
pub async fn create_teacher(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Json(input): Json<TeacherRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_any(sections::ADMIN)?;
    let view = state.services.people.create_teacher(input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[tracing::instrument(name = "teachers.get", skip(state, caller))]
pub async fn get_teacher(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TeacherView>, ApiError> {
    caller.require_any(STAFF)?;
    Ok(Json(state.services.people.get_teacher(id).await?))
}

#[tracing::instrument(name = "teachers.update", skip(state, caller, input))]
pub async fn update_teacher(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<TeacherRequest>,
) -> Result<Json<TeacherView>, ApiError> {
    caller.require_any(sections::ADMIN)?;
    Ok(Json(state.services.people.update_teacher(id, input).await?))
}

#[tracing::instrument(name = "teachers.delete", skip(state, caller))]
pub async fn delete_teacher(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.require_any(sections::ADMIN)?;
    state.services.people.delete_teacher(id).await?;
    Ok(Json(MessageResponse {
        message: "Teacher deleted",
    }))
}

// ============================================================================
// Parent links
// ============================================================================

/// Administrators, or the parent asking about themselves.
pub(super) fn require_parent_access(
    caller: &VerifiedUser,
    parent_id: Uuid,
) -> Result<(), AuthError> {
    caller.require_any(sections::PARENT)?;
    if caller.is_admin() || caller.user_id == parent_id {
        Ok(())
    } else {
        Err(AuthError::Forbidden(
            "You can only access your own family".to_string(),
        ))
    }
}

#[tracing::instrument(name = "parents.children", skip(state, caller))]
pub async fn children(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StudentView>>, ApiError> {
    require_parent_access(&caller, id)?;
    Ok(Json(state.services.people.children(id).await?))
}

#[tracing::instrument(name = "parents.link_child", skip(state, caller, input))]
pub async fn link_child(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ParentLinkRequest>,
) -> Result<Json<Vec<StudentView>>, ApiError> {
    caller.require_any(sections::ADMIN)?;
    let student_id = input.student_id().map_err(ApiError::Validation)?;
    Ok(Json(state.services.people.link_child(id, student_id).await?))
}

#[tracing::instrument(name = "parents.unlink_child", skip(state, caller))]
pub async fn unlink_child(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<StudentView>>, ApiError> {
    caller.require_any(sections::ADMIN)?;
    Ok(Json(state.services.people.unlink_child(id, student_id).await?))
}

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
    models::{
        AttendanceQuery, AttendanceSheetRequest, AttendanceStatus, AttendanceUpdateRequest,
        AttendanceView, present,
    },
};

#[tracing::instrument(name = "attendance.list", skip_all)]
pub async fn list(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<Vec<AttendanceView>>, ApiError> {
    caller.require_any(sections::ATTENDANCE)?;
    let (class_id, date) = query.validate_input().map_err(ApiError::Validation)?;
    Ok(Json(state.services.attendance.list(class_id, date).await?))
}

#[tracing::instrument(name = "attendance.record", skip_all, fields(user_id = %caller.user_id))]
pub async fn record(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Json(input): Json<AttendanceSheetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_any(sections::ATTENDANCE)?;
    let sheet = input.validate_input().map_err(ApiError::Validation)?;
    let views = state.services.attendance.record(sheet).await?;
    Ok((StatusCode::CREATED, Json(views)))
}

#[tracing::instrument(name = "attendance.get", skip(state, caller))]
pub async fn get(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AttendanceView>, ApiError> {
    caller.require_any(sections::ATTENDANCE)?;
    Ok(Json(state.services.attendance.get(id).await?))
}

#[tracing::instrument(name = "attendance.update", skip(state, caller, input))]
pub async fn update(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<AttendanceUpdateRequest>,
) -> Result<Json<AttendanceView>, ApiError> {
    caller.require_any(sections::ATTENDANCE)?;
    let status = present(input.status.as_deref())
        .ok_or_else(|| ApiError::Validation("status is required".to_string()))?
        .parse::<AttendanceStatus>()
        .map_err(ApiError::Validation)?;
    Ok(Json(state.services.attendance.update(id, status).await?))
}

#[tracing::instrument(name = "attendance.delete", skip(state, caller))]
pub async fn delete(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.require_any(sections::ATTENDANCE)?;
    state.services.attendance.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Attendance record deleted",
    }))
}

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::ApiError;
use crate::{
    AppState,
    auth::VerifiedUser,
    gate::sections,
    models::{PaymentQuery, PaymentRequest, PaymentUpdateRequest, PaymentView},
};

#[tracing::instrument(name = "payments.list", skip_all, fields(user_id = %caller.user_id))]
pub async fn list(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Query(query): Query<PaymentQuery>,
) -> Result<Json<Vec<PaymentView>>, ApiError> {
    caller.require_any(sections::PAYMENTS)?;
    let filter = query.validate_input().map_err(ApiError::Validation)?;
    let payments = state
        .services
        .payments
        .list(filter, caller.user_id, caller.role)
        .await?;
    Ok(Json(payments))
}

#[tracing::instrument(name = "payments.create", skip_all)]
pub async fn create(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Json(input): Json<PaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_any(sections::ADMIN)?;
    let record = input.validate_input().map_err(ApiError::Validation)?;
    let view = state.services.payments.create(record).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[tracing::instrument(name = "payments.update", skip(state, caller, input))]
pub async fn update(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
    Json(input): Json<PaymentUpdateRequest>,
) -> Result<Json<PaymentView>, ApiError> {
    caller.require_any(sections::PAYMENTS)?;
    let patch = input.validate_input().map_err(ApiError::Validation)?;
    let view = state
        .services
        .payments
        .update(id, patch, caller.user_id, caller.role)
        .await?;
    Ok(Json(view))
}

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::{ApiError, auth::MessageResponse};
use crate::{
    AppState,
    auth::VerifiedUser,
    gate::sections,
    models::{ConversationKey, MessageRequest, MessageView},
};

#[tracing::instrument(name = "messages.list", skip_all, fields(user_id = %caller.user_id))]
pub async fn list(
    State(state): State<AppState>,
    caller: VerifiedUser,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    caller.require_any(sections::EVERYONE)?;
    let messages = state.services.messages.list(caller.user_id, caller.role).await?;
    Ok(Json(messages))
}

#[tracing::instrument(name = "messages.send", skip_all, fields(user_id = %caller.user_id))]
pub async fn send(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Json(input): Json<MessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_any(sections::EVERYONE)?;
    let record = input
        .validate_input(caller.user_id)
        .map_err(ApiError::Validation)?;
    let view = state
        .services
        .messages
        .send(record, caller.user_id, caller.role)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[tracing::instrument(name = "messages.get", skip(state, caller))]
pub async fn get(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageView>, ApiError> {
    caller.require_any(sections::EVERYONE)?;
    Ok(Json(
        state
            .services
            .messages
            .get(id, caller.user_id, caller.role)
            .await?,
    ))
}

#[tracing::instrument(name = "messages.delete", skip(state, caller))]
pub async fn delete(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.require_any(sections::EVERYONE)?;
    state
        .services
        .messages
        .delete(id, caller.user_id, caller.role)
        .await?;
    Ok(Json(MessageResponse {
        message: "Message deleted",
    }))
}

/// `{id}` is the two participants' ids joined by `_`, in either order.
#[tracing::instrument(name = "messages.conversation", skip(state, caller))]
pub async fn conversation(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<MessageView>>, ApiError> {
    caller.require_any(sections::EVERYONE)?;
    let key = ConversationKey::parse(&id).map_err(ApiError::Validation)?;
    Ok(Json(
        state
            .services
            .messages
            .conversation(key, caller.user_id, caller.role)
            .await?,
    ))
}

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tower_cookies::Cookies;
use uuid::Uuid;

use super::{
    ApiError,
    auth::{MessageResponse, UserEnvelope},
    session::with_mirror,
};
use crate::{
    AppState,
    auth::{AuthError, VerifiedUser},
    models::{CreateUserRequest, Role, UpdateUserRequest, UserView},
    session::SessionUser,
};

/// Administrators may act on anyone; everyone else only on themselves.
fn require_admin_or_self(caller: &VerifiedUser, id: Uuid) -> Result<(), AuthError> {
    if caller.is_admin() || caller.user_id == id {
        Ok(())
    } else {
        Err(AuthError::Forbidden(
            "You can only access your own account".to_string(),
        ))
    }
}

#[tracing::instrument(name = "users.list", skip_all)]
pub async fn list(
    State(state): State<AppState>,
    caller: VerifiedUser,
) -> Result<Json<Vec<UserView>>, ApiError> {
    caller.require_any(&[Role::Admin])?;
    Ok(Json(state.services.users.list_views().await?))
}

#[tracing::instrument(name = "users.create", skip_all)]
pub async fn create(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Json(input): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    caller.require_any(&[Role::Admin])?;
    let validated = input
        .validate_input(state.services.users.password_min_length())
        .map_err(ApiError::Validation)?;
    let user = state.services.users.create(validated).await?;
    let view = state.services.users.view(&user).await;
    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "User account created",
            user: view,
        }),
    ))
}

#[tracing::instrument(name = "users.get", skip(state, caller))]
pub async fn get(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ApiError> {
    require_admin_or_self(&caller, id)?;
    Ok(Json(state.services.users.get_view(id).await?))
}

/// Updating your own account also rewrites the session mirror so the
/// dashboard shows the new name, email or avatar without a fresh login.
#[tracing::instrument(name = "users.update", skip(state, caller, cookies, input))]
pub async fn update(
    State(state): State<AppState>,
    caller: VerifiedUser,
    cookies: Cookies,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserRequest>,
) -> Result<Json<UserView>, ApiError> {
    require_admin_or_self(&caller, id)?;
    let view = state.services.users.update(id, input, caller.role).await?;
    if caller.user_id == id {
        let session = SessionUser::from_view(&view);
        with_mirror(&state, &cookies, |mirror| mirror.persist_user(&session));
    }
    Ok(Json(view))
}

#[tracing::instrument(name = "users.delete", skip(state, caller))]
pub async fn delete(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    caller.require_any(&[Role::Admin])?;
    state.services.users.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted",
    }))
}

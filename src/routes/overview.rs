use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use super::{ApiError, people::require_parent_access};
use crate::{
    AppState,
    auth::VerifiedUser,
    gate::sections,
    models::{AdminOverview, ParentOverview},
};

#[tracing::instrument(name = "overview.admin", skip_all)]
pub async fn admin(
    State(state): State<AppState>,
    caller: VerifiedUser,
) -> Result<Json<AdminOverview>, ApiError> {
    caller.require_any(sections::ADMIN)?;
    Ok(Json(state.services.overview.admin().await?))
}

#[tracing::instrument(name = "overview.parent", skip(state, caller))]
pub async fn parent(
    State(state): State<AppState>,
    caller: VerifiedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ParentOverview>, ApiError> {
    require_parent_access(&caller, id)?;
    Ok(Json(state.services.overview.parent(id).await?))
}

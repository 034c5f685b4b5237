//! Credential endpoints: register, login, logout, me.
//!
//! Login sets two cookies. The authoritative one carries the signed token
//! and is httpOnly; the advisory one is the session mirror the dashboard
//! reads for display.
//!
//! Register and login accept JSON or an HTML form post. A form post is
//! answered with a redirect instead of a JSON body.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookies, cookie::time::Duration as CookieDuration};

use super::{
    ApiError,
    extract::{BodyFormat, JsonOrForm},
    session::{end_session, safe_return_path, token_cookie, with_mirror},
};
use crate::{
    AppState,
    auth::VerifiedUser,
    models::{CreateUserRequest, UserView},
    session::SessionUser,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Where a form login lands afterwards; ignored unless same-site.
    #[serde(default)]
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: &'static str,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Send a failed form post back to its page with the error in the query.
fn form_failure(page: &str, err: &ApiError, from: Option<&str>) -> Response {
    let mut location = format!(
        "{}?error={}",
        page,
        urlencoding::encode(&err.public_message())
    );
    if let Some(from) = safe_return_path(from) {
        location.push_str("&from=");
        location.push_str(&urlencoding::encode(from));
    }
    Redirect::to(&location).into_response()
}

async fn create_account(
    state: &AppState,
    cookies: &Cookies,
    input: CreateUserRequest,
) -> Result<UserView, ApiError> {
    let validated = input
        .validate_input(state.services.users.password_min_length())
        .map_err(ApiError::Validation)?;
    let user = state.services.users.create(validated).await?;
    let view = state.services.users.view(&user).await;

    let session = SessionUser::from_view(&view);
    with_mirror(state, cookies, |mirror| mirror.persist_user(&session));
    Ok(view)
}

#[tracing::instrument(name = "auth.register", skip_all)]
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonOrForm { input, format }: JsonOrForm<CreateUserRequest>,
) -> Response {
    let result = create_account(&state, &cookies, input).await;
    match (result, format) {
        (Ok(view), BodyFormat::Json) => (
            StatusCode::CREATED,
            Json(UserEnvelope {
                message: "User registered successfully",
                user: view,
            }),
        )
            .into_response(),
        (Ok(_), BodyFormat::Form) => Redirect::to("/login").into_response(),
        (Err(err), BodyFormat::Json) => err.into_response(),
        (Err(err), BodyFormat::Form) => form_failure("/register", &err, None),
    }
}

async fn sign_in(
    state: &AppState,
    cookies: &Cookies,
    input: LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (Some(email), Some(password)) = (input.email, input.password) else {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    let user = state.services.users.authenticate(&email, &password).await?;
    let (token, claims) = state.tokens.issue(&user)?;
    let view = state.services.users.view(&user).await;

    cookies.add(token_cookie(
        &state.config.auth.token_cookie,
        token.clone(),
        CookieDuration::seconds(state.tokens.ttl_secs()),
    ));
    let session = SessionUser::from_view(&view);
    with_mirror(state, cookies, |mirror| mirror.persist_user(&session));

    tracing::info!(user_id = %user.id, role = %claims.role, "Login successful");
    Ok(LoginResponse {
        message: "Login successful",
        token,
        user: view,
    })
}

#[tracing::instrument(name = "auth.login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    JsonOrForm { input, format }: JsonOrForm<LoginRequest>,
) -> Response {
    let from = input.from.clone();
    match (sign_in(&state, &cookies, input).await, format) {
        (Ok(body), BodyFormat::Json) => Json(body).into_response(),
        (Ok(body), BodyFormat::Form) => {
            let landing = safe_return_path(from.as_deref())
                .or_else(|| state.gate.home_for(body.user.role))
                .unwrap_or("/dashboard");
            Redirect::to(landing).into_response()
        }
        (Err(err), BodyFormat::Json) => err.into_response(),
        (Err(err), BodyFormat::Form) => form_failure("/login", &err, from.as_deref()),
    }
}

#[tracing::instrument(name = "auth.logout", skip_all)]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Json<MessageResponse> {
    end_session(&state, &cookies);
    Json(MessageResponse {
        message: "Logout successful",
    })
}

#[tracing::instrument(name = "auth.me", skip_all, fields(user_id = %caller.user_id))]
pub async fn me(
    State(state): State<AppState>,
    caller: VerifiedUser,
) -> Result<Json<UserView>, ApiError> {
    Ok(Json(state.services.users.get_view(caller.user_id).await?))
}

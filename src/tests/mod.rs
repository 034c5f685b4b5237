//! Router-level tests driving the full app through `oneshot`.

mod auth_flow;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    AppState, build_app,
    models::{Role, ValidatedUser},
    test_support::test_state,
};

pub(crate) const PASSWORD: &str = "correct-horse";

/// App state over fresh in-memory repositories plus the directory backing
/// its avatar store.
pub(crate) struct TestApp {
    pub state: AppState,
    _dir: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        Self { state, _dir: dir }
    }

    pub fn router(&self) -> Router {
        build_app(&self.state.config, self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn seed(&self, email: &str, role: Role) -> Uuid {
        self.state
            .services
            .users
            .create(ValidatedUser {
                name: "Seeded".into(),
                email: email.into(),
                password: PASSWORD.into(),
                role,
                phone: None,
                gender: None,
            })
            .await
            .unwrap()
            .id
    }

    /// Log in over JSON and return a `Cookie` header value carrying only
    /// the token.
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/api/auth/login",
                json!({"email": email, "password": PASSWORD}),
                None,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let token = cookie_value(&response, "token").unwrap();
        format!("token={}", token)
    }

    /// Seed an account of `role` and log it in.
    pub async fn signed_in(&self, email: &str, role: Role) -> (Uuid, String) {
        let id = self.seed(email, role).await;
        (id, self.login(email).await)
    }
}

pub(crate) async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub(crate) async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub(crate) fn json_request(
    method: &str,
    uri: &str,
    body: Value,
    cookie: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub(crate) fn form_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub(crate) fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    bare_request("GET", uri, cookie)
}

pub(crate) fn bare_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `(name, value, raw header)` for every `Set-Cookie` header.
pub(crate) fn set_cookies(response: &Response) -> Vec<(String, String, String)> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| {
            let cookie = tower_cookies::Cookie::parse(raw.to_string()).ok()?;
            Some((
                cookie.name().to_string(),
                cookie.value().to_string(),
                raw.to_string(),
            ))
        })
        .collect()
}

pub(crate) fn cookie_value(response: &Response, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|(n, _, _)| n == name)
        .map(|(_, value, _)| value)
}

pub(crate) fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

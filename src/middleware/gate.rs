use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, auth::cookie_value, gate::GateDecision};

/// Route requests through the [`Gate`](crate::gate::Gate).
///
/// Reads the authoritative cookie without verifying it, so the outcome is a
/// routing decision only. Redirects are `307`; everything else is forwarded
/// untouched.
pub async fn gate_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if !state.gate.applies_to(path) {
        return next.run(req).await;
    }

    let token = cookie_value(req.headers(), &state.config.auth.token_cookie.name);
    let decision = state.gate.evaluate(path, token.as_deref());
    tracing::debug!(
        path = %path,
        has_token = token.is_some(),
        decision = decision.as_str(),
        location = decision.location().unwrap_or_default(),
        "Gate decision"
    );

    match decision {
        GateDecision::Allow => next.run(req).await,
        GateDecision::RedirectToLogin { location, .. }
        | GateDecision::RedirectToHome { location }
        | GateDecision::Unauthorized { location } => {
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        middleware::from_fn_with_state,
        routing::get,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{gate::unsigned_token, test_support::test_state};

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/login", get(|| async { "login" }))
            .route("/dashboard/{*rest}", get(|| async { "dashboard" }))
            .route("/dashboards", get(|| async { "lookalike" }))
            .layer(from_fn_with_state(state.clone(), gate_middleware))
            .with_state(state)
    }

    async fn send(app: Router, path: &str, token: Option<&str>) -> Response {
        let mut request = Request::builder().uri(path);
        if let Some(token) = token {
            request = request.header(header::COOKIE, format!("token={}", token));
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_anonymous_protected_request_redirects_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(app(test_state(&dir)), "/dashboard/admin", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login?from=%2Fdashboard%2Fadmin");
    }

    #[tokio::test]
    async fn test_student_on_admin_section_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let token = unsigned_token(&json!({"role": "student"}));
        let response = send(app(test_state(&dir)), "/dashboard/admin/users", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/unauthorized");
    }

    #[tokio::test]
    async fn test_allowed_request_is_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let token = unsigned_token(&json!({"role": "TEACHER"}));
        let response = send(app(test_state(&dir)), "/dashboard/classes", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_signed_in_visitor_leaves_login_page() {
        let dir = tempfile::tempdir().unwrap();
        let token = unsigned_token(&json!({"role": "parent"}));
        let response = send(app(test_state(&dir)), "/login", Some(&token)).await;
        assert_eq!(location(&response), "/dashboard/parent");

        let response = send(app(test_state(&dir)), "/login", Some("garbage")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_paths_outside_namespace_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let response = send(app(test_state(&dir)), "/dashboards", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

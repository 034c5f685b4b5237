use std::sync::Arc;

use axum::http::{StatusCode, header};
use serde_json::json;

use super::*;
use crate::session::{SessionChange, decode};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.send(get_request("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_register_validates_and_conflicts() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/register",
            json!({"name": "Ada", "email": "ada@school.io"}),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Name, email and password are required");
    assert!(body["error"]["request_id"].is_string());

    let register = json!({"name": "Ada", "email": "Ada@School.io", "password": PASSWORD});
    let response = app
        .send(json_request("POST", "/api/auth/register", register.clone(), None))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let mirrored = cookie_value(&response, "sessionUser").unwrap();
    assert_eq!(decode(&mirrored).unwrap().email, "ada@school.io");
    let body = body_json(response).await;
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["role"], "STUDENT");
    assert!(body["user"].get("password_hash").is_none());

    let response = app
        .send(json_request("POST", "/api/auth/register", register, None))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_sets_both_cookies_and_notifies() {
    let app = TestApp::new();
    app.seed("teacher@school.io", Role::Teacher).await;

    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = seen.clone();
    app.state
        .observers
        .subscribe(move |change| sink.lock().push(change.clone()));

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "teacher@school.io", "password": PASSWORD}),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    let (_, token, raw_token) = cookies.iter().find(|(n, _, _)| n == "token").unwrap();
    assert!(raw_token.contains("HttpOnly"));
    assert!(raw_token.contains("Path=/"));
    assert!(raw_token.contains("Max-Age=604800"));
    let (_, mirror, raw_mirror) = cookies.iter().find(|(n, _, _)| n == "sessionUser").unwrap();
    assert!(!raw_mirror.contains("HttpOnly"));
    assert_eq!(decode(mirror).unwrap().role, "TEACHER");

    let body = body_json(response).await;
    assert_eq!(body["message"], "Login successful");
    assert_eq!(&body["token"], token.as_str());
    assert_eq!(body["user"]["avatarUrl"], "");

    assert!(matches!(seen.lock().as_slice(), [SessionChange::Persisted(u)] if u.role == "TEACHER"));
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new();
    app.seed("ada@school.io", Role::Student).await;

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "nobody@school.io", "password": "x"}),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["message"], "User not found");

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "ada@school.io", "password": "wrong-password"}),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"]["message"], "Invalid password");
}

#[tokio::test]
async fn test_form_login_returns_to_requested_page() {
    let app = TestApp::new();
    app.seed("teacher@school.io", Role::Teacher).await;

    let response = app
        .send(form_request(
            "/api/auth/login",
            &[
                ("email", "teacher@school.io"),
                ("password", PASSWORD),
                ("from", "/dashboard/attendance"),
            ],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard/attendance");
    assert!(cookie_value(&response, "token").is_some_and(|t| !t.is_empty()));
    let mirror = cookie_value(&response, "sessionUser").unwrap();
    assert_eq!(decode(&mirror).unwrap().role, "TEACHER");
}

#[tokio::test]
async fn test_form_login_ignores_offsite_return_path() {
    let app = TestApp::new();
    app.seed("teacher@school.io", Role::Teacher).await;

    let response = app
        .send(form_request(
            "/api/auth/login",
            &[
                ("email", "teacher@school.io"),
                ("password", PASSWORD),
                ("from", "//evil.example/phish"),
            ],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let landing = location(&response);
    assert!(landing.starts_with("/dashboard"), "landed on {landing}");
    assert!(!landing.contains("evil"));
}

#[tokio::test]
async fn test_form_login_failure_goes_back_to_login_page() {
    let app = TestApp::new();
    app.seed("ada@school.io", Role::Student).await;

    let response = app
        .send(form_request(
            "/api/auth/login",
            &[
                ("email", "ada@school.io"),
                ("password", "wrong-password"),
                ("from", "/dashboard/messages"),
            ],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/login?error=Invalid%20password&from=%2Fdashboard%2Fmessages"
    );
    assert!(cookie_value(&response, "token").is_none());

    let page = app.send(get_request(location(&response), None)).await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_text(page).await.contains("Invalid password"));
}

#[tokio::test]
async fn test_form_register_redirects_to_login() {
    let app = TestApp::new();

    let response = app
        .send(form_request(
            "/api/auth/register",
            &[
                ("name", "Ada"),
                ("email", "ada@school.io"),
                ("password", PASSWORD),
            ],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert!(app.state.services.users.count().await.unwrap() == 1);

    let response = app
        .send(form_request(
            "/api/auth/register",
            &[("name", "Ada"), ("email", "ada@school.io")],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/register?error="));
}

#[tokio::test]
async fn test_logout_expires_both_cookies() {
    let app = TestApp::new();
    let response = app
        .send(json_request("POST", "/api/auth/logout", json!({}), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    for name in ["token", "sessionUser"] {
        let (_, value, raw) = cookies.iter().find(|(n, _, _)| n == name).unwrap();
        assert!(value.is_empty());
        assert!(raw.contains("Max-Age=0"));
    }
    assert_eq!(body_json(response).await["message"], "Logout successful");
}

#[tokio::test]
async fn test_logout_page_clears_session_and_redirects() {
    let app = TestApp::new();
    let (_, cookie) = app.signed_in("parent@school.io", Role::Parent).await;

    let response = app.send(get_request("/logout", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let cookies = set_cookies(&response);
    for name in ["token", "sessionUser"] {
        let (_, value, raw) = cookies.iter().find(|(n, _, _)| n == name).unwrap();
        assert!(value.is_empty());
        assert!(raw.contains("Max-Age=0"));
    }
}

#[tokio::test]
async fn test_forged_token_passes_gate_but_not_api() {
    let app = TestApp::new();
    let forged = format!(
        "token={}",
        crate::gate::unsigned_token(&json!({"id": Uuid::new_v4(), "role": "ADMIN"}))
    );

    let page = app.send(get_request("/dashboard/admin", Some(&forged))).await;
    assert_eq!(page.status(), StatusCode::OK);

    let api = app.send(get_request("/api/users", Some(&forged))).await;
    assert_eq!(api.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_admin_flow() {
    let app = TestApp::new();
    let (_, admin) = app.signed_in("admin@school.io", Role::Admin).await;
    let (student_id, student) = app.signed_in("student@school.io", Role::Student).await;

    let response = app.send(get_request("/api/users", Some(&student))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(json_request(
            "POST",
            "/api/users",
            json!({"name": "Tess", "email": "tess@school.io", "password": "short", "role": "TEACHER"}),
            Some(&admin),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(json_request(
            "POST",
            "/api/users",
            json!({"name": "Tess", "email": "tess@school.io", "password": "long-enough", "role": "teacher"}),
            Some(&admin),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["message"], "User account created");

    let response = app.send(get_request("/api/users", Some(&admin))).await;
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 3);
    assert_eq!(listed[0]["email"], "tess@school.io");

    let uri = format!("/api/users/{}", student_id);
    let response = app
        .send(json_request(
            "PUT",
            &uri,
            json!({"avatarUrl": "https://img.example/s.png", "role": "ADMIN"}),
            Some(&student),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(json_request(
            "PUT",
            &uri,
            json!({"avatarUrl": "https://img.example/s.png"}),
            Some(&student),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["avatarUrl"], "https://img.example/s.png");

    let response = app.send(bare_request("DELETE", &uri, Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "User deleted");
    assert_eq!(app.state.services.avatars.get(&student_id.to_string()).await, "");

    let response = app.send(get_request(&uri, Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_self_update_rewrites_session_mirror() {
    let app = TestApp::new();
    let (id, cookie) = app.signed_in("ada@school.io", Role::Student).await;

    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/users/{}", id),
            json!({"name": "Ada Lovelace", "avatarUrl": "https://img.example/ada.png", "role": "STUDENT"}),
            Some(&cookie),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let mirror = cookie_value(&response, "sessionUser").expect("mirror rewritten");
    let session = decode(&mirror).unwrap();
    assert_eq!(session.name, "Ada Lovelace");
    assert_eq!(session.avatar_url, "https://img.example/ada.png");
    assert_eq!(session.role, "STUDENT");
}

#[tokio::test]
async fn test_admin_editing_someone_else_leaves_own_mirror_alone() {
    let app = TestApp::new();
    let (_, admin) = app.signed_in("admin@school.io", Role::Admin).await;
    let other = app.seed("ada@school.io", Role::Student).await;

    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/users/{}", other),
            json!({"name": "Renamed"}),
            Some(&admin),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(cookie_value(&response, "sessionUser").is_none());
}

#[tokio::test]
async fn test_self_access_only() {
    let app = TestApp::new();
    let (own, cookie) = app.signed_in("one@school.io", Role::Parent).await;
    let other = app.seed("two@school.io", Role::Parent).await;

    let response = app
        .send(get_request(&format!("/api/users/{}", own), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(get_request(&format!("/api/users/{}", other), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(get_request("/api/auth/me", Some(&cookie))).await;
    assert_eq!(body_json(response).await["email"], "one@school.io");
}

#[tokio::test]
async fn test_dashboard_renders_menu_from_mirror() {
    let app = TestApp::new();
    app.seed("parent@school.io", Role::Parent).await;

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            json!({"email": "parent@school.io", "password": PASSWORD}),
            None,
        ))
        .await;
    let cookie_header = set_cookies(&response)
        .into_iter()
        .map(|(name, value, _)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ");

    let response = app
        .send(get_request("/dashboard/parent", Some(&cookie_header)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Signed in as Seeded (PARENT)"));
    assert!(html.contains("Parent Portal"));
}

#[tokio::test]
async fn test_gate_redirect_keeps_security_headers() {
    let app = TestApp::new();
    let response = app.send(get_request("/dashboard/payments", None)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "/login?from=%2Fdashboard%2Fpayments"
    );
    assert!(response.headers().contains_key(header::X_FRAME_OPTIONS));
}

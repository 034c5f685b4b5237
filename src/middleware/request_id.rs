//! Request correlation ids.
//!
//! Every request runs inside a span carrying its id; JSON error envelopes
//! get the id copied into `error.request_id`.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};
use http_body_util::BodyExt;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound id that is propagated; longer ones are replaced.
const MAX_INBOUND_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuse the caller's id when it is short and printable.
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_INBOUND_ID_LEN)
            .map(|id| Self(id.to_string()))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(req.headers());
    req.extensions_mut().insert(request_id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let response = next.run(req).instrument(span).await;
    let mut response = tag_error_body(response, &request_id).await;
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn tag_error_body(response: Response, request_id: &RequestId) -> Response {
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if !is_json {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer error body");
            parts.headers.remove(axum::http::header::CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let Ok(mut json) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    let Some(error) = json.get_mut("error").and_then(|e| e.as_object_mut()) else {
        return Response::from_parts(parts, Body::from(bytes));
    };
    error.insert(
        "request_id".to_string(),
        serde_json::Value::String(request_id.0.clone()),
    );

    match serde_json::to_vec(&json) {
        Ok(tagged) => {
            parts.headers.remove(axum::http::header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(tagged))
        }
        Err(_) => Response::from_parts(parts, Body::from(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, StatusCode};

    use super::*;

    fn json_response(status: StatusCode, body: serde_json::Value) -> Response {
        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_inbound_id_is_reused_when_sane() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(RequestId::from_headers(&headers).as_str(), "abc-123");

        let mut headers = HeaderMap::new();
        let long = "x".repeat(MAX_INBOUND_ID_LEN + 1);
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&long).unwrap());
        assert_ne!(RequestId::from_headers(&headers).as_str(), long);

        assert_ne!(
            RequestId::from_headers(&HeaderMap::new()),
            RequestId::from_headers(&HeaderMap::new())
        );
    }

    #[tokio::test]
    async fn test_error_envelope_gets_request_id() {
        let id = RequestId("req-1".into());
        let response = json_response(
            StatusCode::FORBIDDEN,
            serde_json::json!({"error": {"type": "permission_error", "message": "no"}}),
        );
        let tagged = tag_error_body(response, &id).await;
        assert_eq!(tagged.status(), StatusCode::FORBIDDEN);
        let json = body_json(tagged).await;
        assert_eq!(json["error"]["request_id"], "req-1");
        assert_eq!(json["error"]["message"], "no");
    }

    #[tokio::test]
    async fn test_success_and_plain_bodies_untouched() {
        let id = RequestId("req-1".into());
        let ok = tag_error_body(
            json_response(StatusCode::OK, serde_json::json!({"message": "ok"})),
            &id,
        )
        .await;
        assert!(body_json(ok).await.get("request_id").is_none());

        let text = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(CONTENT_TYPE, "text/html")
            .body(Body::from("<h1>missing</h1>"))
            .unwrap();
        let text = tag_error_body(text, &id).await;
        let bytes = text.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.as_ref(), b"<h1>missing</h1>");
    }
}

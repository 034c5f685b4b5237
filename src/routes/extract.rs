use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

/// How the client sent its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Form,
}

/// A body accepted either as JSON or as an HTML form post.
///
/// `application/x-www-form-urlencoded` goes through [`Form`]; anything else
/// is handed to [`Json`], which keeps its content-type and syntax checks.
#[derive(Debug, Clone)]
pub struct JsonOrForm<T> {
    pub input: T,
    pub format: BodyFormat,
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
}

impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(input) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self {
                input,
                format: BodyFormat::Form,
            })
        } else {
            let Json(input) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self {
                input,
                format: BodyFormat::Json,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Credentials {
        email: String,
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_branches_on_content_type() {
        let form = JsonOrForm::<Credentials>::from_request(
            request("application/x-www-form-urlencoded; charset=UTF-8", "email=a%40b.io"),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(form.format, BodyFormat::Form);
        assert_eq!(form.input.email, "a@b.io");

        let json = JsonOrForm::<Credentials>::from_request(
            request("application/json", r#"{"email":"c@d.io"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(json.format, BodyFormat::Json);
        assert_eq!(json.input.email, "c@d.io");
    }

    #[tokio::test]
    async fn test_other_types_still_rejected() {
        let rejection = JsonOrForm::<Credentials>::from_request(request("text/plain", "email"), &())
            .await
            .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}

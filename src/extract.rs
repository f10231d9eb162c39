use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// How the request body was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
}

/// A request body accepted either as JSON or as `application/x-www-form-urlencoded`.
///
/// Form values arrive as strings; `BodyKind` lets handlers parse numeric fields
/// accordingly. Any decoding failure is a 422.
#[derive(Debug)]
pub struct JsonOrForm<T>(pub T, pub BodyKind);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| {
            ct.trim_start()
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        })
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(body) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            Ok(Self(body, BodyKind::Form))
        } else {
            let Json(body) = Json::<T>::from_request(req, state).await?;
            Ok(Self(body, BodyKind::Json))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Pantry {
        item: Option<String>,
        count: Option<serde_json::Value>,
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn decodes_json() {
        let req = request("application/json", r#"{"item":"flour","count":2}"#);
        let JsonOrForm(p, kind) = JsonOrForm::<Pantry>::from_request(req, &()).await.unwrap();
        assert_eq!(kind, BodyKind::Json);
        assert_eq!(p.item.as_deref(), Some("flour"));
        assert_eq!(p.count, Some(serde_json::json!(2)));
    }

    #[tokio::test]
    async fn decodes_form_values_as_strings() {
        let req = request(
            "application/x-www-form-urlencoded; charset=utf-8",
            "item=brown+sugar&count=2",
        );
        let JsonOrForm(p, kind) = JsonOrForm::<Pantry>::from_request(req, &()).await.unwrap();
        assert_eq!(kind, BodyKind::Form);
        assert_eq!(p.item.as_deref(), Some("brown sugar"));
        assert_eq!(p.count, Some(serde_json::json!("2")));
    }

    #[tokio::test]
    async fn bad_json_is_a_validation_error() {
        let req = request("application/json", "{oops");
        let err = JsonOrForm::<Pantry>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_content_type_is_a_validation_error() {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from("item=flour"))
            .unwrap();
        let err = JsonOrForm::<Pantry>::from_request(req, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

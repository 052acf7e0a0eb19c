//! Request extractors whose rejections use the same `{"error": ...}` body as `AppError`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Rejection))]
pub(crate) struct Json<T>(pub(crate) T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Rejection))]
pub(crate) struct Query<T>(pub(crate) T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Rejection))]
pub(crate) struct Path<T>(pub(crate) T);

/// A malformed body, query string or path segment.
#[derive(Debug)]
pub(crate) struct Rejection {
    status: StatusCode,
    message: String,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        debug!(status = %self.status, message = %self.message, "request rejected");
        (self.status, axum::Json(json!({ "error": self.message }))).into_response()
    }
}

macro_rules! rejection_from {
    ($($source:ty),+) => {
        $(
            impl From<$source> for Rejection {
                fn from(rejection: $source) -> Self {
                    Self {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

rejection_from!(JsonRejection, QueryRejection, PathRejection);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Echo {
        quantity: u32,
    }

    #[derive(Deserialize)]
    struct Paging {
        page: u32,
    }

    async fn echo(
        Path(id): Path<u64>,
        Query(paging): Query<Paging>,
        Json(body): Json<Echo>,
    ) -> Json<Value> {
        Json(json!({ "id": id, "page": paging.page, "quantity": body.quantity }))
    }

    async fn call(uri: &str, body: &str) -> (StatusCode, Value) {
        let router = Router::new().route("/items/:id", post(echo));
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds");
        let response = router.oneshot(request).await.expect("route executes");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn well_formed_requests_pass_through() {
        let (status, body) = call("/items/4?page=2", r#"{"quantity": 3}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 4);
        assert_eq!(body["page"], 2);
        assert_eq!(body["quantity"], 3);
    }

    #[tokio::test]
    async fn malformed_parts_answer_with_an_error_body() {
        let (status, body) = call("/items/4?page=2", r#"{"quantity": -1}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());

        let (status, body) = call("/items/4?page=2", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = call("/items/4?page=two", r#"{"quantity": 3}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = call("/items/four?page=2", r#"{"quantity": 3}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}

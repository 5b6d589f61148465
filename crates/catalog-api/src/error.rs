//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::render::{html_escape, html_response, Page};

/// Error returned by JSON handlers.
#[derive(Debug)]
pub enum ApiError {
    Database(catalog_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<catalog_core::Error> for ApiError {
    fn from(err: catalog_core::Error) -> Self {
        use catalog_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            e @ (Error::CategoryNotFound(_) | Error::ProductNotFound(_)) => {
                ApiError::NotFound(e.to_string())
            }
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            e @ Error::Conflict(_) => ApiError::Conflict(e.to_string()),
            e @ Error::CycleDetected { .. } => ApiError::Conflict(e.to_string()),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Database(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn message(self) -> String {
        match self {
            ApiError::Database(err) => {
                error!(subsystem = "api", error = %err, "Request failed");
                "Internal server error".to_string()
            }
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "error": self.message(),
        }));

        (status, body).into_response()
    }
}

/// Error returned by HTML page handlers.
#[derive(Debug)]
pub struct PageError(pub ApiError);

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        PageError(err)
    }
}

impl From<catalog_core::Error> for PageError {
    fn from(err: catalog_core::Error) -> Self {
        PageError(err.into())
    }
}

impl PageError {
    pub fn not_found() -> Self {
        PageError(ApiError::NotFound("Not Found".to_string()))
    }
}

/// Error page body for `status`.
pub fn error_page(status: StatusCode, message: &str) -> Page {
    let title = status.canonical_reason().unwrap_or("Error");
    Page::new(
        title,
        format!(
            "<h1>{}</h1>\n<p>{}</p>",
            html_escape(title),
            html_escape(message)
        ),
    )
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        let message = self.0.message();
        // The full document also carries `<main>`, so a boosted swap still works.
        html_response(status, error_page(status, &message).document())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::Error;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
            (Error::CategoryNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (Error::ProductNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (Error::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (Error::Conflict("x".into()), StatusCode::CONFLICT),
            (
                Error::CycleDetected {
                    id: Uuid::nil(),
                    depth: 65,
                },
                StatusCode::CONFLICT,
            ),
            (Error::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (Error::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let response = ApiError::from(Error::Internal("secret".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_page_error_is_html() {
        let response = PageError::not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()["content-type"],
            "text/html; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_page_error_keeps_swap_target() {
        let response = PageError::from(Error::ProductNotFound(Uuid::nil())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("<main>\n<h1>Not Found</h1>"));
    }
}

use crate::routes::constants::ERROR_SOMETHING_WENT_WRONG;
use crate::store::BlogError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// HTTP-facing wrapper around the store's failure taxonomy.
///
/// Every error response uses the same envelope:
/// `{"success": false, "error": {"message": "..."}}`.
#[derive(Debug)]
pub struct ApiError(BlogError);

impl From<BlogError> for ApiError {
    fn from(e: BlogError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(BlogError::validation(message))
    }
}

pub fn error_body(message: &str) -> serde_json::Value {
    json!({
        "success": false,
        "error": { "message": message }
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            BlogError::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            BlogError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            BlogError::Conflict(message) => (StatusCode::CONFLICT, message.clone()),
            BlogError::Store(_) => {
                tracing::error!(error.cause_chain = ?self.0, "A store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ERROR_SOMETHING_WENT_WRONG.to_string(),
                )
            }
        };
        (status, Json(error_body(&message))).into_response()
    }
}

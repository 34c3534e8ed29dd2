//! Error kinds for store operations and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Expected, locally handled failures of a store operation.
/// Neither variant leaves any side effect behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("invalid payload")]
    Validation,
    #[error("not found")]
    NotFound,
}

/// Handler-level error, rendered as `{"error": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Body is not a JSON object, or a field has the wrong type.
    #[error("invalid payload")]
    InvalidPayload,
    /// Non-numeric `:id` segment (strict mode only).
    #[error("invalid id")]
    InvalidId,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Validation)
            | ApiError::InvalidPayload
            | ApiError::InvalidId => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(StoreError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::Validation).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidPayload.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidId.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_messages_match_wire_format() {
        assert_eq!(ApiError::from(StoreError::NotFound).to_string(), "not found");
        assert_eq!(
            ApiError::from(StoreError::Validation).to_string(),
            "invalid payload"
        );
        assert_eq!(ApiError::InvalidPayload.to_string(), "invalid payload");
    }

    #[test]
    fn test_response_is_json() {
        let resp = ApiError::from(StoreError::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/json"
        );
    }
}

//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors an API handler can return, each with its status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No entity matches the requested domain and object id.
    #[error("no {domain} entity with object id {object_id}")]
    EntityNotFound { domain: String, object_id: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::EntityNotFound { .. } => StatusCode::NOT_FOUND,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_describe_missing_entity() {
        let err = ApiError::EntityNotFound {
            domain: "switch".to_string(),
            object_id: "relay".to_string(),
        };
        assert_eq!(err.to_string(), "no switch entity with object id relay");
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::shopping::RenderError;

/// Request-boundary error taxonomy. Every variant maps to one status code;
/// internal failures are logged and the body stays opaque.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication credentials were not provided or are invalid")]
    Unauthenticated,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{message}")]
    ValidationFailed {
        field: &'static str,
        message: String,
    },
    #[error("{0} already exists")]
    Conflict(&'static str),
    #[error("you do not have permission to perform this action")]
    PermissionDenied,
    #[error("internal server error")]
    Internal(color_eyre::Report),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field,
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(report) = &self {
            tracing::error!(error = ?report, "Internal error while handling request");
        }

        let body = match &self {
            Self::ValidationFailed { field, message } => {
                let mut map = serde_json::Map::new();
                map.insert((*field).to_string(), json!([message]));
                serde_json::Value::Object(map)
            }
            other => json!({ "detail": other.to_string() }),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<color_eyre::Report> for ApiError {
    fn from(report: color_eyre::Report) -> Self {
        Self::Internal(report)
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::EmptyDocument => {
                Self::validation("shopping_cart", err.to_string())
            }
            other => Self::Internal(color_eyre::Report::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_taxonomy() {
        assert_eq!(
            ApiError::Unauthenticated.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::NotFound("recipe").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::validation("name", "required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict("favorite").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::PermissionDenied.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn empty_document_maps_to_validation() {
        let err = ApiError::from(RenderError::EmptyDocument);

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

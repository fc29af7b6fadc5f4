//! HTTP error responses for the tree API.
//!
//! Every failure is returned as JSON `{message, code, details?}`; the status
//! code is derived from `code`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use log::{error, warn};
use nodetree_core::TreeServiceError;
use serde::{Deserialize, Serialize};

pub const CODE_NODE_NOT_FOUND: &str = "NODE_NOT_FOUND";
pub const CODE_ROUTE_NOT_FOUND: &str = "ROUTE_NOT_FOUND";
pub const CODE_INVALID_INPUT: &str = "INVALID_INPUT";
pub const CODE_INVALID_OPERATION: &str = "INVALID_OPERATION";
pub const CODE_VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const CODE_DATABASE_ERROR: &str = "DATABASE_ERROR";
pub const CODE_INTERNAL_ERROR: &str = "INTERNAL_ERROR";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message, CODE_INTERNAL_ERROR)
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            CODE_NODE_NOT_FOUND | CODE_ROUTE_NOT_FOUND => StatusCode::NOT_FOUND,
            CODE_INVALID_INPUT | CODE_INVALID_OPERATION | CODE_VALIDATION_ERROR => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_error module=server status=error code={} error={}",
                self.code, self.message
            );
        } else {
            warn!(
                "event=http_error module=server status=rejected code={} error={}",
                self.code, self.message
            );
        }

        (status, Json(self)).into_response()
    }
}

impl From<TreeServiceError> for HttpError {
    fn from(err: TreeServiceError) -> Self {
        if err.is_not_found() {
            return HttpError::new(err.to_string(), CODE_NODE_NOT_FOUND);
        }
        if err.is_validation() {
            let code = match err {
                TreeServiceError::InvalidTitle => CODE_VALIDATION_ERROR,
                _ => CODE_INVALID_OPERATION,
            };
            return HttpError::new(err.to_string(), code);
        }
        match &err {
            TreeServiceError::Repo(inner) => {
                HttpError::with_details(err.to_string(), CODE_DATABASE_ERROR, format!("{inner:?}"))
            }
            _ => HttpError::internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::with_details(
            "invalid request body",
            CODE_INVALID_INPUT,
            rejection.body_text(),
        )
    }
}

impl From<PathRejection> for HttpError {
    fn from(rejection: PathRejection) -> Self {
        HttpError::with_details("invalid node id", CODE_INVALID_INPUT, rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodetree_core::{RootOperation, TreeServiceError};

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases = [
            (TreeServiceError::NodeNotFound(5), StatusCode::NOT_FOUND),
            (TreeServiceError::ParentNotFound(5), StatusCode::NOT_FOUND),
            (
                TreeServiceError::RootProtected(RootOperation::Delete),
                StatusCode::BAD_REQUEST,
            ),
            (
                TreeServiceError::CycleDetected {
                    node_id: 2,
                    parent_id: 3,
                },
                StatusCode::BAD_REQUEST,
            ),
            (TreeServiceError::InvalidTitle, StatusCode::BAD_REQUEST),
            (TreeServiceError::OrderingExhausted(1), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            assert_eq!(HttpError::from(err).status(), expected);
        }
    }

    #[test]
    fn unknown_codes_are_internal_errors() {
        assert_eq!(
            HttpError::internal("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            HttpError::new("x", CODE_DATABASE_ERROR).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

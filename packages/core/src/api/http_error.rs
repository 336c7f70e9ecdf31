//! HTTP error handling for the chain API
//!
//! Consistent `{message, code, details}` error bodies with status codes derived
//! from the machine-readable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

use crate::operations::ChainOperationError;
use crate::services::ChainServiceError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
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

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "ENTITY_NOT_FOUND" => StatusCode::NOT_FOUND,
            "INVALID_TARGET_INDEX" | "PARENT_MISMATCH" | "INVALID_INPUT" => StatusCode::BAD_REQUEST,
            "DUPLICATE_ENTITY" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ChainServiceError> for HttpError {
    fn from(err: ChainServiceError) -> Self {
        use crate::db::DatabaseError;

        let message = err.to_string();
        match err {
            ChainServiceError::EntityNotFound { .. }
            | ChainServiceError::Operation(ChainOperationError::EntityNotFound { .. })
            | ChainServiceError::Database(DatabaseError::EntityNotFound { .. }) => {
                HttpError::new(message, "ENTITY_NOT_FOUND")
            }
            ChainServiceError::Operation(ChainOperationError::InvalidTargetIndex { index, len }) => {
                HttpError::with_details(
                    message,
                    "INVALID_TARGET_INDEX",
                    format!("index: {}, len: {}", index, len),
                )
            }
            ChainServiceError::Operation(ChainOperationError::DuplicateEntity { .. })
            | ChainServiceError::Database(DatabaseError::DuplicateId { .. }) => {
                HttpError::new(message, "DUPLICATE_ENTITY")
            }
            ChainServiceError::ParentMismatch { .. } => HttpError::new(message, "PARENT_MISMATCH"),
            ChainServiceError::InvalidConfig(_) => HttpError::new(message, "INVALID_INPUT"),
            ChainServiceError::Database(e) => {
                HttpError::with_details(message, "DATABASE_ERROR", format!("{:?}", e))
            }
        }
    }
}

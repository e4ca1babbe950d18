use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use call_records::CallRecordError;
use error_common::codes;
use insurance_service::InsuranceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error category
    #[schema(example = "not_found")]
    pub error_type: String,
    /// Stable machine-readable code
    #[schema(example = "CALL_3001")]
    pub error_code: String,
    /// Human-readable error message
    pub message: String,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Errors surfaced by the non-voice endpoints.
///
/// Voice-agent lookups never produce these for unresolved input; they answer
/// 200 with a negative flag and a message instead.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication error: {message}")]
    Authentication { message: String, code: &'static str },

    #[error("Resource not found: {resource_type}")]
    NotFound { resource_type: String, code: &'static str },

    #[error("Resource conflict: {message}")]
    Conflict { message: String },

    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity { message: String, code: &'static str },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String, code: &'static str },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn signature_missing() -> Self {
        Self::Authentication {
            message: "Webhook signature header is missing".to_string(),
            code: codes::webhook::SIGNATURE_MISSING,
        }
    }

    pub fn signature_mismatch() -> Self {
        Self::Authentication {
            message: "Webhook signature does not match the payload".to_string(),
            code: codes::webhook::SIGNATURE_MISMATCH,
        }
    }

    pub fn call_not_found(call_id: &str) -> Self {
        Self::NotFound {
            resource_type: format!("call {call_id}"),
            code: codes::call_records::NOT_FOUND,
        }
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::UnprocessableEntity {
            message: message.into(),
            code: codes::webhook::INVALID_PAYLOAD,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Storage { .. } | ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::UnprocessableEntity { .. } => "unprocessable_entity",
            ApiError::Storage { .. } => "storage_error",
            ApiError::ServiceUnavailable { .. } => "service_unavailable",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Authentication { code, .. }
            | ApiError::NotFound { code, .. }
            | ApiError::UnprocessableEntity { code, .. }
            | ApiError::ServiceUnavailable { code, .. } => *code,
            ApiError::Conflict { .. } => codes::call_records::ALREADY_EXISTS,
            ApiError::Storage { .. } => codes::storage::OPERATION_FAILED,
            ApiError::Internal { .. } => codes::internal::UNEXPECTED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiErrorResponse {
            error_id: Uuid::new_v4().to_string(),
            error_type: self.error_type().to_string(),
            error_code: self.error_code().to_string(),
            message: self.to_string(),
            timestamp: chrono::Utc::now(),
        };

        if status.is_server_error() {
            error!(
                error_id = %body.error_id,
                error_code = %body.error_code,
                status = status.as_u16(),
                message = %body.message,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %body.error_id,
                error_code = %body.error_code,
                status = status.as_u16(),
                "request refused"
            );
        }

        (status, Json(body)).into_response()
    }
}

impl From<CallRecordError> for ApiError {
    fn from(err: CallRecordError) -> Self {
        match err {
            CallRecordError::InvalidPayload(message) => ApiError::invalid_payload(message),
            CallRecordError::Conflict(message) => ApiError::Conflict { message },
            CallRecordError::ConversationApi(message) => ApiError::ServiceUnavailable {
                message,
                code: codes::external::CONVERSATION_API_FAILED,
            },
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<InsuranceError> for ApiError {
    fn from(err: InsuranceError) -> Self {
        match err {
            InsuranceError::Storage(message) => ApiError::Storage { message },
            InsuranceError::Registry(message) => ApiError::ServiceUnavailable {
                message,
                code: codes::external::REGISTRY_UNAVAILABLE,
            },
            other => ApiError::internal(other.to_string()),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::decision::DenyReason;

/// Reasons an authentication attempt is rejected.
///
/// The distinction matters internally (audit entries and logs record the
/// specific variant) but is collapsed to a generic message on the wire.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("expired token")]
    ExpiredToken,

    #[error("token signed under a rotated credential")]
    PrincipalRotated,

    #[error("bad username or password")]
    BadCredentials,
}

/// Reasons a compliance rule blocks an operation. Unlike authorization
/// denials these are surfaced verbatim: they are informational for the
/// data subject, not a security leak.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComplianceError {
    #[error("consent required for category {0}")]
    ConsentRequired(String),

    #[error("medical records are under statutory retention and cannot be deleted")]
    RetentionBlocksDeletion,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failure: {0}")]
    Authentication(AuthenticationError),

    #[error("Authorization failure: {0}")]
    Authorization(DenyReason),

    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Compliance failure: {0}")]
    Compliance(ComplianceError),

    #[error("Internal error: {0}")]
    System(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors crossing the store boundary. Repositories report whatever the
/// backing engine surfaced; services decide whether that maps to a
/// `System` error or, on an authorization-relevant path, to a fail-closed
/// DENY.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Enumerated wire codes. Stable strings, one per taxonomy branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthenticated,
    Forbidden,
    ValidationFailed,
    Conflict,
    NotFound,
    ComplianceBlocked,
    Internal,
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Authentication(_) => ErrorCode::Unauthenticated,
            ApiError::Authorization(_) => ErrorCode::Forbidden,
            ApiError::Validation { .. } => ErrorCode::ValidationFailed,
            ApiError::Conflict(_) => ErrorCode::Conflict,
            ApiError::NotFound(_) => ErrorCode::NotFound,
            ApiError::Compliance(_) => ErrorCode::ComplianceBlocked,
            ApiError::System(_) => ErrorCode::Internal,
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::Authentication(_) => 401,
            ApiError::Authorization(_) => 403,
            ApiError::Validation { .. } => 400,
            ApiError::Conflict(_) => 409,
            ApiError::NotFound(_) => 404,
            ApiError::Compliance(_) => 422,
            ApiError::System(_) => 500,
        }
    }

    /// The user-facing message. Authentication and authorization failures
    /// are deliberately generic so a denied caller cannot distinguish
    /// "wrong role" from "that patient is not yours" from "no such
    /// record". Validation and compliance failures keep their detail.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Authentication(_) => "authentication required".to_string(),
            ApiError::Authorization(_) => "access denied".to_string(),
            ApiError::Validation { field, message } => format!("{field}: {message}"),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::NotFound(what) => format!("{what} not found"),
            ApiError::Compliance(inner) => inner.to_string(),
            ApiError::System(_) => "internal error".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid value".to_string());
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("request".to_string(), "invalid".to_string()));
        ApiError::Validation { field, message }
    }
}

/// Uniform error envelope: `{success: false, message, code, timestamp}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: ErrorCode,
    pub timestamp: DateTime<Utc>,
}

impl ErrorBody {
    pub fn from_error(error: &ApiError) -> Self {
        Self {
            success: false,
            message: error.public_message(),
            code: error.code(),
            timestamp: Utc::now(),
        }
    }
}

/// Uniform success envelope: `{success: true, data}`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_reasons_share_wire_shape() {
        let a = ApiError::Authorization(DenyReason::DoctorNotAssigned);
        let b = ApiError::Authorization(DenyReason::NotOwnData);
        assert_eq!(a.http_status(), 403);
        assert_eq!(a.http_status(), b.http_status());
        assert_eq!(a.public_message(), b.public_message());
        assert_eq!(a.code(), b.code());
    }

    #[test]
    fn compliance_detail_is_surfaced() {
        let err = ApiError::Compliance(ComplianceError::ConsentRequired(
            "marketing_communications".to_string(),
        ));
        assert!(err.public_message().contains("marketing_communications"));
        assert_eq!(err.http_status(), 422);
    }

    #[test]
    fn system_detail_is_not_surfaced() {
        let err = ApiError::System("connection refused at 10.0.0.3:5432".to_string());
        assert_eq!(err.public_message(), "internal error");
    }
}

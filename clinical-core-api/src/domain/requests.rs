use serde::Deserialize;
use validator::Validate;

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// Body of registration; role is fixed to patient at this surface, other
/// roles are provisioned by an admin.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub display_name: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// Body of the consent grant/revoke endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConsentChangeRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub category: String,
    #[validate(length(min = 1, max = 40, message = "must be 1-40 characters"))]
    pub policy_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn short_password_yields_field_detail() {
        let request = LoginRequest {
            email: "patient@example.com".to_string(),
            password: "short".to_string(),
        };
        let err: ApiError = request.validate().unwrap_err().into();
        match err {
            ApiError::Validation { field, .. } => assert_eq!(field, "password"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use gatehouse_core::{AuthError, FieldError};

/// Map a lifecycle error onto its HTTP status. The `error` code in the body
/// is the stable machine-checkable kind.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    let status = match &err {
        AuthError::InvalidCredentials
        | AuthError::BadToken
        | AuthError::TokenExpired
        | AuthError::InvalidState
        | AuthError::PasswordReused
        | AuthError::Duplicate => StatusCode::BAD_REQUEST,
        AuthError::AccountNotActive { .. } | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        AuthError::AccessDenied | AuthError::Forbidden => StatusCode::FORBIDDEN,
        AuthError::AccountNotFound => StatusCode::NOT_FOUND,
        AuthError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    json_error(status, err.kind(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 400 with the full list of rejected fields.
pub fn validation_error(fields: Vec<FieldError>) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({
            "error": "validation_error",
            "message": "request validation failed",
            "fields": fields
                .iter()
                .map(|f| json!({ "field": f.field, "message": f.message }))
                .collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

/// 204-style success marker for lifecycle operations that return no data.
pub fn done(message: &'static str) -> axum::response::Response {
    (
        StatusCode::OK,
        axum::Json(json!({
            "statusCode": 204,
            "message": message,
        })),
    )
        .into_response()
}

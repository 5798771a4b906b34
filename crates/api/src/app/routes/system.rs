use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::context::AuthContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<AuthContext>) -> impl IntoResponse {
    let claims = ctx.claims();
    Json(serde_json::json!({
        "id": claims.sub,
        "username": claims.username,
        "email": claims.email,
        "company": claims.company,
        "roles": claims.roles,
        "status": claims.status,
    }))
}

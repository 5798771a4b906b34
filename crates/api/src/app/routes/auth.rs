use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{AuthContext, RefreshContext};

/// Routes reachable without a token.
pub fn open_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/confirm", get(confirm))
        .route("/recover-password", post(recover_password))
}

/// Routes behind the access gate.
pub fn session_router() -> Router {
    Router::new()
        .route("/change-password", post(change_password))
        .route("/logout", get(logout))
}

/// Routes behind the refresh gate.
pub fn refresh_router() -> Router {
    Router::new().route("/refresh", get(refresh))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    if let Err(fields) = body.validate() {
        return errors::validation_error(fields);
    }
    match services.sessions.login(&body.email, &body.password).await {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn confirm(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ConfirmQuery>,
) -> axum::response::Response {
    match services.sessions.confirm_email(&query.token).await {
        Ok(()) => errors::done("email confirmed"),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::ChangePasswordRequest>,
) -> axum::response::Response {
    if let Err(fields) = body.validate() {
        return errors::validation_error(fields);
    }
    match services
        .sessions
        .change_password(ctx.account_id(), &body.password)
        .await
    {
        Ok(()) => errors::done("password changed"),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn recover_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RecoverPasswordRequest>,
) -> axum::response::Response {
    if let Err(fields) = body.validate() {
        return errors::validation_error(fields);
    }
    match services.sessions.recover_password(&body.email).await {
        Ok(()) => errors::done("temporary password sent"),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RefreshContext>,
) -> axum::response::Response {
    match services
        .sessions
        .refresh_tokens(ctx.account_id(), ctx.raw_token())
        .await
    {
        Ok(pair) => (StatusCode::OK, Json(pair)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    match services.sessions.logout(ctx.account_id()).await {
        Ok(()) => errors::done("logged out"),
        Err(e) => errors::auth_error_to_response(e),
    }
}

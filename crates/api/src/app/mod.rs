//! HTTP application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: collaborator wiring (store, notifier, token issuer)
//! - `routes/`: HTTP routes + handlers (one file per surface)
//! - `dto.rs`: request DTOs, boundary validation, JSON views
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Router {
    build_app_with(services::build_services(config))
}

/// Build the router over an explicit service graph (tests swap in a
/// recording notifier this way).
pub fn build_app_with(services: services::AppServices) -> Router {
    let auth_state = middleware::AuthState {
        issuer: services.issuer.clone(),
    };

    // Bearer + access gate; role checks happen per handler.
    let protected = Router::new()
        .route("/whoami", get(routes::system::whoami))
        .nest("/auth", routes::auth::session_router())
        .nest("/users", routes::users::router())
        .nest("/companies", routes::companies::guarded_router())
        .layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::require_access,
        ));

    // Refresh gate: a refresh JWT instead of an access JWT.
    let refresh = Router::new()
        .nest("/auth", routes::auth::refresh_router())
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::require_refresh,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::open_router())
        .nest("/users", routes::users::open_router())
        .nest("/companies", routes::companies::open_router())
        .merge(protected)
        .merge(refresh)
        .layer(Extension(Arc::new(services)))
}

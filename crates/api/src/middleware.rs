use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use gatehouse_auth::{TokenIssuer, authenticate};

use crate::app::errors;
use crate::context::{AuthContext, RefreshContext};

#[derive(Clone)]
pub struct AuthState {
    pub issuer: Arc<TokenIssuer>,
}

/// Access gate: bearer token verified against the access context, claims
/// stashed as an [`AuthContext`] extension. All failures collapse to a 401.
pub async fn require_access(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())?;

    let claims = authenticate(&state.issuer, token)
        .map_err(|e| errors::json_error(StatusCode::UNAUTHORIZED, e.kind(), e.to_string()))?;

    req.extensions_mut().insert(AuthContext::new(claims));

    Ok(next.run(req).await)
}

/// Refresh gate: the token must verify against the refresh context; the raw
/// token is carried through for fingerprint matching during rotation.
pub async fn require_refresh(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers())?.to_string();

    let claims = state
        .issuer
        .verify_refresh(&token)
        .map_err(|_| unauthorized())?;

    req.extensions_mut()
        .insert(RefreshContext::new(claims, token));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, Response> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(unauthorized)?;

    let header = header.to_str().map_err(|_| unauthorized())?;

    let header = header.strip_prefix("Bearer ").ok_or_else(unauthorized)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(unauthorized());
    }

    Ok(token)
}

fn unauthorized() -> Response {
    errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;

use gatehouse_auth::authorize;
use gatehouse_core::{Company, CompanyId, Role};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

/// Registration and listing are open: companies are created before the first
/// admin account exists.
pub fn open_router() -> Router {
    Router::new().route("/", post(create_company).get(list_companies))
}

/// Per-company operations; `super_admin` only, checked per handler.
pub fn guarded_router() -> Router {
    Router::new().route(
        "/:id",
        get(get_company).patch(update_company).delete(delete_company),
    )
}

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCompanyRequest>,
) -> axum::response::Response {
    if let Err(fields) = body.validate() {
        return errors::validation_error(fields);
    }
    let company = Company::new(body.into_new_company(), Utc::now());
    match services.companies.create(company).await {
        Ok(created) => {
            (StatusCode::CREATED, Json(dto::company_to_json(&created))).into_response()
        }
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

pub async fn list_companies(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.companies.find_all().await {
        Ok(companies) => {
            let items = companies.iter().map(dto::company_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authorize(ctx.claims(), &[Role::SUPER_ADMIN]) {
        return errors::auth_error_to_response(e);
    }
    let id = match parse_company_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.companies.find_by_id(id).await {
        Ok(Some(company)) => (StatusCode::OK, Json(dto::company_to_json(&company))).into_response(),
        Ok(None) => not_found(),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

pub async fn update_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCompanyRequest>,
) -> axum::response::Response {
    if let Err(e) = authorize(ctx.claims(), &[Role::SUPER_ADMIN]) {
        return errors::auth_error_to_response(e);
    }
    let id = match parse_company_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(fields) = body.validate() {
        return errors::validation_error(fields);
    }
    match services.companies.update_fields(id, body.into_patch()).await {
        Ok(Some(company)) => (StatusCode::OK, Json(dto::company_to_json(&company))).into_response(),
        Ok(None) => not_found(),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

pub async fn delete_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(e) = authorize(ctx.claims(), &[Role::SUPER_ADMIN]) {
        return errors::auth_error_to_response(e);
    }
    let id = match parse_company_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.companies.delete(id).await {
        Ok(true) => errors::done("company deleted"),
        Ok(false) => not_found(),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

fn parse_company_id(raw: &str) -> Result<CompanyId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid company id")
    })
}

fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "company not found")
}

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use gatehouse_auth::authorize;
use gatehouse_core::{AccountId, AuthError, CompanyId, Role};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthContext;

/// Self-registration of a company administrator (no token required).
pub fn open_router() -> Router {
    Router::new().route("/admin", post(create_admin))
}

/// Company-scoped user CRUD; `content_admin` only, checked per handler.
pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

pub async fn create_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateAdminRequest>,
) -> axum::response::Response {
    if let Err(fields) = body.validate() {
        return errors::validation_error(fields);
    }
    match services
        .provisioning
        .create_admin(body.into_new_admin())
        .await
    {
        Ok(account) => {
            (StatusCode::CREATED, Json(dto::account_to_json(&account))).into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    let company = match admin_company(&ctx) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    if let Err(fields) = body.validate() {
        return errors::validation_error(fields);
    }
    match services
        .provisioning
        .create_user(body.into_new_user(), company)
        .await
    {
        Ok(account) => {
            (StatusCode::CREATED, Json(dto::account_to_json(&account))).into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
) -> axum::response::Response {
    let company = match admin_company(&ctx) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    match services.accounts.list_by_company(company).await {
        Ok(accounts) => {
            let items = accounts.iter().map(dto::account_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let company = match admin_company(&ctx) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let id = match parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.accounts.find_by_id_and_company(id, company).await {
        Ok(Some(account)) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Ok(None) => errors::auth_error_to_response(AuthError::AccountNotFound),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> axum::response::Response {
    let company = match admin_company(&ctx) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let id = match parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(fields) = body.validate() {
        return errors::validation_error(fields);
    }
    let patch = body.into_patch();
    if patch.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "nothing to update");
    }
    match services.accounts.update_in_company(id, company, patch).await {
        Ok(Some(account)) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Ok(None) => errors::auth_error_to_response(AuthError::AccountNotFound),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let company = match admin_company(&ctx) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let id = match parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.accounts.delete_in_company(id, company).await {
        Ok(true) => errors::done("user deleted"),
        Ok(false) => errors::auth_error_to_response(AuthError::AccountNotFound),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

/// `content_admin` gate + company scope for the user CRUD surface. Admins
/// without a company binding cannot manage users.
fn admin_company(ctx: &AuthContext) -> Result<CompanyId, axum::response::Response> {
    authorize(ctx.claims(), &[Role::CONTENT_ADMIN]).map_err(errors::auth_error_to_response)?;
    ctx.company().ok_or_else(|| {
        errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "caller is not bound to a company",
        )
    })
}

fn parse_account_id(raw: &str) -> Result<AccountId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid account id")
    })
}

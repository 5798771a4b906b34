//! Request DTOs with boundary validation, and JSON views of domain records.
//!
//! The wire surface is camelCase. Account views never serialize the password
//! hash or the refresh-token fingerprint.

use serde::Deserialize;
use serde_json::{Value, json};

use gatehouse_auth::{NewAdmin, NewUser};
use gatehouse_core::{
    Account, Company, CompanyId, CompanyStatus, FieldError, NewCompany, Role, validation,
};
use gatehouse_store::{AccountPatch, CompanyPatch};

// ── Auth ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validation::collect(vec![
            validation::email("email", &self.email),
            validation::non_empty("password", &self.password),
        ])
    }
}

#[derive(Debug, Deserialize)]
pub struct ConfirmQuery {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validation::collect(vec![validation::password("password", &self.password)])
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverPasswordRequest {
    pub email: String,
}

impl RecoverPasswordRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validation::collect(vec![validation::email("email", &self.email)])
    }
}

// ── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub company: Option<CompanyId>,
}

impl CreateAdminRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validation::collect(vec![
            validation::non_empty("firstName", &self.first_name),
            validation::non_empty("lastName", &self.last_name),
            validation::non_empty("username", &self.username),
            validation::email("email", &self.email),
            validation::password("password", &self.password),
        ])
    }

    pub fn into_new_admin(self) -> NewAdmin {
        NewAdmin {
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            email: self.email,
            password: self.password,
            company: self.company,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validation::collect(vec![
            validation::non_empty("firstName", &self.first_name),
            validation::non_empty("lastName", &self.last_name),
            validation::non_empty("username", &self.username),
            validation::email("email", &self.email),
            validation::assignable_roles("roles", &self.roles),
        ])
    }

    pub fn into_new_user(self) -> NewUser {
        NewUser {
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            email: self.email,
            roles: self.roles,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub roles: Option<Vec<Role>>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Vec::new();
        if let Some(v) = &self.first_name {
            checks.push(validation::non_empty("firstName", v));
        }
        if let Some(v) = &self.last_name {
            checks.push(validation::non_empty("lastName", v));
        }
        if let Some(v) = &self.username {
            checks.push(validation::non_empty("username", v));
        }
        if let Some(roles) = &self.roles {
            checks.push(validation::assignable_roles("roles", roles));
        }
        validation::collect(checks)
    }

    pub fn into_patch(self) -> AccountPatch {
        AccountPatch {
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            roles: self.roles,
            ..Default::default()
        }
    }
}

// ── Companies ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub kind: String,
    pub tax_id_kind: String,
    pub tax_id: String,
    pub full_name: String,
    pub short_name: String,
    pub status: Option<CompanyStatus>,
}

impl CreateCompanyRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        validation::collect(vec![
            validation::non_empty("kind", &self.kind),
            validation::non_empty("taxIdKind", &self.tax_id_kind),
            validation::non_empty("taxId", &self.tax_id),
            validation::non_empty("fullName", &self.full_name),
            validation::non_empty("shortName", &self.short_name),
        ])
    }

    pub fn into_new_company(self) -> NewCompany {
        NewCompany {
            kind: self.kind,
            tax_id_kind: self.tax_id_kind,
            tax_id: self.tax_id,
            full_name: self.full_name,
            short_name: self.short_name,
            status: self.status,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    pub kind: Option<String>,
    pub tax_id_kind: Option<String>,
    pub tax_id: Option<String>,
    pub full_name: Option<String>,
    pub short_name: Option<String>,
    pub status: Option<CompanyStatus>,
}

impl UpdateCompanyRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Vec::new();
        if let Some(v) = &self.kind {
            checks.push(validation::non_empty("kind", v));
        }
        if let Some(v) = &self.tax_id_kind {
            checks.push(validation::non_empty("taxIdKind", v));
        }
        if let Some(v) = &self.tax_id {
            checks.push(validation::non_empty("taxId", v));
        }
        if let Some(v) = &self.full_name {
            checks.push(validation::non_empty("fullName", v));
        }
        if let Some(v) = &self.short_name {
            checks.push(validation::non_empty("shortName", v));
        }
        validation::collect(checks)
    }

    pub fn into_patch(self) -> CompanyPatch {
        CompanyPatch {
            kind: self.kind,
            tax_id_kind: self.tax_id_kind,
            tax_id: self.tax_id,
            full_name: self.full_name,
            short_name: self.short_name,
            status: self.status,
        }
    }
}

// ── Views ───────────────────────────────────────────────────────────────────

pub fn account_to_json(account: &Account) -> Value {
    json!({
        "id": account.id,
        "firstName": account.first_name,
        "lastName": account.last_name,
        "username": account.username,
        "email": account.email,
        "company": account.company,
        "roles": account.roles,
        "status": account.status,
        "passwordChanged": account.password_changed,
        "createdAt": account.created_at,
        "updatedAt": account.updated_at,
    })
}

pub fn company_to_json(company: &Company) -> Value {
    json!({
        "id": company.id,
        "kind": company.kind,
        "taxIdKind": company.tax_id_kind,
        "taxId": company.tax_id,
        "fullName": company.full_name,
        "shortName": company.short_name,
        "status": company.status,
        "createdAt": company.created_at,
        "updatedAt": company.updated_at,
    })
}

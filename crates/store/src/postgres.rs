//! Postgres-backed store (enabled with the `postgres` feature).
//!
//! Field-level updates run as read-modify-write inside a transaction with a
//! row lock; refresh-token rotation is a single conditional UPDATE so the
//! compare-and-swap contract holds without an explicit lock.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use gatehouse_core::{
    Account, AccountId, AccountStatus, Company, CompanyId, CompanyStatus, Role,
};

use crate::{AccountPatch, CompanyPatch, CompanyStore, CredentialStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id UUID PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    company UUID NULL,
    roles JSONB NOT NULL,
    status TEXT NOT NULL,
    password_changed BOOLEAN NOT NULL,
    refresh_token_hash TEXT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE TABLE IF NOT EXISTS companies (
    id UUID PRIMARY KEY,
    kind TEXT NOT NULL,
    tax_id_kind TEXT NOT NULL,
    tax_id TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL UNIQUE,
    short_name TEXT NOT NULL UNIQUE,
    status TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
"#;

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables when they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn upsert_account(
        executor: &mut sqlx::PgConnection,
        account: &Account,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE accounts SET
                first_name = $2, last_name = $3, username = $4, roles = $5,
                status = $6, password_hash = $7, password_changed = $8,
                refresh_token_hash = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.username)
        .bind(serde_json::to_value(&account.roles).unwrap_or_default())
        .bind(account.status.to_string())
        .bind(&account.password_hash)
        .bind(account.password_changed)
        .bind(account.refresh_token_hash.as_deref())
        .bind(account.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }
}

fn map_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            let field = match db.constraint() {
                Some(c) if c.contains("email") => "email",
                Some(c) if c.contains("username") => "username",
                Some(c) if c.contains("tax_id") => "taxId",
                _ => "unique",
            };
            return StoreError::Duplicate { field };
        }
        let code = db.code().map(|c| c.to_string()).unwrap_or_default();
        return StoreError::backend(code);
    }
    StoreError::backend("sqlx")
}

fn parse_account_status(s: &str) -> Result<AccountStatus, StoreError> {
    match s {
        "ACTIVATION_PENDING" => Ok(AccountStatus::ActivationPending),
        "ACTIVE" => Ok(AccountStatus::Active),
        other => Err(StoreError::backend(format!("bad_status:{other}"))),
    }
}

fn parse_company_status(s: &str) -> Result<CompanyStatus, StoreError> {
    match s {
        "ACTIVATION_PENDING" => Ok(CompanyStatus::ActivationPending),
        "ACTIVE" => Ok(CompanyStatus::Active),
        other => Err(StoreError::backend(format!("bad_status:{other}"))),
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let roles_json: serde_json::Value =
        row.try_get("roles").map_err(|_| StoreError::backend("row"))?;
    let roles: Vec<Role> = serde_json::from_value(roles_json)
        .map_err(|_| StoreError::backend("bad_roles"))?;
    let status: String = row.try_get("status").map_err(|_| StoreError::backend("row"))?;
    let id: Uuid = row.try_get("id").map_err(|_| StoreError::backend("row"))?;
    let company: Option<Uuid> = row.try_get("company").map_err(|_| StoreError::backend("row"))?;

    Ok(Account {
        id: AccountId::from_uuid(id),
        first_name: row.try_get("first_name").map_err(|_| StoreError::backend("row"))?,
        last_name: row.try_get("last_name").map_err(|_| StoreError::backend("row"))?,
        username: row.try_get("username").map_err(|_| StoreError::backend("row"))?,
        email: row.try_get("email").map_err(|_| StoreError::backend("row"))?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|_| StoreError::backend("row"))?,
        company: company.map(CompanyId::from_uuid),
        roles,
        status: parse_account_status(&status)?,
        password_changed: row
            .try_get("password_changed")
            .map_err(|_| StoreError::backend("row"))?,
        refresh_token_hash: row
            .try_get("refresh_token_hash")
            .map_err(|_| StoreError::backend("row"))?,
        created_at: row.try_get("created_at").map_err(|_| StoreError::backend("row"))?,
        updated_at: row.try_get("updated_at").map_err(|_| StoreError::backend("row"))?,
    })
}

fn company_from_row(row: &PgRow) -> Result<Company, StoreError> {
    let status: String = row.try_get("status").map_err(|_| StoreError::backend("row"))?;
    let id: Uuid = row.try_get("id").map_err(|_| StoreError::backend("row"))?;

    Ok(Company {
        id: CompanyId::from_uuid(id),
        kind: row.try_get("kind").map_err(|_| StoreError::backend("row"))?,
        tax_id_kind: row
            .try_get("tax_id_kind")
            .map_err(|_| StoreError::backend("row"))?,
        tax_id: row.try_get("tax_id").map_err(|_| StoreError::backend("row"))?,
        full_name: row.try_get("full_name").map_err(|_| StoreError::backend("row"))?,
        short_name: row.try_get("short_name").map_err(|_| StoreError::backend("row"))?,
        status: parse_company_status(&status)?,
        created_at: row.try_get("created_at").map_err(|_| StoreError::backend("row"))?,
        updated_at: row.try_get("updated_at").map_err(|_| StoreError::backend("row"))?,
    })
}

fn apply_account_patch(account: &mut Account, patch: AccountPatch) {
    if let Some(v) = patch.first_name {
        account.first_name = v;
    }
    if let Some(v) = patch.last_name {
        account.last_name = v;
    }
    if let Some(v) = patch.username {
        account.username = v;
    }
    if let Some(v) = patch.roles {
        account.roles = v;
    }
    if let Some(v) = patch.status {
        account.status = v;
    }
    if let Some(v) = patch.password_hash {
        account.password_hash = v;
    }
    if let Some(v) = patch.password_changed {
        account.password_changed = v;
    }
    if let Some(v) = patch.refresh_token_hash {
        account.refresh_token_hash = v;
    }
    account.updated_at = chrono::Utc::now();
}

#[async_trait]
impl CredentialStore for PostgresStore {
    async fn create(&self, account: Account) -> Result<Account, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, first_name, last_name, username, email, password_hash,
                company, roles, status, password_changed, refresh_token_hash,
                created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.company.map(|c| *c.as_uuid()))
        .bind(serde_json::to_value(&account.roles).unwrap_or_default())
        .bind(account.status.to_string())
        .bind(account.password_changed)
        .bind(account.refresh_token_hash.as_deref())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_id_and_company(
        &self,
        id: AccountId,
        company: CompanyId,
    ) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = $1 AND company = $2")
            .bind(id.as_uuid())
            .bind(company.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn list_by_company(&self, company: CompanyId) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query("SELECT * FROM accounts WHERE company = $1 ORDER BY created_at")
            .bind(company.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter().map(account_from_row).collect()
    }

    async fn update_fields(
        &self,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<Option<Account>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;
        let row = sqlx::query("SELECT * FROM accounts WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut account = account_from_row(&row)?;
        apply_account_patch(&mut account, patch);
        Self::upsert_account(&mut *tx, &account)
            .await
            .map_err(map_err)?;
        tx.commit().await.map_err(map_err)?;
        Ok(Some(account))
    }

    async fn update_in_company(
        &self,
        id: AccountId,
        company: CompanyId,
        patch: AccountPatch,
    ) -> Result<Option<Account>, StoreError> {
        match self.find_by_id_and_company(id, company).await? {
            Some(_) => self.update_fields(id, patch).await,
            None => Ok(None),
        }
    }

    async fn swap_refresh_token_hash(
        &self,
        id: AccountId,
        expected: Option<&str>,
        new: Option<String>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token_hash = $3, updated_at = NOW()
            WHERE id = $1 AND refresh_token_hash IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(expected)
        .bind(new.as_deref())
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_in_company(
        &self,
        id: AccountId,
        company: CompanyId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1 AND company = $2")
            .bind(id.as_uuid())
            .bind(company.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl CompanyStore for PostgresStore {
    async fn create(&self, company: Company) -> Result<Company, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO companies (
                id, kind, tax_id_kind, tax_id, full_name, short_name, status,
                created_at, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            "#,
        )
        .bind(company.id.as_uuid())
        .bind(&company.kind)
        .bind(&company.tax_id_kind)
        .bind(&company.tax_id)
        .bind(&company.full_name)
        .bind(&company.short_name)
        .bind(company.status.to_string())
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(company)
    }

    async fn find_all(&self) -> Result<Vec<Company>, StoreError> {
        let rows = sqlx::query("SELECT * FROM companies ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(map_err)?;
        rows.iter().map(company_from_row).collect()
    }

    async fn find_by_id(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        let row = sqlx::query("SELECT * FROM companies WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_err)?;
        row.as_ref().map(company_from_row).transpose()
    }

    async fn update_fields(
        &self,
        id: CompanyId,
        patch: CompanyPatch,
    ) -> Result<Option<Company>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_err)?;
        let row = sqlx::query("SELECT * FROM companies WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_err)?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut company = company_from_row(&row)?;
        if let Some(v) = patch.kind {
            company.kind = v;
        }
        if let Some(v) = patch.tax_id_kind {
            company.tax_id_kind = v;
        }
        if let Some(v) = patch.tax_id {
            company.tax_id = v;
        }
        if let Some(v) = patch.full_name {
            company.full_name = v;
        }
        if let Some(v) = patch.short_name {
            company.short_name = v;
        }
        if let Some(v) = patch.status {
            company.status = v;
        }
        company.updated_at = chrono::Utc::now();

        sqlx::query(
            r#"
            UPDATE companies SET
                kind = $2, tax_id_kind = $3, tax_id = $4, full_name = $5,
                short_name = $6, status = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(company.id.as_uuid())
        .bind(&company.kind)
        .bind(&company.tax_id_kind)
        .bind(&company.tax_id)
        .bind(&company.full_name)
        .bind(&company.short_name)
        .bind(company.status.to_string())
        .bind(company.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_err)?;
        tx.commit().await.map_err(map_err)?;
        Ok(Some(company))
    }

    async fn delete(&self, id: CompanyId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(result.rows_affected() == 1)
    }
}

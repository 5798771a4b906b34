//! In-memory store (dev/test wiring).
//!
//! Uniqueness constraints (email, username, company tax id and names) are
//! enforced here so tests observe the same `Duplicate` surface as a real
//! backend.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use gatehouse_core::{Account, AccountId, Company, CompanyId};

use crate::{AccountPatch, CompanyPatch, CompanyStore, CredentialStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: Mutex<HashMap<AccountId, Account>>,
    companies: Mutex<HashMap<CompanyId, Company>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_patch(account: &mut Account, patch: AccountPatch) {
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
        account.updated_at = Utc::now();
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn create(&self, account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().expect("accounts lock poisoned");
        if accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::Duplicate { field: "email" });
        }
        if accounts.values().any(|a| a.username == account.username) {
            return Err(StoreError::Duplicate { field: "username" });
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().expect("accounts lock poisoned");
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().expect("accounts lock poisoned");
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_id_and_company(
        &self,
        id: AccountId,
        company: CompanyId,
    ) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().expect("accounts lock poisoned");
        Ok(accounts
            .get(&id)
            .filter(|a| a.company == Some(company))
            .cloned())
    }

    async fn list_by_company(&self, company: CompanyId) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.lock().expect("accounts lock poisoned");
        let mut found: Vec<Account> = accounts
            .values()
            .filter(|a| a.company == Some(company))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn update_fields(
        &self,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.lock().expect("accounts lock poisoned");
        if let Some(new_username) = &patch.username {
            if accounts
                .values()
                .any(|a| a.id != id && &a.username == new_username)
            {
                return Err(StoreError::Duplicate { field: "username" });
            }
        }
        let Some(account) = accounts.get_mut(&id) else {
            return Ok(None);
        };
        Self::apply_patch(account, patch);
        Ok(Some(account.clone()))
    }

    async fn update_in_company(
        &self,
        id: AccountId,
        company: CompanyId,
        patch: AccountPatch,
    ) -> Result<Option<Account>, StoreError> {
        {
            let accounts = self.accounts.lock().expect("accounts lock poisoned");
            match accounts.get(&id) {
                Some(a) if a.company == Some(company) => {}
                _ => return Ok(None),
            }
        }
        CredentialStore::update_fields(self, id, patch).await
    }

    async fn swap_refresh_token_hash(
        &self,
        id: AccountId,
        expected: Option<&str>,
        new: Option<String>,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().expect("accounts lock poisoned");
        let Some(account) = accounts.get_mut(&id) else {
            return Ok(false);
        };
        if account.refresh_token_hash.as_deref() != expected {
            return Ok(false);
        }
        account.refresh_token_hash = new;
        account.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_in_company(
        &self,
        id: AccountId,
        company: CompanyId,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().expect("accounts lock poisoned");
        match accounts.get(&id) {
            Some(a) if a.company == Some(company) => {
                accounts.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl CompanyStore for InMemoryStore {
    async fn create(&self, company: Company) -> Result<Company, StoreError> {
        let mut companies = self.companies.lock().expect("companies lock poisoned");
        if companies.values().any(|c| c.tax_id == company.tax_id) {
            return Err(StoreError::Duplicate { field: "taxId" });
        }
        if companies
            .values()
            .any(|c| c.full_name == company.full_name || c.short_name == company.short_name)
        {
            return Err(StoreError::Duplicate { field: "name" });
        }
        companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn find_all(&self) -> Result<Vec<Company>, StoreError> {
        let companies = self.companies.lock().expect("companies lock poisoned");
        let mut found: Vec<Company> = companies.values().cloned().collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn find_by_id(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        let companies = self.companies.lock().expect("companies lock poisoned");
        Ok(companies.get(&id).cloned())
    }

    async fn update_fields(
        &self,
        id: CompanyId,
        patch: CompanyPatch,
    ) -> Result<Option<Company>, StoreError> {
        let mut companies = self.companies.lock().expect("companies lock poisoned");
        if let Some(new_tax_id) = &patch.tax_id {
            if companies
                .values()
                .any(|c| c.id != id && &c.tax_id == new_tax_id)
            {
                return Err(StoreError::Duplicate { field: "taxId" });
            }
        }
        if companies.values().any(|c| {
            c.id != id
                && (patch.full_name.as_ref() == Some(&c.full_name)
                    || patch.short_name.as_ref() == Some(&c.short_name))
        }) {
            return Err(StoreError::Duplicate { field: "name" });
        }
        let Some(company) = companies.get_mut(&id) else {
            return Ok(None);
        };
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
        company.updated_at = Utc::now();
        Ok(Some(company.clone()))
    }

    async fn delete(&self, id: CompanyId) -> Result<bool, StoreError> {
        let mut companies = self.companies.lock().expect("companies lock poisoned");
        Ok(companies.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gatehouse_core::{AccountStatus, NewAccount, NewCompany, Role};

    fn account(email: &str, username: &str, company: Option<CompanyId>) -> Account {
        Account::new(
            NewAccount {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                username: username.to_string(),
                email: email.to_string(),
                company,
                roles: vec![Role::MEMBER],
            },
            "hash".to_string(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn create_rejects_duplicate_email() {
        let store = InMemoryStore::new();
        CredentialStore::create(&store, account("a@x.com", "a", None))
            .await
            .unwrap();

        let err = CredentialStore::create(&store, account("a@x.com", "b", None))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Duplicate { field: "email" });
    }

    #[tokio::test]
    async fn company_scoping_hides_foreign_accounts() {
        let store = InMemoryStore::new();
        let company_a = CompanyId::new();
        let company_b = CompanyId::new();
        let stored = CredentialStore::create(&store, account("a@x.com", "a", Some(company_a)))
            .await
            .unwrap();

        assert!(
            store
                .find_by_id_and_company(stored.id, company_b)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .find_by_id_and_company(stored.id, company_a)
                .await
                .unwrap()
                .is_some()
        );
        assert!(store.list_by_company(company_b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_fields_applies_partial_record() {
        let store = InMemoryStore::new();
        let stored = CredentialStore::create(&store, account("a@x.com", "a", None))
            .await
            .unwrap();

        let updated = CredentialStore::update_fields(
            &store,
            stored.id,
            AccountPatch {
                status: Some(AccountStatus::Active),
                password_changed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.status, AccountStatus::Active);
        assert!(updated.password_changed);
        assert_eq!(updated.email, stored.email);
    }

    fn company(tax_id: &str, full_name: &str, short_name: &str) -> Company {
        Company::new(
            NewCompany {
                kind: "PRIVATE".to_string(),
                tax_id_kind: "VAT".to_string(),
                tax_id: tax_id.to_string(),
                full_name: full_name.to_string(),
                short_name: short_name.to_string(),
                status: None,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn update_in_company_is_scoped_to_the_company() {
        let store = InMemoryStore::new();
        let company_a = CompanyId::new();
        let company_b = CompanyId::new();
        let stored = CredentialStore::create(&store, account("a@x.com", "a", Some(company_a)))
            .await
            .unwrap();

        let foreign = store
            .update_in_company(
                stored.id,
                company_b,
                AccountPatch {
                    first_name: Some("Eve".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(foreign.is_none());

        let updated = store
            .update_in_company(
                stored.id,
                company_a,
                AccountPatch {
                    first_name: Some("Alice".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.first_name, "Alice");
    }

    #[tokio::test]
    async fn company_update_rejects_duplicate_tax_id() {
        let store = InMemoryStore::new();
        let target = CompanyStore::create(&store, company("20-1", "Acme Ltd", "Acme"))
            .await
            .unwrap();
        CompanyStore::create(&store, company("20-2", "Globex Ltd", "Globex"))
            .await
            .unwrap();

        let err = CompanyStore::update_fields(
            &store,
            target.id,
            CompanyPatch {
                tax_id: Some("20-2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, StoreError::Duplicate { field: "taxId" });
    }

    #[tokio::test]
    async fn company_update_rejects_duplicate_name_but_allows_own_values() {
        let store = InMemoryStore::new();
        let target = CompanyStore::create(&store, company("20-1", "Acme Ltd", "Acme"))
            .await
            .unwrap();
        CompanyStore::create(&store, company("20-2", "Globex Ltd", "Globex"))
            .await
            .unwrap();

        let err = CompanyStore::update_fields(
            &store,
            target.id,
            CompanyPatch {
                short_name: Some("Globex".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, StoreError::Duplicate { field: "name" });

        // Re-asserting a company's own unique values is not a collision.
        let same = CompanyStore::update_fields(
            &store,
            target.id,
            CompanyPatch {
                tax_id: Some("20-1".to_string()),
                full_name: Some("Acme Ltd".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(same.tax_id, "20-1");
    }

    #[tokio::test]
    async fn swap_refresh_hash_is_compare_and_swap() {
        let store = InMemoryStore::new();
        let stored = CredentialStore::create(&store, account("a@x.com", "a", None))
            .await
            .unwrap();

        assert!(
            store
                .swap_refresh_token_hash(stored.id, None, Some("h1".to_string()))
                .await
                .unwrap()
        );
        // Stale expectation loses.
        assert!(
            !store
                .swap_refresh_token_hash(stored.id, None, Some("h2".to_string()))
                .await
                .unwrap()
        );
        assert!(
            store
                .swap_refresh_token_hash(stored.id, Some("h1"), None)
                .await
                .unwrap()
        );
    }
}

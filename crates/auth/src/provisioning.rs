//! Account provisioning: open admin signup and admin-driven user creation.
//!
//! Both paths create the account `ACTIVATION_PENDING` and send a confirmation
//! email carrying a signed confirmation token. Admin-created users never pick
//! their own password; a temporary one is generated, mailed once, and flagged
//! for replacement.

use std::sync::Arc;

use chrono::Utc;

use gatehouse_core::{Account, AuthResult, CompanyId, NewAccount, Role};
use gatehouse_mail::{Notifier, messages};
use gatehouse_store::CredentialStore;

use crate::password::{PasswordHasher, generate_temporary_password};
use crate::tokens::TokenIssuer;

/// Self-registered company administrator. Picks their own password, receives
/// the `content_admin` role.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub company: Option<CompanyId>,
}

/// Company user created by an admin. The admin assigns roles; the password is
/// generated server-side.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
}

pub struct ProvisioningService {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    tokens: Arc<TokenIssuer>,
    hasher: PasswordHasher,
    confirmation_url: String,
}

impl ProvisioningService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        tokens: Arc<TokenIssuer>,
        hasher: PasswordHasher,
        confirmation_url: String,
    ) -> Self {
        Self {
            store,
            notifier,
            tokens,
            hasher,
            confirmation_url,
        }
    }

    /// Register a company administrator with a password of their choosing.
    pub async fn create_admin(&self, admin: NewAdmin) -> AuthResult<Account> {
        let password_hash = self.hasher.hash(&admin.password)?;
        let account = Account::new(
            NewAccount {
                first_name: admin.first_name,
                last_name: admin.last_name,
                username: admin.username,
                email: admin.email,
                company: admin.company,
                roles: vec![Role::CONTENT_ADMIN],
            },
            password_hash,
            Utc::now(),
        );
        let account = self.store.create(account).await?;

        self.send_confirmation(&account, None).await?;
        Ok(account)
    }

    /// Create a company user on behalf of an admin. The generated temporary
    /// password rides along in the confirmation email and is never persisted
    /// in cleartext.
    pub async fn create_user(&self, user: NewUser, company: CompanyId) -> AuthResult<Account> {
        let temporary = generate_temporary_password();
        let password_hash = self.hasher.hash(&temporary)?;
        let account = Account::new(
            NewAccount {
                first_name: user.first_name,
                last_name: user.last_name,
                username: user.username,
                email: user.email,
                company: Some(company),
                roles: user.roles,
            },
            password_hash,
            Utc::now(),
        );
        let account = self.store.create(account).await?;

        self.send_confirmation(&account, Some(&temporary)).await?;
        Ok(account)
    }

    /// The account is already committed when the mail goes out, so delivery
    /// failures are logged and swallowed like every other notification.
    async fn send_confirmation(
        &self,
        account: &Account,
        temporary_password: Option<&str>,
    ) -> AuthResult<()> {
        let token = self.tokens.issue_confirmation(&account.email, Utc::now())?;
        let (subject, body) = messages::confirmation(
            &self.confirmation_url,
            &token,
            &account.full_name(),
            temporary_password,
        );
        if let Err(err) = self.notifier.send(&account.email, &subject, &body).await {
            tracing::warn!(to = account.email, %err, "confirmation delivery failed");
        }
        Ok(())
    }
}

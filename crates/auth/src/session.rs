//! Session lifecycle: login, email confirmation, password change/recovery,
//! refresh-token rotation, logout.
//!
//! Collaborators are injected through the constructor; each operation runs to
//! completion against the store with no explicit locking. Refresh rotation
//! uses the store's compare-and-swap so two concurrent refreshes cannot both
//! win.

use std::sync::Arc;

use chrono::Utc;

use gatehouse_core::{AccountId, AccountStatus, AuthError, AuthResult};
use gatehouse_mail::{Notifier, messages};
use gatehouse_store::{AccountPatch, CredentialStore};

use crate::password::{PasswordHasher, generate_temporary_password, refresh_fingerprint};
use crate::tokens::{TokenIssuer, TokenPair};

pub struct SessionService {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn Notifier>,
    tokens: Arc<TokenIssuer>,
    hasher: PasswordHasher,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        tokens: Arc<TokenIssuer>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            store,
            notifier,
            tokens,
            hasher,
        }
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown email and wrong password surface the same error kind
    /// (enumeration resistance). Non-active accounts always fail with
    /// `AccountNotActive`, regardless of credential correctness.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<TokenPair> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.is_active() {
            return Err(AuthError::AccountNotActive {
                status: account.status,
            });
        }
        if !self.hasher.verify(password, &account.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.tokens.issue_pair(&account, Utc::now())?;
        // Overwrites any previous fingerprint: one active refresh chain.
        self.store
            .update_fields(
                account.id,
                AccountPatch {
                    refresh_token_hash: Some(Some(refresh_fingerprint(&pair.refresh_token))),
                    ..Default::default()
                },
            )
            .await?;
        Ok(pair)
    }

    /// Transition a pending account to active. Single-use: a second
    /// confirmation for the same email fails with `InvalidState`.
    pub async fn confirm_email(&self, token: &str) -> AuthResult<()> {
        let claims = self.tokens.verify_confirmation(token)?;

        let account = self
            .store
            .find_by_email(&claims.email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if account.status != AccountStatus::ActivationPending {
            return Err(AuthError::InvalidState);
        }

        let updated = self
            .store
            .update_fields(
                account.id,
                AccountPatch {
                    status: Some(AccountStatus::Active),
                    ..Default::default()
                },
            )
            .await?;
        if updated.is_none() {
            return Err(AuthError::storage("confirm_update"));
        }

        let (subject, body) = messages::email_confirmed();
        self.notify(&account.email, &subject, &body).await;
        Ok(())
    }

    /// Replace the password of an (already authenticated) active account.
    pub async fn change_password(
        &self,
        account_id: AccountId,
        new_password: &str,
    ) -> AuthResult<()> {
        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !account.is_active() {
            return Err(AuthError::AccountNotActive {
                status: account.status,
            });
        }
        if self.hasher.verify(new_password, &account.password_hash) {
            return Err(AuthError::PasswordReused);
        }

        let password_hash = self.hasher.hash(new_password)?;
        self.store
            .update_fields(
                account_id,
                AccountPatch {
                    password_hash: Some(password_hash),
                    password_changed: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        let (subject, body) = messages::password_changed();
        self.notify(&account.email, &subject, &body).await;
        Ok(())
    }

    /// Reset the password to a random temporary one and mail it to the user.
    /// `password_changed` is lowered to signal that the temporary credential
    /// must be replaced. The cleartext is transmitted exactly once and never
    /// persisted.
    pub async fn recover_password(&self, email: &str) -> AuthResult<()> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !account.is_active() {
            return Err(AuthError::AccountNotActive {
                status: account.status,
            });
        }

        let temporary = generate_temporary_password();
        let password_hash = self.hasher.hash(&temporary)?;
        self.store
            .update_fields(
                account.id,
                AccountPatch {
                    password_hash: Some(password_hash),
                    password_changed: Some(false),
                    ..Default::default()
                },
            )
            .await?;

        let (subject, body) = messages::password_recovery(&temporary);
        self.notify(&account.email, &subject, &body).await;
        Ok(())
    }

    /// Rotate the refresh token: the presented token must match the stored
    /// fingerprint, and rotation is a compare-and-swap, so the old token
    /// (and any concurrent loser) is invalid immediately.
    pub async fn refresh_tokens(
        &self,
        account_id: AccountId,
        presented: &str,
    ) -> AuthResult<TokenPair> {
        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccessDenied)?;

        let Some(stored) = account.refresh_token_hash.clone() else {
            return Err(AuthError::AccessDenied);
        };
        if refresh_fingerprint(presented) != stored {
            return Err(AuthError::AccessDenied);
        }

        let pair = self.tokens.issue_pair(&account, Utc::now())?;
        let rotated = self
            .store
            .swap_refresh_token_hash(
                account_id,
                Some(&stored),
                Some(refresh_fingerprint(&pair.refresh_token)),
            )
            .await?;
        if !rotated {
            return Err(AuthError::AccessDenied);
        }
        Ok(pair)
    }

    /// Clear the stored refresh fingerprint. Idempotent: an account with no
    /// session (or no account at all) is not an error.
    pub async fn logout(&self, account_id: AccountId) -> AuthResult<()> {
        self.store
            .update_fields(
                account_id,
                AccountPatch {
                    refresh_token_hash: Some(None),
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }

    /// Delivery failures are logged and swallowed: notification is
    /// fire-and-forget once the state transition has committed.
    async fn notify(&self, to: &str, subject: &str, body: &str) {
        if let Err(err) = self.notifier.send(to, subject, body).await {
            tracing::warn!(to, %err, "notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::{Account, NewAccount, Role};
    use gatehouse_mail::RecordingNotifier;
    use gatehouse_store::memory::InMemoryStore;

    struct Harness {
        service: SessionService,
        store: Arc<InMemoryStore>,
        notifier: Arc<RecordingNotifier>,
        tokens: Arc<TokenIssuer>,
        hasher: PasswordHasher,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let tokens = Arc::new(TokenIssuer::new(&crate::TokenConfig {
            access_secret: "test-access".to_string(),
            access_ttl_secs: 300,
            refresh_secret: "test-refresh".to_string(),
            refresh_ttl_secs: 86_400,
            confirmation_secret: "test-confirmation".to_string(),
            confirmation_ttl_secs: 3_600,
        }));
        let hasher = PasswordHasher::new(4);
        let service = SessionService::new(
            store.clone(),
            notifier.clone(),
            tokens.clone(),
            hasher,
        );
        Harness {
            service,
            store,
            notifier,
            tokens,
            hasher,
        }
    }

    async fn seed(h: &Harness, email: &str, password: &str, status: AccountStatus) -> Account {
        let account = Account::new(
            NewAccount {
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                username: email.to_string(),
                email: email.to_string(),
                company: None,
                roles: vec![Role::MEMBER],
            },
            h.hasher.hash(password).unwrap(),
            Utc::now(),
        );
        let created = CredentialStore::create(h.store.as_ref(), account)
            .await
            .unwrap();
        h.store
            .update_fields(
                created.id,
                AccountPatch {
                    status: Some(status),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn login_issues_tokens_and_stores_fingerprint() {
        let h = harness();
        let account = seed(&h, "a@x.com", "Right123", AccountStatus::Active).await;

        let pair = h.service.login("a@x.com", "Right123").await.unwrap();

        let stored = h.store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(
            stored.refresh_token_hash.as_deref(),
            Some(refresh_fingerprint(&pair.refresh_token).as_str())
        );
        let claims = h.tokens.verify_access(&pair.token).unwrap();
        assert_eq!(claims.sub, account.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let h = harness();
        seed(&h, "a@x.com", "Right123", AccountStatus::Active).await;

        let wrong_password = h.service.login("a@x.com", "Wrong123").await.unwrap_err();
        let unknown_email = h.service.login("b@x.com", "Right123").await.unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password.kind(), unknown_email.kind());
    }

    #[tokio::test]
    async fn non_active_account_cannot_login_even_with_correct_password() {
        let h = harness();
        seed(&h, "a@x.com", "Right123", AccountStatus::ActivationPending).await;

        let err = h.service.login("a@x.com", "Right123").await.unwrap_err();
        assert_eq!(
            err,
            AuthError::AccountNotActive {
                status: AccountStatus::ActivationPending
            }
        );

        // Status wins regardless of credential correctness.
        let err = h.service.login("a@x.com", "Wrong123").await.unwrap_err();
        assert_eq!(err.kind(), "account_not_active");
    }

    #[tokio::test]
    async fn confirm_email_is_single_use() {
        let h = harness();
        let account = seed(&h, "a@x.com", "Right123", AccountStatus::ActivationPending).await;
        let token = h.tokens.issue_confirmation("a@x.com", Utc::now()).unwrap();

        h.service.confirm_email(&token).await.unwrap();
        let stored = h.store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AccountStatus::Active);

        // Second use decodes the same email but the account already moved on.
        let again = h.tokens.issue_confirmation("a@x.com", Utc::now()).unwrap();
        assert_eq!(
            h.service.confirm_email(&again).await.unwrap_err(),
            AuthError::InvalidState
        );
    }

    #[tokio::test]
    async fn confirm_email_distinguishes_expired_from_bad_tokens() {
        let h = harness();
        seed(&h, "a@x.com", "Right123", AccountStatus::ActivationPending).await;

        let expired_issuer = TokenIssuer::new(&crate::TokenConfig {
            access_secret: "test-access".to_string(),
            access_ttl_secs: 300,
            refresh_secret: "test-refresh".to_string(),
            refresh_ttl_secs: 86_400,
            confirmation_secret: "test-confirmation".to_string(),
            confirmation_ttl_secs: -120,
        });
        let expired = expired_issuer
            .issue_confirmation("a@x.com", Utc::now())
            .unwrap();
        assert_eq!(
            h.service.confirm_email(&expired).await.unwrap_err(),
            AuthError::TokenExpired
        );

        assert_eq!(
            h.service.confirm_email("garbage").await.unwrap_err(),
            AuthError::BadToken
        );

        // Signed with a foreign secret.
        let foreign_issuer = TokenIssuer::new(&crate::TokenConfig {
            access_secret: "x".to_string(),
            access_ttl_secs: 300,
            refresh_secret: "y".to_string(),
            refresh_ttl_secs: 86_400,
            confirmation_secret: "not-the-confirmation-secret".to_string(),
            confirmation_ttl_secs: 3_600,
        });
        let forged = foreign_issuer
            .issue_confirmation("a@x.com", Utc::now())
            .unwrap();
        assert_eq!(
            h.service.confirm_email(&forged).await.unwrap_err(),
            AuthError::BadToken
        );
    }

    #[tokio::test]
    async fn confirm_email_for_unknown_account_fails() {
        let h = harness();
        let token = h
            .tokens
            .issue_confirmation("ghost@x.com", Utc::now())
            .unwrap();
        assert_eq!(
            h.service.confirm_email(&token).await.unwrap_err(),
            AuthError::AccountNotFound
        );
    }

    #[tokio::test]
    async fn change_password_rejects_reuse() {
        let h = harness();
        let account = seed(&h, "a@x.com", "Right123", AccountStatus::Active).await;

        assert_eq!(
            h.service
                .change_password(account.id, "Right123")
                .await
                .unwrap_err(),
            AuthError::PasswordReused
        );
    }

    #[tokio::test]
    async fn change_password_updates_hash_and_raises_flag() {
        let h = harness();
        let account = seed(&h, "a@x.com", "Right123", AccountStatus::Active).await;

        h.service
            .change_password(account.id, "Other456")
            .await
            .unwrap();

        let stored = h.store.find_by_id(account.id).await.unwrap().unwrap();
        assert!(stored.password_changed);
        assert!(h.hasher.verify("Other456", &stored.password_hash));
        assert!(!h.hasher.verify("Right123", &stored.password_hash));
        assert_eq!(h.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn change_password_requires_active_account() {
        let h = harness();
        let account = seed(&h, "a@x.com", "Right123", AccountStatus::ActivationPending).await;

        let err = h
            .service
            .change_password(account.id, "Other456")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "account_not_active");
    }

    #[tokio::test]
    async fn recover_password_rotates_credential_and_mails_it_once() {
        let h = harness();
        let account = seed(&h, "a@x.com", "Right123", AccountStatus::Active).await;
        let original_hash = account.password_hash.clone();

        h.service.recover_password("a@x.com").await.unwrap();

        let stored = h.store.find_by_id(account.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, original_hash);
        assert!(!stored.password_changed);

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        // The temporary password in the mail verifies against the new hash
        // and is not the original password.
        let temporary = sent[0]
            .body
            .split("temporary password: ")
            .nth(1)
            .and_then(|rest| rest.split('.').next())
            .expect("mail carries the temporary password");
        assert_ne!(temporary, "Right123");
        assert!(h.hasher.verify(temporary, &stored.password_hash));
        assert!(!h.hasher.verify("Right123", &stored.password_hash));
    }

    #[tokio::test]
    async fn recover_password_requires_known_active_account() {
        let h = harness();
        assert_eq!(
            h.service.recover_password("ghost@x.com").await.unwrap_err(),
            AuthError::AccountNotFound
        );

        seed(&h, "p@x.com", "Right123", AccountStatus::ActivationPending).await;
        let err = h.service.recover_password("p@x.com").await.unwrap_err();
        assert_eq!(err.kind(), "account_not_active");
    }

    #[tokio::test]
    async fn refresh_rotation_invalidates_the_previous_token() {
        let h = harness();
        let account = seed(&h, "a@x.com", "Right123", AccountStatus::Active).await;

        let first = h.service.login("a@x.com", "Right123").await.unwrap();
        let second = h
            .service
            .refresh_tokens(account.id, &first.refresh_token)
            .await
            .unwrap();

        // One-shot refresh tokens: the consumed one is gone.
        assert_eq!(
            h.service
                .refresh_tokens(account.id, &first.refresh_token)
                .await
                .unwrap_err(),
            AuthError::AccessDenied
        );
        // The fresh one still works.
        h.service
            .refresh_tokens(account.id, &second.refresh_token)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn refresh_without_a_session_is_denied() {
        let h = harness();
        let account = seed(&h, "a@x.com", "Right123", AccountStatus::Active).await;

        assert_eq!(
            h.service
                .refresh_tokens(account.id, "anything")
                .await
                .unwrap_err(),
            AuthError::AccessDenied
        );
    }

    #[tokio::test]
    async fn logout_clears_the_session_and_is_idempotent() {
        let h = harness();
        let account = seed(&h, "a@x.com", "Right123", AccountStatus::Active).await;
        let pair = h.service.login("a@x.com", "Right123").await.unwrap();

        h.service.logout(account.id).await.unwrap();
        let stored = h.store.find_by_id(account.id).await.unwrap().unwrap();
        assert!(stored.refresh_token_hash.is_none());

        // Second logout on an account with no session is fine.
        h.service.logout(account.id).await.unwrap();

        // The refresh token issued before logout is dead.
        assert_eq!(
            h.service
                .refresh_tokens(account.id, &pair.refresh_token)
                .await
                .unwrap_err(),
            AuthError::AccessDenied
        );
    }

    #[tokio::test]
    async fn notifier_failures_never_surface() {
        let h = harness();
        seed(&h, "a@x.com", "Right123", AccountStatus::ActivationPending).await;
        h.notifier.fail_deliveries(true);

        let token = h.tokens.issue_confirmation("a@x.com", Utc::now()).unwrap();
        // State transition commits; the failed notification is swallowed.
        h.service.confirm_email(&token).await.unwrap();
        assert!(h.notifier.sent().is_empty());
    }
}

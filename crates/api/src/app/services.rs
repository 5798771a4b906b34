//! Service wiring: collaborators built once at startup and shared via an
//! `Extension` layer.

use std::sync::Arc;

use gatehouse_auth::{PasswordHasher, ProvisioningService, SessionService, TokenIssuer};
use gatehouse_mail::LogNotifier;
use gatehouse_store::memory::InMemoryStore;
use gatehouse_store::{CompanyStore, CredentialStore};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppServices {
    pub sessions: Arc<SessionService>,
    pub provisioning: Arc<ProvisioningService>,
    pub accounts: Arc<dyn CredentialStore>,
    pub companies: Arc<dyn CompanyStore>,
    pub issuer: Arc<TokenIssuer>,
}

/// Build the default service graph: in-memory store, log-backed notifier.
/// Tests assemble their own [`AppServices`] with a recording notifier.
pub fn build_services(config: &AppConfig) -> AppServices {
    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(LogNotifier);
    let issuer = Arc::new(TokenIssuer::new(&config.token_config()));
    let hasher = PasswordHasher::new(config.bcrypt_cost);

    let sessions = Arc::new(SessionService::new(
        store.clone(),
        notifier.clone(),
        issuer.clone(),
        hasher,
    ));
    let provisioning = Arc::new(ProvisioningService::new(
        store.clone(),
        notifier,
        issuer.clone(),
        hasher,
        config.confirmation_url.clone(),
    ));

    AppServices {
        sessions,
        provisioning,
        accounts: store.clone(),
        companies: store,
        issuer,
    }
}

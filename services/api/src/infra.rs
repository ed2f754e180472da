use community_relief::auth::{AuthService, JwtService};
use community_relief::config::AuthConfig;
use community_relief::coordination::StoreError;
use community_relief::storage::SqliteStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) store: Arc<SqliteStore>,
}

impl AppState {
    /// Ready once the listener is bound and the database answers.
    pub(crate) fn is_ready(&self) -> bool {
        self.readiness.load(std::sync::atomic::Ordering::Relaxed) && self.store.ping().is_ok()
    }
}

pub(crate) fn open_store(path: &Path) -> Result<Arc<SqliteStore>, StoreError> {
    let store = SqliteStore::open(path)?;
    info!(path = %path.display(), "database opened");
    Ok(Arc::new(store))
}

/// Build the auth service over `store` and make sure an administrator exists.
pub(crate) fn admin_auth(
    store: Arc<SqliteStore>,
    config: &AuthConfig,
) -> Result<Arc<AuthService<SqliteStore>>, community_relief::auth::AuthError> {
    let jwt = JwtService::new(&config.jwt_secret, config.jwt_issuer.clone(), config.token_ttl());
    let service = AuthService::new(store, jwt);
    service.ensure_default_admin(&config.admin)?;
    Ok(Arc::new(service))
}

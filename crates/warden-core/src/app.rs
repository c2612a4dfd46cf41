//! Top-level client container

use std::sync::Arc;

use warden_http::ApiClient;
use warden_session::{Router, SessionManager};
use warden_storage::PreferenceStore;

use crate::config::Config;
use crate::Result;

/// One Wealth Warden client: config, preference store, API client and
/// session manager, wired together with the session hook installed.
pub struct WealthWarden {
    config: Config,
    store: PreferenceStore,
    client: Arc<ApiClient>,
    session: SessionManager,
}

impl WealthWarden {
    pub fn new(config: Config, router: Arc<dyn Router>) -> Result<Self> {
        // Ensure data directory exists
        if let Some(parent) = config.preferences_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let store = PreferenceStore::open(&config.preferences_path)?;
        Self::with_store(config, store, router)
    }

    /// Build against an already-open store (in-memory in tests).
    pub fn with_store(
        config: Config,
        store: PreferenceStore,
        router: Arc<dyn Router>,
    ) -> Result<Self> {
        let client = Arc::new(ApiClient::with_base_url(
            config.api_base_url.clone(),
            config.request_timeout(),
        )?);

        let session = SessionManager::new(Arc::clone(&client), store.clone(), router)?;
        session.install_hook();

        tracing::info!(api = %config.api_base_url, "Client ready");

        Ok(Self {
            config,
            store,
            client,
            session,
        })
    }

    /// Confirm a persisted session against the server, if there is one.
    /// Returns whether the session came up authenticated.
    pub async fn initialize(&self) -> bool {
        if self.session.is_authenticated() {
            self.session.init().await
        } else {
            false
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_session::NoopRouter;

    #[test]
    fn test_wiring() {
        let config = Config::with_api_url("http://localhost:9/api/").unwrap();
        let store = PreferenceStore::open_in_memory().unwrap();
        let app = WealthWarden::with_store(config, store, Arc::new(NoopRouter)).unwrap();

        assert!(!app.session().is_authenticated());
        assert!(!app.client().invalidating());
    }

    #[tokio::test]
    async fn test_initialize_skips_anonymous_session() {
        let config = Config::with_api_url("http://localhost:9/api/").unwrap();
        let store = PreferenceStore::open_in_memory().unwrap();
        let app = WealthWarden::with_store(config, store, Arc::new(NoopRouter)).unwrap();

        // No persisted flag: no network round-trip is attempted.
        assert!(!app.initialize().await);
    }
}

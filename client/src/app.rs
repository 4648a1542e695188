use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::chain_client::ChainClient;
use crate::config_store::{ClientConfig, ConfigStore};
use crate::controllers::{
    DashboardController, LoginController, RegisterController, UiDelays, ViewContext,
};
use crate::errors::WalletResult;
use crate::navigation::{Navigator, Router};
use crate::notifications::NotificationCenter;
use crate::session::SessionStore;
use crate::settings::{apply_env_overrides, Environment};
use crate::storage::{ClientPaths, FileStore};

/// Everything a front end needs: persisted session, router, notifications
/// and an API client whose 401 handler sends the user back to login.
#[derive(Debug)]
pub struct WalletApp {
    paths: ClientPaths,
    config_store: ConfigStore,
    config: ClientConfig,
    environment: Environment,
    sessions: SessionStore,
    router: Router,
    notifications: NotificationCenter,
    api: ApiClient,
}

impl WalletApp {
    /// Open the client rooted at `root_dir`, applying `ESTCOIN_*` overrides.
    pub fn initialize(root_dir: PathBuf) -> WalletResult<Self> {
        let environment = Environment::from_env();
        let paths = ClientPaths::new(&root_dir)?;
        paths.ensure_directories()?;

        let config_store = ConfigStore::from_paths(&paths);
        let mut config = config_store.load_or_default(environment.as_str())?;
        apply_env_overrides(&mut config)?;

        Self::with_config(paths, config_store, config, environment)
    }

    /// Open the client in the directory named by `ESTCOIN_HOME` (or `~/.estcoin`).
    pub fn from_env() -> WalletResult<Self> {
        let paths = ClientPaths::from_env()?;
        Self::initialize(paths.root_dir().to_path_buf())
    }

    /// Build from an already resolved configuration; overrides are not re-read.
    pub fn with_config(
        paths: ClientPaths,
        config_store: ConfigStore,
        config: ClientConfig,
        environment: Environment,
    ) -> WalletResult<Self> {
        let store = FileStore::open(paths.session_file())?;
        let sessions = SessionStore::new(Arc::new(store));
        let router = Router::new(sessions.clone());
        let notifications = NotificationCenter::new(config.ui.notification_ttl());
        let navigator: Arc<dyn Navigator> = Arc::new(router.clone());
        let api = ApiClient::with_timeout(
            config.api.base_url.clone(),
            sessions.clone(),
            config.api.request_timeout(),
        )?
        .redirect_on_auth_rejected(navigator);

        tracing::debug!(
            root = %paths.root_dir().display(),
            api = %api.base_url(),
            environment = environment.as_str(),
            "wallet client initialized"
        );

        Ok(Self {
            paths,
            config_store,
            config,
            environment,
            sessions,
            router,
            notifications,
            api,
        })
    }

    pub fn paths(&self) -> &ClientPaths {
        &self.paths
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.config_store
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn view_context(&self) -> ViewContext {
        ViewContext::new(
            self.api.clone(),
            self.notifications.clone(),
            Arc::new(self.router.clone()),
        )
        .with_delays(UiDelays::from(&self.config.ui))
        .with_history_limit(self.config.ui.dashboard_history_limit)
    }

    pub fn login(&self) -> LoginController {
        LoginController::new(self.view_context())
    }

    pub fn register(&self) -> RegisterController {
        RegisterController::new(self.view_context())
    }

    pub fn dashboard(&self) -> DashboardController {
        DashboardController::new(self.view_context())
    }

    pub fn chain(&self) -> WalletResult<ChainClient> {
        ChainClient::new(self.config.chain.rpc_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::UserProfile;
    use crate::navigation::Route;
    use tempfile::TempDir;

    fn open(root: &TempDir) -> WalletApp {
        let paths = ClientPaths::new(root.path()).unwrap();
        paths.ensure_directories().unwrap();
        let store = ConfigStore::from_paths(&paths);
        let config = store.load_or_default("test").unwrap();
        WalletApp::with_config(paths, store, config, Environment::Test).unwrap()
    }

    #[test]
    fn session_survives_restart() {
        let temp = TempDir::new().unwrap();
        let app = open(&temp);
        assert_eq!(app.router().current(), Route::Login);
        app.sessions()
            .set_session("t1", &UserProfile::new("alice", "0xabc"))
            .unwrap();
        drop(app);

        let reopened = open(&temp);
        assert_eq!(reopened.sessions().token().as_deref(), Some("t1"));
        assert_eq!(reopened.router().current(), Route::Dashboard);
    }

    #[test]
    fn config_drives_collaborators() {
        let temp = TempDir::new().unwrap();
        let app = open(&temp);
        assert_eq!(app.api().base_url(), "http://localhost:5000/api");
        assert_eq!(app.notifications().ttl(), app.config().ui.notification_ttl());
        assert_eq!(
            app.view_context().delays,
            UiDelays::from(&app.config().ui)
        );
        assert!(app.config_store().path().exists());
    }
}

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use blake3::Hasher as Blake3;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{WalletError, WalletResult};
use crate::settings::Environment;
use crate::storage::ClientPaths;

const CONFIG_VERSION: u16 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.request_timeout_secs.max(1)))
    }
}

/// Timings of the screen transitions, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    pub notification_ttl_ms: u64,
    pub login_redirect_ms: u64,
    pub register_redirect_ms: u64,
    pub transfer_close_ms: u64,
    pub logout_delay_ms: u64,
    pub dashboard_history_limit: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notification_ttl_ms: 5_000,
            login_redirect_ms: 500,
            register_redirect_ms: 2_000,
            transfer_close_ms: 1_500,
            logout_delay_ms: 500,
            dashboard_history_limit: 10,
        }
    }
}

impl UiConfig {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}

/// Node used by the standalone direct-wallet helper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainConfig {
    pub rpc_url: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    pub api: ApiConfig,
    pub ui: UiConfig,
    pub chain: ChainConfig,
    pub log_level: String,
    pub environment: String,
    pub last_updated: DateTime<Utc>,
    pub version: u16,
}

impl ClientConfig {
    pub fn new(environment: impl Into<String>) -> Self {
        let environment = environment.into();
        Self {
            api: ApiConfig::default(),
            ui: UiConfig::default(),
            chain: ChainConfig::default(),
            log_level: Environment::parse(&environment)
                .default_log_level()
                .to_string(),
            environment,
            last_updated: Utc::now(),
            version: CONFIG_VERSION,
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigEnvelope {
    version: u16,
    checksum: [u8; 32],
    payload: ClientConfig,
    modified_at_unix: i64,
}

/// Handles persistence of client configuration with integrity checks.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_paths(paths: &ClientPaths) -> Self {
        Self {
            path: paths.config_file().to_path_buf(),
        }
    }

    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load_or_default(&self, environment: impl Into<String>) -> WalletResult<ClientConfig> {
        if !self.path.exists() {
            let config = ClientConfig::new(environment);
            self.save(&config)?;
            return Ok(config);
        }

        let bytes = fs::read(&self.path)?;
        let envelope: ConfigEnvelope = serde_json::from_slice(&bytes)
            .map_err(|e| WalletError::ValidationError(format!("Unreadable config: {}", e)))?;
        if envelope.version != CONFIG_VERSION {
            return Err(WalletError::ValidationError(format!(
                "Unsupported config version {}",
                envelope.version
            )));
        }

        let checksum = checksum(&envelope.payload)?;
        if checksum != envelope.checksum {
            return Err(WalletError::ValidationError(
                "Config integrity verification failed".to_string(),
            ));
        }

        Ok(envelope.payload)
    }

    pub fn save(&self, config: &ClientConfig) -> WalletResult<()> {
        let mut payload = config.clone();
        payload.touch();

        let envelope = ConfigEnvelope {
            version: CONFIG_VERSION,
            checksum: checksum(&payload)?,
            modified_at_unix: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map_err(|e| WalletError::StorageError(e.to_string()))?
                .as_secs() as i64,
            payload,
        };

        let serialized = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| WalletError::StorageError(e.to_string()))?;
        let tmp_path = self.path.with_extension("new");
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(&serialized)?;
            file.sync_all()?;
        }
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }

    pub fn update<F>(
        &self,
        environment: impl Into<String>,
        updater: F,
    ) -> WalletResult<ClientConfig>
    where
        F: FnOnce(&mut ClientConfig) -> WalletResult<()>,
    {
        let mut config = self.load_or_default(environment)?;
        updater(&mut config)?;
        config.touch();
        self.save(&config)?;
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn checksum(config: &ClientConfig) -> WalletResult<[u8; 32]> {
    let mut hasher = Blake3::new();
    let encoded =
        serde_json::to_vec(config).map_err(|e| WalletError::StorageError(e.to_string()))?;
    hasher.update(&encoded);
    let mut output = [0u8; 32];
    output.copy_from_slice(hasher.finalize().as_bytes());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_and_load_config_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("client.config");
        let store = ConfigStore::new(&path);

        let mut config = ClientConfig::new("development");
        config.api.base_url = "http://127.0.0.1:5001/api".into();
        config.ui.register_redirect_ms = 0;
        store.save(&config).unwrap();

        let loaded = store.load_or_default("development").unwrap();
        assert_eq!(loaded.api.base_url, "http://127.0.0.1:5001/api");
        assert_eq!(loaded.ui.register_redirect_ms, 0);
    }

    #[test]
    fn missing_config_is_created_with_defaults() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(temp.path().join("nested").join("client.config"));

        let config = store.load_or_default("test").unwrap();
        assert_eq!(config.ui.notification_ttl(), Duration::from_secs(5));
        assert_eq!(config.ui.dashboard_history_limit, 10);
        assert!(store.path().exists());
    }

    #[test]
    fn tampered_config_detected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("client.config");
        let store = ConfigStore::new(&path);
        store.save(&ClientConfig::new("test")).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let tampered = text.replace("http://localhost:5000/api", "http://evil.example/api");
        assert_ne!(text, tampered);
        fs::write(&path, tampered).unwrap();

        let result = store.load_or_default("test");
        assert!(matches!(result, Err(WalletError::ValidationError(_))));
    }

    #[test]
    fn update_persists_changes() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new(temp.path().join("client.config"));

        store
            .update("test", |config| {
                config.chain.rpc_url = "http://node:8545".into();
                Ok(())
            })
            .unwrap();

        let loaded = store.load_or_default("test").unwrap();
        assert_eq!(loaded.chain.rpc_url, "http://node:8545");
    }

    #[test]
    fn log_level_defaults_follow_environment() {
        assert_eq!(ClientConfig::new("production").log_level, "info");
        assert_eq!(ClientConfig::new("development").log_level, "debug");
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{WalletError, WalletResult};

/// Environment variable that overrides the client data directory.
pub const HOME_ENV_VAR: &str = "ESTCOIN_HOME";

/// Manages filesystem paths used by the wallet client.
#[derive(Debug, Clone)]
pub struct ClientPaths {
    /// Root directory for client data.
    root_dir: PathBuf,
    /// Key/value file backing the session store.
    session_file: PathBuf,
    /// Path to persisted client configuration.
    config_file: PathBuf,
}

impl ClientPaths {
    /// Default session file name used on disk.
    pub const DEFAULT_SESSION_FILENAME: &'static str = "session.json";
    /// Default configuration file name used on disk.
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "client.config";

    /// Create a new path manager rooted at the provided directory.
    pub fn new(root: impl AsRef<Path>) -> WalletResult<Self> {
        let root_dir = root.as_ref().to_path_buf();
        if root_dir.as_os_str().is_empty() {
            return Err(WalletError::StorageError(
                "Client root directory cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            session_file: root_dir.join(Self::DEFAULT_SESSION_FILENAME),
            config_file: root_dir.join(Self::DEFAULT_CONFIG_FILENAME),
            root_dir,
        })
    }

    /// Resolve the data directory from `ESTCOIN_HOME`, falling back to `~/.estcoin`.
    pub fn from_env() -> WalletResult<Self> {
        if let Ok(home) = std::env::var(HOME_ENV_VAR) {
            if !home.trim().is_empty() {
                return Self::new(home.trim());
            }
        }

        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| {
                WalletError::StorageError(format!(
                    "Cannot locate a home directory; set {}",
                    HOME_ENV_VAR
                ))
            })?;
        Self::new(Path::new(&home).join(".estcoin"))
    }

    /// Ensure the directory structure exists, creating missing folders.
    pub fn ensure_directories(&self) -> WalletResult<()> {
        fs::create_dir_all(&self.root_dir)?;
        Ok(())
    }

    /// Key/value file holding the persisted session.
    pub fn session_file(&self) -> &Path {
        &self.session_file
    }

    /// Path to persisted client configuration file.
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Root directory for all client-managed data.
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }
}

use serde::{Deserialize, Serialize};

use crate::config_store::ClientConfig;
use crate::errors::{WalletError, WalletResult};

pub const ENV_ENVIRONMENT: &str = "ESTCOIN_ENV";
pub const ENV_API_URL: &str = "ESTCOIN_API_URL";
pub const ENV_CHAIN_RPC_URL: &str = "ESTCOIN_CHAIN_RPC_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "ESTCOIN_REQUEST_TIMEOUT_SECS";
pub const ENV_NOTIFICATION_TTL: &str = "ESTCOIN_NOTIFICATION_TTL_MS";
pub const ENV_LOG_LEVEL: &str = "ESTCOIN_LOG";

/// Environment types for different client configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn from_env() -> Self {
        let value = std::env::var(ENV_ENVIRONMENT).unwrap_or_default();
        Self::parse(&value)
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" | "testing" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    /// Log filter used when neither the config nor `ESTCOIN_LOG` sets one.
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "debug",
            Environment::Production => "info",
            Environment::Test => "warn",
        }
    }
}

/// Apply `ESTCOIN_*` overrides from the process environment.
pub fn apply_env_overrides(config: &mut ClientConfig) -> WalletResult<()> {
    apply_overrides(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary lookup. Empty values and values
/// containing control characters are ignored.
pub fn apply_overrides<F>(config: &mut ClientConfig, lookup: F) -> WalletResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| -> Option<String> {
        let value = lookup(key)?;
        if value.trim().is_empty() {
            tracing::warn!("Environment variable {} is empty", key);
            return None;
        }
        if value.chars().any(|c| c.is_control()) {
            tracing::warn!(
                "Environment variable {} contains control characters, ignoring",
                key
            );
            return None;
        }
        tracing::debug!("Loaded configuration from environment variable {}", key);
        Some(value.trim().to_string())
    };

    if let Some(url) = read(ENV_API_URL) {
        config.api.base_url = url;
    }
    if let Some(url) = read(ENV_CHAIN_RPC_URL) {
        config.chain.rpc_url = url;
    }
    if let Some(value) = read(ENV_REQUEST_TIMEOUT) {
        config.api.request_timeout_secs = parse_u32_value(&value, ENV_REQUEST_TIMEOUT)?;
    }
    if let Some(value) = read(ENV_NOTIFICATION_TTL) {
        config.ui.notification_ttl_ms =
            u64::from(parse_u32_value(&value, ENV_NOTIFICATION_TTL)?);
    }
    if let Some(level) = read(ENV_LOG_LEVEL) {
        config.log_level = level;
    }

    Ok(())
}

fn parse_u32_value(value: &str, key: &str) -> WalletResult<u32> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WalletError::ValidationError(format!(
            "Configuration key '{}' cannot be empty",
            key
        )));
    }

    trimmed.parse::<u32>().map_err(|_| {
        WalletError::ValidationError(format!(
            "Invalid numeric value '{}' for key '{}'",
            value, key
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_environment_detection() {
        assert_eq!(Environment::parse("prod"), Environment::Production);
        assert_eq!(Environment::parse("Testing"), Environment::Test);
        assert_eq!(Environment::parse(""), Environment::Development);
        assert_eq!(Environment::Test.default_log_level(), "warn");
    }

    #[test]
    fn overrides_replace_config_values() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_URL, " http://api.test/api "),
            (ENV_REQUEST_TIMEOUT, "5"),
            (ENV_NOTIFICATION_TTL, "250"),
            (ENV_CHAIN_RPC_URL, ""),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::new("test");
        apply_overrides(&mut config, |key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api.base_url, "http://api.test/api");
        assert_eq!(config.api.request_timeout_secs, 5);
        assert_eq!(config.ui.notification_ttl_ms, 250);
        // empty values are ignored
        assert_eq!(config.chain.rpc_url, "http://localhost:8545");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let mut config = ClientConfig::new("test");
        let result = apply_overrides(&mut config, |key| {
            (key == ENV_REQUEST_TIMEOUT).then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(WalletError::ValidationError(_))));
    }
}

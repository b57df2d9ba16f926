use std::path::PathBuf;
use std::time::Duration;

use agenthub::client::configs::{DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_IDLE_TIMEOUT};
use agenthub::{ClientConfig, FileTokenStore};
use config::{Config, Environment};
use serde::Deserialize;

use crate::error::{to_env_var, ConfigError, ENV_PREFIX};

#[derive(Debug, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Seconds to wait for the next chunk of a reply; 0 disables the limit.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            idle_timeout_secs: default_idle_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CredentialSettings {
    /// Token file; defaults to the per-user config directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub credentials: CredentialSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("api.base_url", default_base_url())?
            .set_default("api.idle_timeout_secs", default_idle_timeout_secs())?
            .set_default("api.connect_timeout_secs", default_connect_timeout_secs())?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            match err {
                config::ConfigError::Type {
                    key: Some(ref key),
                    ..
                } => ConfigError::InvalidValue {
                    env_var: to_env_var(key),
                    message: err.to_string(),
                },
                other => ConfigError::Other(other),
            }
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        let idle_timeout = match self.api.idle_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        ClientConfig {
            base_url: self.api.base_url.clone(),
            idle_timeout,
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
        }
    }

    pub fn token_store(&self) -> anyhow::Result<FileTokenStore> {
        let path = match &self.credentials.path {
            Some(path) => path.clone(),
            None => FileTokenStore::default_path()?,
        };
        Ok(FileTokenStore::new(path))
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT.as_secs()
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT.as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clean_env() {
        for (key, _) in env::vars() {
            if key.starts_with("AGENTHUB_") {
                env::remove_var(&key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_settings() {
        clean_env();

        let settings = Settings::new().unwrap();
        assert_eq!(settings.api.base_url, "http://localhost:8000/api");
        assert_eq!(settings.api.idle_timeout_secs, 120);
        assert_eq!(settings.api.connect_timeout_secs, 10);
        assert!(settings.credentials.path.is_none());

        let client = settings.client_config();
        assert_eq!(client.idle_timeout, Some(Duration::from_secs(120)));
        assert_eq!(client.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    #[serial]
    fn test_environment_override() {
        clean_env();
        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token.json");
        env::set_var("AGENTHUB_API__BASE_URL", "https://hub.example.com/api");
        env::set_var("AGENTHUB_API__IDLE_TIMEOUT_SECS", "30");
        env::set_var("AGENTHUB_CREDENTIALS__PATH", &token_path);

        let settings = Settings::new().unwrap();
        assert_eq!(settings.api.base_url, "https://hub.example.com/api");
        assert_eq!(
            settings.client_config().idle_timeout,
            Some(Duration::from_secs(30))
        );
        assert_eq!(settings.token_store().unwrap().path(), token_path);

        // Clean up
        env::remove_var("AGENTHUB_API__BASE_URL");
        env::remove_var("AGENTHUB_API__IDLE_TIMEOUT_SECS");
        env::remove_var("AGENTHUB_CREDENTIALS__PATH");
    }

    #[test]
    #[serial]
    fn test_zero_idle_timeout_disables_limit() {
        clean_env();
        env::set_var("AGENTHUB_API__IDLE_TIMEOUT_SECS", "0");

        let settings = Settings::new().unwrap();
        assert_eq!(settings.client_config().idle_timeout, None);

        env::remove_var("AGENTHUB_API__IDLE_TIMEOUT_SECS");
    }

    #[test]
    #[serial]
    fn test_unparsable_timeout_is_rejected() {
        clean_env();
        env::set_var("AGENTHUB_API__CONNECT_TIMEOUT_SECS", "soon");

        assert!(Settings::new().is_err());

        env::remove_var("AGENTHUB_API__CONNECT_TIMEOUT_SECS");
    }
}

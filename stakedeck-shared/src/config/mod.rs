//! Client configuration.
//!
//! Resolution order mirrors the rest of the platform: compiled-in defaults,
//! then `STAKEDECK_*` environment overrides.

use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

/// Default identity-service base address.
const DEFAULT_API_BASE_URL: &str = "https://api.stakedeck.io";

/// Configuration for the StakeDeck client core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address of the identity service.
    pub api_base_url: String,

    /// Directory for the persisted session file; `None` selects the
    /// platform config directory.
    pub storage_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_dir: None,
        }
    }

    /// Loads the configuration from defaults and environment variables.
    ///
    /// `STAKEDECK_API_URL` overrides the identity-service address and
    /// `STAKEDECK_STORAGE_DIR` the session-file directory.
    ///
    /// # Errors
    /// Returns an error message if a supplied override is unusable.
    pub fn load() -> Result<Self, String> {
        let mut config = Self::with_defaults();

        if let Ok(url) = env::var("STAKEDECK_API_URL") {
            if url.trim().is_empty() {
                return Err("STAKEDECK_API_URL must not be empty".to_string());
            }
            config.api_base_url = url;
        }
        if let Ok(dir) = env::var("STAKEDECK_STORAGE_DIR") {
            config.storage_dir = Some(PathBuf::from(dir));
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the resolved configuration.
    ///
    /// # Errors
    /// Returns an error message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(format!(
                "invalid api_base_url '{}': expected an http(s) address",
                self.api_base_url
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_are_valid() {
        let config = ClientConfig::with_defaults();
        assert!(config.validate().is_ok());
        assert!(config.api_base_url.starts_with("https://"));
        assert_eq!(config.storage_dir, None);
    }

    #[test]
    #[serial]
    fn test_env_overrides_api_url() {
        unsafe {
            env::set_var("STAKEDECK_API_URL", "http://localhost:4010");
        }
        let config = ClientConfig::load().unwrap();
        assert_eq!(config.api_base_url, "http://localhost:4010");
        unsafe {
            env::remove_var("STAKEDECK_API_URL");
        }
    }

    #[test]
    #[serial]
    fn test_env_overrides_storage_dir() {
        unsafe {
            env::set_var("STAKEDECK_STORAGE_DIR", "/tmp/stakedeck-test");
        }
        let config = ClientConfig::load().unwrap();
        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/stakedeck-test")));
        unsafe {
            env::remove_var("STAKEDECK_STORAGE_DIR");
        }
    }

    #[test]
    #[serial]
    fn test_rejects_non_http_url() {
        let config = ClientConfig {
            api_base_url: "ftp://example.com".to_string(),
            storage_dir: None,
        };
        assert!(config.validate().is_err());
    }
}

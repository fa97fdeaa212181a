//! Configuration Management
//!
//! Handles persistent configuration storage for finolog.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::api::http::ReqwestClient;
use crate::resource::Session;

pub const DEFAULT_BASE_URL: &str = "https://api.finolog.ru";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const TOKEN_ENV: &str = "FINOLOG_API_TOKEN";
pub const BIZ_ID_ENV: &str = "FINOLOG_BIZ_ID";

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// API token sent in the `Api-Token` header
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Business account to work with
    #[serde(default)]
    pub biz_id: Option<i64>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    format!("finolog-rs/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_base_url(),
            biz_id: None,
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("finolog").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_json(&content),
            Err(e) => {
                tracing::warn!("Failed to read {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Parse a config file body, falling back to defaults when malformed
    pub fn from_json(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed config: {}", e);
            Self::default()
        })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective token (CLI > environment > config)
    pub fn effective_token(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()))
            .or_else(|| self.api_token.clone())
    }

    /// Get effective business id (CLI > environment > config)
    pub fn effective_biz_id(&self, cli: Option<i64>) -> Option<i64> {
        cli.or_else(|| {
            std::env::var(BIZ_ID_ENV)
                .ok()
                .and_then(|v| v.trim().parse().ok())
        })
        .or(self.biz_id)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the HTTP capability for `token`
    pub fn client(&self, token: &str) -> Result<ReqwestClient> {
        ReqwestClient::new(&self.base_url, token, &self.user_agent, self.timeout())
            .with_context(|| format!("Failed to build HTTP client for {}", self.base_url))
    }

    /// Open a session, resolving token and business id with CLI overrides
    pub fn session(&self, token: Option<&str>, biz_id: Option<i64>) -> Result<Session> {
        let token = self.effective_token(token).with_context(|| {
            format!("No API token configured. Set {TOKEN_ENV} or run `finolog config set-token`")
        })?;
        let biz_id = self.effective_biz_id(biz_id).with_context(|| {
            format!("No business id configured. Set {BIZ_ID_ENV} or use --biz-id")
        })?;

        tracing::info!("Using business {} at {}", biz_id, self.base_url);
        Ok(Session::new(biz_id, Arc::new(self.client(&token)?)))
    }

    /// Set token and save
    pub fn set_token(&mut self, token: &str) -> Result<()> {
        self.api_token = Some(token.to_string());
        self.save()
    }

    /// Set business id and save
    pub fn set_biz_id(&mut self, biz_id: i64) -> Result<()> {
        self.biz_id = Some(biz_id);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = Config::from_json(r#"{"biz_id": 12}"#);
        assert_eq!(config.biz_id, Some(12));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.user_agent.starts_with("finolog-rs/"));
    }

    #[test]
    fn test_malformed_config_is_default() {
        assert_eq!(Config::from_json("{not json"), Config::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = Config {
            api_token: Some("from-file".to_string()),
            biz_id: Some(1),
            ..Config::default()
        };
        assert_eq!(config.effective_token(Some("flag")).as_deref(), Some("flag"));
        assert_eq!(config.effective_biz_id(Some(9)), Some(9));
    }

    #[test]
    fn test_session_uses_configured_business() {
        let config = Config {
            api_token: Some("secret".to_string()),
            base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let session = config.session(None, Some(77)).unwrap();
        assert_eq!(session.transport().prefix(), "/v1/biz/77");
    }

    #[test]
    fn test_invalid_base_url_is_reported() {
        let config = Config {
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        let err = config.client("secret").err().unwrap();
        assert!(err.to_string().contains("not a url"));
        assert!(matches!(
            err.downcast_ref::<crate::Error>(),
            Some(crate::Error::InvalidUrl { .. })
        ));
    }
}

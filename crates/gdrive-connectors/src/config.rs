//! Shared Google Drive configuration

use crate::error::{ConnectorError, ConnectorResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/drive";
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Connection-level timeouts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub connect_ms: u64,
    pub total_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 10_000,
            total_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
}

/// Credentials and endpoints shared by every Drive component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveConfiguration {
    /// Service-account credentials JSON file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,
    /// User to impersonate through domain-wide delegation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_email: Option<String>,
    /// Pre-issued bearer token, used instead of a credentials file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,
    #[serde(default)]
    pub timeout_config: TimeoutConfig,
    #[serde(default)]
    pub network_config: NetworkConfig,
}

fn default_scopes() -> Vec<String> {
    vec![DEFAULT_SCOPE.to_string()]
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_upload_base_url() -> String {
    DEFAULT_UPLOAD_BASE_URL.to_string()
}

impl Default for DriveConfiguration {
    fn default() -> Self {
        Self {
            credentials_file: None,
            credentials_email: None,
            access_token: None,
            scopes: default_scopes(),
            api_base_url: default_api_base_url(),
            upload_base_url: default_upload_base_url(),
            timeout_config: TimeoutConfig::default(),
            network_config: NetworkConfig::default(),
        }
    }
}

impl DriveConfiguration {
    pub fn with_credentials_file(path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_file: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Point both API and upload endpoints at `base` (used against mock servers)
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.api_base_url = format!("{}/drive/v3", base);
        self.upload_base_url = format!("{}/upload/drive/v3", base);
        self
    }

    pub fn validate(&self) -> ConnectorResult<()> {
        let has_file = self
            .credentials_file
            .as_ref()
            .map(|p| !p.as_os_str().is_empty())
            .unwrap_or(false);
        let has_token = self
            .access_token
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false);

        match (has_file, has_token) {
            (false, false) => {
                return Err(ConnectorError::InvalidConfig(
                    "Google Drive Configuration must provide a credentials file or an access token"
                        .to_string(),
                ))
            }
            (true, true) => {
                return Err(ConnectorError::InvalidConfig(
                    "credentials_file and access_token are mutually exclusive".to_string(),
                ))
            }
            _ => {}
        }

        if self.scopes.is_empty() {
            return Err(ConnectorError::InvalidConfig(
                "at least one OAuth scope is required".to_string(),
            ));
        }

        for (name, value) in [
            ("api_base_url", &self.api_base_url),
            ("upload_base_url", &self.upload_base_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                ConnectorError::InvalidConfig(format!("Invalid {}: {} ({})", name, value, e))
            })?;
        }

        if self.timeout_config.connect_ms == 0 || self.timeout_config.total_ms == 0 {
            return Err(ConnectorError::InvalidConfig(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.timeout_config.connect_ms > self.timeout_config.total_ms {
            return Err(ConnectorError::InvalidConfig(
                "connect timeout cannot exceed total timeout".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_when_deserializing() {
        let config: DriveConfiguration =
            serde_json::from_value(json!({"credentials_file": "/tmp/creds.json"})).unwrap();
        assert_eq!(config.scopes, vec![DEFAULT_SCOPE.to_string()]);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.upload_base_url, DEFAULT_UPLOAD_BASE_URL);
        assert_eq!(config.timeout_config, TimeoutConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn credentials_are_required_and_exclusive() {
        assert!(DriveConfiguration::default().validate().is_err());

        let mut both = DriveConfiguration::with_access_token("token");
        both.credentials_file = Some("/tmp/creds.json".into());
        assert!(both.validate().is_err());

        assert!(DriveConfiguration::with_access_token("   ").validate().is_err());
        assert!(DriveConfiguration::with_access_token("token").validate().is_ok());
    }

    #[test]
    fn invalid_urls_and_timeouts_rejected() {
        let mut config = DriveConfiguration::with_access_token("token");
        config.api_base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = DriveConfiguration::with_access_token("token");
        config.timeout_config = TimeoutConfig {
            connect_ms: 5_000,
            total_ms: 1_000,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn base_url_override() {
        let config =
            DriveConfiguration::with_access_token("t").with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000/drive/v3");
        assert_eq!(config.upload_base_url, "http://127.0.0.1:9000/upload/drive/v3");
    }
}

//! Service Settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `SEVERITY__SECTION__KEY` environment variables. `PORT` wins
//! over everything for the bind port.

use std::env;

use axum::http::{HeaderName, HeaderValue};
use config::{Config, Environment, File};
use data_validator::ValidationConfig;
use inference_engine::ArtifactPaths;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rate_limit::RateLimitConfig;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/severity.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub artifacts: ArtifactPaths,
    pub security: SecuritySettings,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingSettings,
    pub startup: StartupSettings,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Shared secret for every route but `/health`; unset disables auth
    pub api_key: Option<String>,
    pub api_key_header: String,
    /// Accepted `Host` values; `*.example.com` matches subdomains, `*` matches all
    pub allowed_hosts: Vec<String>,
    /// Browser origins allowed by CORS; exact origins only, no `*`
    pub cors_origins: Vec<String>,
    /// Return internal error messages in 500 bodies
    pub expose_error_detail: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_header: "x-service-token".to_string(),
            allowed_hosts: vec![
                "localhost".to_string(),
                "127.0.0.1".to_string(),
                "*.onrender.com".to_string(),
                "backend".to_string(),
            ],
            cors_origins: vec!["http://localhost:8501".to_string()],
            expose_error_detail: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,tower_http=info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupSettings {
    /// Exit when artifacts fail to load instead of serving 503
    pub fail_fast: bool,
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self { fail_fast: true }
    }
}

impl Settings {
    /// Load from `SEVERITY_CONFIG` (or the default path) plus environment
    pub fn load() -> Result<Self, SettingsError> {
        let path = env::var("SEVERITY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific file, which may be absent
    pub fn load_from(path: &str) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("SEVERITY")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("security.allowed_hosts")
                    .with_list_parse_key("security.cors_origins"),
            );
        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would only fail once the router is built
    pub fn validate(&self) -> Result<(), SettingsError> {
        HeaderName::from_bytes(self.security.api_key_header.as_bytes()).map_err(|e| {
            SettingsError::Invalid {
                key: "security.api_key_header",
                reason: e.to_string(),
            }
        })?;
        for origin in &self.security.cors_origins {
            if origin.trim() == "*" {
                return Err(SettingsError::Invalid {
                    key: "security.cors_origins",
                    reason: "wildcard origin cannot be combined with credentials".to_string(),
                });
            }
            HeaderValue::from_str(origin).map_err(|e| SettingsError::Invalid {
                key: "security.cors_origins",
                reason: format!("'{}': {}", origin, e),
            })?;
        }
        if matches!(self.security.api_key.as_deref(), Some("")) {
            return Err(SettingsError::Invalid {
                key: "security.api_key",
                reason: "must not be empty when set".to_string(),
            });
        }
        if self.rate_limit.enabled && (self.rate_limit.per_second == 0 || self.rate_limit.burst_size == 0) {
            return Err(SettingsError::Invalid {
                key: "rate_limit",
                reason: "per_second and burst_size must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind_addr(), "0.0.0.0:8000");
        assert_eq!(settings.security.api_key_header, "x-service-token");
        assert!(settings.security.api_key.is_none());
        assert!(!settings.rate_limit.enabled);
        assert!(settings.startup.fail_fast);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load_from("does/not/exist.toml").unwrap();
        assert_eq!(settings.security.cors_origins, vec!["http://localhost:8501"]);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = env::temp_dir().join(format!("severity-settings-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[security]
api_key = "s3cret"
allowed_hosts = ["api.example.com"]

[artifacts]
model_path = "models/severity.onnx"
model_format = "onnx"

[validation]
humidity_range = [5.0, 95.0]
"#
        )
        .unwrap();

        let settings = Settings::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.security.api_key.as_deref(), Some("s3cret"));
        assert_eq!(settings.security.allowed_hosts, vec!["api.example.com"]);
        assert_eq!(settings.artifacts.model_format, inference_engine::ModelFormat::Onnx);
        // unspecified keys in a partial section keep their defaults
        assert_eq!(settings.artifacts.scaler_path, ArtifactPaths::default().scaler_path);
        assert_eq!(settings.validation.humidity_range, (5.0, 95.0));
        assert_eq!(settings.security.api_key_header, "x-service-token");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let mut settings = Settings::default();
        settings.security.api_key_header = "bad header".to_string();
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { key: "security.api_key_header", .. })
        ));
    }

    #[test]
    fn test_wildcard_cors_origin_rejected() {
        let mut settings = Settings::default();
        settings.security.cors_origins = vec!["http://localhost:8501".to_string(), "*".to_string()];
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { key: "security.cors_origins", .. })
        ));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut settings = Settings::default();
        settings.security.api_key = Some(String::new());
        assert!(settings.validate().is_err());
    }
}

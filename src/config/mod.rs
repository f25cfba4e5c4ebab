//! Configuration loading.
//!
//! Two sources feed the final [`Config`]:
//!
//! 1. **Environment (required):** `INCIDENTIO_WEBHOOK_URL` and
//!    `INCIDENTIO_API_TOKEN`. Absence of either is fatal; there is no fallback.
//! 2. **Settings file (optional):** tuning knobs such as the log level and the
//!    webhook timeout, searched in the following order:
//!    - Path given on the command line (must exist)
//!    - Default location, used only if present:
//!      - **Linux/macOS:** `~/.incidentio-alert-mcp/config.json`
//!      - **Windows:** `%USERPROFILE%\.incidentio-alert-mcp\config.json`

mod settings;

pub use settings::{LoggingConfig, Settings, SinkConfig};

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::ConfigError;

/// Environment variable holding the alert webhook URL.
pub const WEBHOOK_URL_VAR: &str = "INCIDENTIO_WEBHOOK_URL";

/// Environment variable holding the bearer token for the webhook.
pub const API_TOKEN_VAR: &str = "INCIDENTIO_API_TOKEN";

/// Bearer credential for the alert webhook.
///
/// `Debug` is redacted so the token cannot leak through logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps a bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for building the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Fully resolved process configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Webhook that receives alert payloads.
    pub webhook_url: Url,
    /// Bearer credential for the webhook.
    pub api_token: ApiToken,
    /// Alert sink tuning.
    pub sink: SinkConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.incidentio-alert-mcp/`
/// - **Windows:** `%USERPROFILE%\.incidentio-alert-mcp\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".incidentio-alert-mcp"))
}

/// Returns the platform-specific default settings file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads the configuration from the process environment and settings file.
///
/// # Errors
///
/// Returns an error if:
/// - A required environment variable is missing or blank
/// - The webhook URL is not an absolute http(s) URL
/// - An explicitly given settings file cannot be found
/// - The settings file cannot be read, is malformed, or fails validation
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// Loads the configuration using `lookup` in place of the process environment.
///
/// # Errors
///
/// See [`load_config`].
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let webhook_url = required_var(&lookup, WEBHOOK_URL_VAR)?;
    let webhook_url = parse_endpoint(&webhook_url)?;
    let api_token = ApiToken::new(required_var(&lookup, API_TOKEN_VAR)?);

    let settings = match path {
        Some(p) => load_settings(p)?,
        None => match default_config_path() {
            Some(p) if p.exists() => load_settings(&p)?,
            _ => Settings::default(),
        },
    };

    Ok(Config {
        webhook_url,
        api_token,
        sink: settings.sink,
        logging: settings.logging,
    })
}

/// Reads and validates a settings file.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, malformed or invalid.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let settings: Settings =
        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

    settings.validate()?;

    Ok(settings)
}

fn required_var<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingVariable { name })
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint {
        name: WEBHOOK_URL_VAR,
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint {
            name: WEBHOOK_URL_VAR,
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn write_settings(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn default_config_path_exists() {
        let path = default_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("config.json"));
    }

    #[test]
    fn loads_required_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(&dir, "{}");
        let lookup = env(&[
            (WEBHOOK_URL_VAR, "https://api.incident.io/v2/alert_events/http/abc"),
            (API_TOKEN_VAR, "  secret-token  "),
        ]);

        let config = load_config_with(Some(&path), lookup).unwrap();
        assert_eq!(config.webhook_url.host_str(), Some("api.incident.io"));
        assert_eq!(config.api_token.expose(), "secret-token");
        assert_eq!(config.sink.timeout_secs, 10);
    }

    #[test]
    fn missing_url_is_fatal() {
        let lookup = env(&[(API_TOKEN_VAR, "secret-token")]);
        let err = load_config_with(None, lookup).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVariable {
                name: WEBHOOK_URL_VAR
            }
        ));
    }

    #[test]
    fn blank_token_is_fatal() {
        let lookup = env(&[(WEBHOOK_URL_VAR, "https://example.com/hook"), (API_TOKEN_VAR, "   ")]);
        let err = load_config_with(None, lookup).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVariable {
                name: API_TOKEN_VAR
            }
        ));
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let lookup = env(&[(WEBHOOK_URL_VAR, "ftp://example.com/hook"), (API_TOKEN_VAR, "t")]);
        let err = load_config_with(None, lookup).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn rejects_relative_endpoint() {
        let lookup = env(&[(WEBHOOK_URL_VAR, "/v2/alert_events"), (API_TOKEN_VAR, "t")]);
        let err = load_config_with(None, lookup).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn explicit_settings_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let lookup = env(&[(WEBHOOK_URL_VAR, "https://example.com/hook"), (API_TOKEN_VAR, "t")]);

        let err = load_config_with(Some(&path), lookup).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(
            &dir,
            r#"{ "sink": { "timeout_secs": 2 }, "logging": { "level": "debug" } }"#,
        );
        let lookup = env(&[(WEBHOOK_URL_VAR, "http://localhost:9000/hook"), (API_TOKEN_VAR, "t")]);

        let config = load_config_with(Some(&path), lookup).unwrap();
        assert_eq!(config.sink.timeout_secs, 2);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn malformed_settings_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(&dir, "{ not json");

        let err = load_settings(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = ApiToken::new("super-secret");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret"));
    }
}

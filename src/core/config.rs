//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.echo/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! The backend base URL is resolved exactly once here and injected into the
//! HTTP client; nothing else reads it from the environment.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::auth::Credentials;
use crate::core::chat::DEFAULT_GREETING;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EchoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    pub attachments: Option<bool>,
    /// Opening assistant message of a new chat. Empty string disables it.
    pub greeting: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_URL: &str = "http://localhost:8001";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub credentials: Credentials,
    pub attachments_enabled: bool,
    pub greeting: Option<String>,
}

/// Values given on the command line. `None` = flag not passed.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub access_token: Option<String>,
    pub no_attachments: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.echo/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".echo").join("config.toml"))
}

/// Load config from `~/.echo/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `EchoConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<EchoConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(EchoConfig::default());
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<EchoConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(EchoConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: EchoConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    // Debug output of the whole config would leak the access token
    debug!(
        "Config: api_url={:?}, attachments={:?}, token_set={}",
        config.general.api_url,
        config.chat.attachments,
        config.auth.access_token.is_some()
    );
    Ok(config)
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Echo Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# api_url = "http://localhost:8001"   # Or set ECHO_API_URL
# request_timeout_secs = 60

# [auth]
# Token issued by your auth provider. Echo only forwards it.
# user_id = "..."                      # Or set ECHO_USER_ID
# email = "you@example.com"            # Or set ECHO_USER_EMAIL
# access_token = "..."                 # Or set ECHO_ACCESS_TOKEN

# [chat]
# attachments = true                   # Allow /attach <path>
# greeting = "Hello! I'm Echo."        # "" disables the greeting
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_TEMPLATE) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &EchoConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env(
    config: &EchoConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // API URL: CLI → env → config → default
    let api_url = cli
        .api_url
        .clone()
        .or_else(|| env("ECHO_API_URL"))
        .or_else(|| config.general.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    // Token: CLI → env → config
    let access_token = cli
        .access_token
        .clone()
        .or_else(|| env("ECHO_ACCESS_TOKEN"))
        .or_else(|| config.auth.access_token.clone());

    let credentials = Credentials {
        user_id: env("ECHO_USER_ID").or_else(|| config.auth.user_id.clone()),
        email: env("ECHO_USER_EMAIL").or_else(|| config.auth.email.clone()),
        access_token,
    };

    let greeting = match config.chat.greeting.as_deref() {
        Some("") => None,
        Some(custom) => Some(custom.to_string()),
        None => Some(DEFAULT_GREETING.to_string()),
    };

    ResolvedConfig {
        api_url,
        request_timeout_secs: config
            .general
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        credentials,
        attachments_enabled: !cli.no_attachments && config.chat.attachments.unwrap_or(true),
        greeting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&EchoConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.api_url, DEFAULT_API_URL);
        assert_eq!(resolved.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(resolved.attachments_enabled);
        assert_eq!(resolved.greeting.as_deref(), Some(DEFAULT_GREETING));
        assert_eq!(resolved.credentials, Credentials::default());
    }

    #[test]
    fn test_override_hierarchy_for_api_url() {
        let config = EchoConfig {
            general: GeneralConfig {
                api_url: Some("http://from-config:1".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| (key == "ECHO_API_URL").then(|| "http://from-env:2".to_string());

        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.api_url, "http://from-config:1");

        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.api_url, "http://from-env:2");

        let cli = CliOverrides {
            api_url: Some("http://from-cli:3".to_string()),
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &cli, env);
        assert_eq!(resolved.api_url, "http://from-cli:3");
    }

    #[test]
    fn test_credentials_from_env_win_over_config() {
        let config = EchoConfig {
            auth: AuthConfig {
                user_id: Some("config-user".to_string()),
                email: Some("config@example.com".to_string()),
                access_token: Some("config-token".to_string()),
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            "ECHO_ACCESS_TOKEN" => Some("env-token".to_string()),
            "ECHO_USER_ID" => Some("env-user".to_string()),
            _ => None,
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), env);
        assert_eq!(resolved.credentials.access_token.as_deref(), Some("env-token"));
        assert_eq!(resolved.credentials.user_id.as_deref(), Some("env-user"));
        assert_eq!(resolved.credentials.email.as_deref(), Some("config@example.com"));
    }

    #[test]
    fn test_cli_disables_attachments() {
        let config = EchoConfig {
            chat: ChatConfig {
                attachments: Some(true),
                greeting: None,
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            no_attachments: true,
            ..Default::default()
        };
        assert!(!resolve_with_env(&config, &cli, no_env).attachments_enabled);
    }

    #[test]
    fn test_empty_greeting_disables_it() {
        let config: EchoConfig = toml::from_str("[chat]\ngreeting = \"\"\n").unwrap();
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.greeting, None);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
api_url = "https://echo.example.com/api"
request_timeout_secs = 15

[auth]
user_id = "5f0c"
email = "ada@example.com"
access_token = "eyJhbGciOi"

[chat]
attachments = false
greeting = "Hi."
"#;
        let config: EchoConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.api_url.as_deref(), Some("https://echo.example.com/api"));
        assert_eq!(config.general.request_timeout_secs, Some(15));
        assert_eq!(config.auth.user_id.as_deref(), Some("5f0c"));
        assert_eq!(config.chat.attachments, Some(false));

        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert!(!resolved.attachments_enabled);
        assert_eq!(resolved.greeting.as_deref(), Some("Hi."));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config: EchoConfig = toml::from_str("[general]\napi_url = \"http://x\"\n").unwrap();
        assert!(config.auth.access_token.is_none());
        assert!(config.chat.attachments.is_none());
    }

    #[test]
    fn test_default_template_parses_as_empty_config() {
        let config: EchoConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert!(config.general.api_url.is_none());
    }

    #[test]
    fn test_missing_file_generates_template() {
        let dir = std::env::temp_dir().join(format!("echo-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.general.api_url.is_none());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Echo Configuration"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("echo-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[general\napi_url = ").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
        fs::remove_dir_all(&dir).unwrap();
    }
}

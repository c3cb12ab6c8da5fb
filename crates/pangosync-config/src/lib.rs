//! Settings for pangosync.
//!
//! One TOML (or YAML) settings file plus `PANGOSYNC_*` environment
//! overrides, credential resolution (env + keyring + plaintext), and
//! translation into the engine's [`SyncConfig`] and the API clients'
//! [`TransportConfig`]. The CLI layers its flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml, Yaml},
};
use pangosync_api::traefik::DEFAULT_ROUTERS_PATH;
use pangosync_api::{TlsMode, TransportConfig};
use pangosync_core::{
    DiscoverySite, ExistingPolicy, HttpMethod, StaticForwards, StaticHttpEntry, StaticPortEntry,
    SyncConfig,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Keyring service name for stored API keys.
pub const KEYRING_SERVICE: &str = "pangosync";

/// Prefix for environment overrides (`PANGOSYNC_API_URL`, ...).
pub const ENV_PREFIX: &str = "PANGOSYNC_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for org '{org}'")]
    NoCredentials { org: String },

    #[error("settings loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings document ───────────────────────────────────────────────

/// Top-level settings document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Control-plane API base URL, e.g. `https://pangolin.example.com/v1`.
    #[serde(default, alias = "pangolin_api_url", skip_serializing_if = "String::is_empty")]
    pub api_url: String,

    #[serde(default, alias = "pangolin_org_id", skip_serializing_if = "String::is_empty")]
    pub org_id: String,

    /// API key (plaintext; prefer the keyring or `api_key_env`).
    #[serde(default, alias = "pangolin_api_key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Name of an environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub cleanup_orphaned_resources: bool,

    #[serde(default)]
    pub on_existing: ExistingPolicy,

    /// Exit non-zero when any forward or deletion fails.
    #[serde(default)]
    pub strict: bool,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub traefik_sites: Vec<TraefikSite>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub static_http_forwards: Vec<StaticHttpEntry>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub static_tcp_forwards: Vec<StaticPortEntry>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub static_udp_forwards: Vec<StaticPortEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            org_id: String::new(),
            api_key: None,
            api_key_env: None,
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            cleanup_orphaned_resources: false,
            on_existing: ExistingPolicy::default(),
            strict: false,
            traefik_sites: Vec::new(),
            static_http_forwards: Vec::new(),
            static_tcp_forwards: Vec::new(),
            static_udp_forwards: Vec::new(),
        }
    }
}

/// Empty YAML keys (`static_udp_forwards:`) read as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_timeout() -> u64 {
    30
}

fn default_routers_path() -> String {
    DEFAULT_ROUTERS_PATH.into()
}

/// A Traefik instance whose routers are discovered as HTTP forwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraefikSite {
    /// Control-plane site the discovered forwards are created on.
    pub site_name: String,
    /// Traefik API base URL, e.g. `http://traefik.lan:8080`.
    pub api_url: String,
    #[serde(default = "default_routers_path")]
    pub api_http_routers_path: String,
    pub target_host: String,
    pub target_port: u16,
    pub target_method: HttpMethod,
    #[serde(default)]
    pub host_whitelist: Vec<String>,
}

impl TraefikSite {
    pub fn discovery_site(&self) -> DiscoverySite {
        DiscoverySite {
            site_name: self.site_name.clone(),
            target_host: self.target_host.clone(),
            target_port: self.target_port,
            target_method: self.target_method,
            host_whitelist: self.host_whitelist.clone(),
        }
    }
}

impl Settings {
    /// Check the fields every command depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_url("api_url", &self.api_url)?;
        if self.org_id.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "org_id".into(),
                reason: "must not be empty".into(),
            });
        }
        for (i, site) in self.traefik_sites.iter().enumerate() {
            parse_url(&format!("traefik_sites[{i}].api_url"), &site.api_url)?;
        }
        Ok(())
    }

    /// Engine settings for one run.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            static_forwards: StaticForwards {
                http: self.static_http_forwards.clone(),
                tcp: self.static_tcp_forwards.clone(),
                udp: self.static_udp_forwards.clone(),
            },
            cleanup: self.cleanup_orphaned_resources,
            on_existing: self.on_existing,
        }
    }

    /// TLS and timeout settings shared by every client.
    pub fn transport_config(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca) = self.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout),
        }
    }

    /// Copy with plaintext secrets masked, for display.
    pub fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| "********".into()),
            ..self.clone()
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Validation {
            field: "settings".into(),
            reason: e.to_string(),
        })
    }
}

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

// ── Settings file path ──────────────────────────────────────────────

/// Resolve the default settings path via platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "pangosync", "pangosync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("pangosync");
    p
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yml") || e.eq_ignore_ascii_case("yaml"))
}

// ── Loading ─────────────────────────────────────────────────────────

/// Build the figment for a settings file: defaults, file, environment.
pub fn figment_for(path: &Path) -> Figment {
    let figment = Figment::new().merge(Serialized::defaults(Settings::default()));
    let figment = if is_yaml(path) {
        figment.merge(Yaml::file(path))
    } else {
        figment.merge(Toml::file(path))
    };
    figment.merge(Env::prefixed(ENV_PREFIX).only(&[
        "api_url",
        "org_id",
        "api_key",
        "api_key_env",
        "timeout",
        "insecure",
        "ca_cert",
        "cleanup_orphaned_resources",
        "on_existing",
        "strict",
    ]))
}

/// Load settings from `path`, or from the default location.
///
/// An explicitly given path must exist; a missing default file just
/// yields defaults plus environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("settings file not found: {}", p.display()),
                )));
            }
            p.to_path_buf()
        }
        None => config_path(),
    };
    Ok(figment_for(&path).extract()?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API key: explicit value, `api_key_env`, keyring, plaintext.
pub fn resolve_api_key(
    settings: &Settings,
    explicit: Option<&str>,
) -> Result<SecretString, ConfigError> {
    // 1. CLI flag
    if let Some(key) = explicit {
        return Ok(SecretString::from(key.to_owned()));
    }

    // 2. Named env var
    if let Some(ref env_name) = settings.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{}/api-key", settings.org_id)) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 4. Plaintext in settings
    if let Some(ref key) = settings.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        org: settings.org_id.clone(),
    })
}

//! CLI configuration: thin wrapper around `pangosync_config`.
//!
//! Loads the settings file and layers `GlobalOpts` flag overrides
//! (--api-url, --org, --api-key, ...) on top before building clients.

use std::path::PathBuf;

use pangosync_api::{PangolinClient, TraefikClient};
use pangosync_config::{Settings, TraefikSite};
use pangosync_core::DiscoverySite;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use pangosync_config::config_path;

/// Settings file in effect: `--config` or the platform default.
pub fn settings_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load settings and apply flag overrides, without validating.
pub fn load(global: &GlobalOpts) -> Result<Settings, CliError> {
    if let Some(ref path) = global.config {
        if !path.exists() {
            return Err(CliError::NoConfig {
                path: path.display().to_string(),
            });
        }
    }
    let mut settings = pangosync_config::load_settings(global.config.as_deref())?;

    if let Some(ref raw) = global.api_url {
        raw.parse::<url::Url>().map_err(|e| CliError::Validation {
            field: "--api-url".into(),
            reason: format!("invalid URL '{raw}': {e}"),
        })?;
        settings.api_url.clone_from(raw);
    }
    if let Some(ref org) = global.org {
        settings.org_id.clone_from(org);
    }
    if let Some(timeout) = global.timeout {
        settings.timeout = timeout;
    }
    if global.insecure {
        settings.insecure = true;
    }
    Ok(settings)
}

/// Load, override, and validate settings for commands that talk to Pangolin.
pub fn load_validated(global: &GlobalOpts) -> Result<Settings, CliError> {
    let path = settings_path(global);
    let settings = load(global)?;
    if settings.api_url.is_empty() && !path.exists() {
        return Err(CliError::NoConfig {
            path: path.display().to_string(),
        });
    }
    settings.validate()?;
    Ok(settings)
}

/// Authenticated control-plane client.
pub fn pangolin_client(settings: &Settings, global: &GlobalOpts) -> Result<PangolinClient, CliError> {
    let key = pangosync_config::resolve_api_key(settings, global.api_key.as_deref())?;
    Ok(PangolinClient::from_api_key(
        &settings.api_url,
        settings.org_id.clone(),
        &key,
        &settings.transport_config(),
    )?)
}

/// One router client per configured Traefik site.
pub fn traefik_client(settings: &Settings, site: &TraefikSite) -> Result<TraefikClient, CliError> {
    Ok(TraefikClient::new(
        &site.api_url,
        &site.api_http_routers_path,
        &settings.transport_config(),
    )?)
}

/// Every configured discovery site paired with its router client.
pub fn discovery_sources(settings: &Settings) -> Result<Vec<(DiscoverySite, TraefikClient)>, CliError> {
    settings
        .traefik_sites
        .iter()
        .map(|site| Ok((site.discovery_site(), traefik_client(settings, site)?)))
        .collect()
}

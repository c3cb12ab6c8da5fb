//! CLI error types with miette diagnostics.
//!
//! Maps engine, settings, and transport errors into user-facing errors
//! with actionable help text and a stable exit code.

use miette::Diagnostic;
use pangosync_config::ConfigError;
use pangosync_core::CoreError;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONFIG: i32 = 4;
    pub const CONNECTION: i32 = 5;
    pub const PARTIAL_FAILURE: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(pangosync::connection_failed),
        help(
            "Check that the API is running and reachable.\n\
             URL: {url}\n\
             Try: pangosync sites --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Could not set up the HTTP client: {message}")]
    #[diagnostic(
        code(pangosync::transport),
        help("Check the URLs and ca_cert in the settings file, or use --insecure (-k).")
    )]
    Transport { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(pangosync::auth_failed),
        help("Verify the Pangolin API key and that it is scoped to org '{org}'.")
    )]
    AuthFailed { org: String },

    #[error("No API key configured for org '{org}'")]
    #[diagnostic(
        code(pangosync::no_credentials),
        help(
            "Pass --api-key, set PANGOSYNC_API_KEY, name a variable in api_key_env,\n\
             or store the key in the system keyring (service 'pangosync', user '{org}/api-key')."
        )
    )]
    NoCredentials { org: String },

    // ── Lookups ──────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(pangosync::not_found),
        help("Run: pangosync {list_command} to see what is configured")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(pangosync::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    #[error("Could not load resources from Pangolin: {message}")]
    #[diagnostic(
        code(pangosync::cache_unavailable),
        help("Check that the API key may list resources in this org.")
    )]
    CacheUnavailable { message: String },

    // ── Sync ─────────────────────────────────────────────────────────
    #[error("{failed} operation(s) failed during sync")]
    #[diagnostic(
        code(pangosync::partial_failure),
        help("See the log above for each failure. Failed forwards are retried on the next run.")
    )]
    PartialFailure { failed: usize },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(pangosync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Settings file not found")]
    #[diagnostic(
        code(pangosync::no_config),
        help(
            "Create one (see `pangosync config path`) or pass --config.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Invalid setting {field}: {reason}")]
    #[diagnostic(code(pangosync::invalid_setting))]
    InvalidSetting { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(pangosync::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. }
            | Self::NoConfig { .. }
            | Self::InvalidSetting { .. }
            | Self::Transport { .. }
            | Self::Config(_) => exit_code::CONFIG,
            Self::Validation { .. } => exit_code::USAGE,
            Self::PartialFailure { .. } => exit_code::PARTIAL_FAILURE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ─────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::InvalidSetting { field, reason },
            ConfigError::NoCredentials { org } => Self::NoCredentials { org },
            other => Self::Config(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { .. } => Self::AuthFailed {
                org: "current".into(),
            },
            CoreError::Api { message, status } => Self::ApiError { status, message },
            CoreError::CacheUnavailable { message } => Self::CacheUnavailable { message },
            CoreError::Config { message } => Self::Transport { message },
        }
    }
}

impl From<pangosync_api::Error> for CliError {
    fn from(err: pangosync_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_exits_six() {
        assert_eq!(CliError::PartialFailure { failed: 2 }.exit_code(), 6);
    }

    #[test]
    fn missing_credentials_is_an_auth_error() {
        let err: CliError = ConfigError::NoCredentials { org: "home".into() }.into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn bad_setting_is_a_config_error() {
        let err: CliError = ConfigError::Validation {
            field: "api_url".into(),
            reason: "invalid".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONFIG);
    }

    #[test]
    fn unauthorized_maps_to_auth_exit() {
        let err: CliError = pangosync_api::Error::Authentication {
            message: "401".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}

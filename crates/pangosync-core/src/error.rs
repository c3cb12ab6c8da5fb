// ── Core error types ──
//
// Run-level errors only. Per-forward problems are `Outcome::Failed`, never
// a `CoreError`. The `From<pangosync_api::Error>` impl translates
// transport-layer errors into the variants the CLI maps to exit codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    /// The resource snapshot could not be loaded, so no decision is safe.
    #[error("Remote resource state unavailable: {message}")]
    CacheUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<pangosync_api::Error> for CoreError {
    fn from(err: pangosync_api::Error) -> Self {
        match err {
            pangosync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            pangosync_api::Error::Transport(ref e) if err.is_connection_failure() => {
                CoreError::ConnectionFailed {
                    url: e
                        .url()
                        .map_or_else(|| "<unknown>".into(), ToString::to_string),
                    reason: e.to_string(),
                }
            }
            pangosync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            pangosync_api::Error::Tls(message) => CoreError::Config { message },
            other => CoreError::Api {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_maps_through() {
        let err: CoreError = pangosync_api::Error::Authentication {
            message: "bad key".into(),
        }
        .into();
        assert!(matches!(err, CoreError::AuthenticationFailed { message } if message == "bad key"));
    }

    #[test]
    fn api_status_is_preserved() {
        let err: CoreError = pangosync_api::Error::Api {
            status: 500,
            message: "boom".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
    }
}

// Traefik router API client
//
// Read-only: discovery only ever lists HTTP routers. Traefik's API is
// unauthenticated and returns a bare JSON array (no envelope).

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::Router;
use crate::transport::TransportConfig;

/// Default path of Traefik's HTTP router listing.
pub const DEFAULT_ROUTERS_PATH: &str = "/api/http/routers";

/// Async client for one Traefik instance.
pub struct TraefikClient {
    http: reqwest::Client,
    routers_url: Url,
}

impl TraefikClient {
    /// Build a client for `api_url` + `routers_path`.
    pub fn new(api_url: &str, routers_path: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, api_url, routers_path)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        api_url: &str,
        routers_path: &str,
    ) -> Result<Self, Error> {
        let base = api_url.trim_end_matches('/');
        let path = if routers_path.starts_with('/') {
            routers_path.to_owned()
        } else {
            format!("/{routers_path}")
        };
        let routers_url = Url::parse(&format!("{base}{path}"))?;
        Ok(Self { http, routers_url })
    }

    /// The full router listing URL.
    pub fn routers_url(&self) -> &Url {
        &self.routers_url
    }

    /// `GET {api_url}{routers_path}`
    ///
    /// Fails on a non-200 status or a body that is not a JSON array.
    pub async fn list_routers(&self) -> Result<Vec<Router>, Error> {
        debug!("GET {}", self.routers_url);
        let resp = self.http.get(self.routers_url.clone()).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("router listing is not JSON: {e}"),
                body: body.clone(),
            })?;

        if !value.is_array() {
            return Err(Error::Deserialization {
                message: "unexpected router listing format, expected a list".into(),
                body,
            });
        }

        serde_json::from_value(value).map_err(|e| Error::Deserialization {
            message: format!("invalid router entry: {e}"),
            body,
        })
    }
}
